//! Persistencia opcional del último reporte (conveniencia para el desarrollador).

use crate::config::STATE_DIR;
use crate::report::ValidationReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Clave fija bajo la que se guarda el último reporte.
pub const REPORT_KEY: &str = "visual-test-report";

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct StoredReport {
    pub key: String,
    pub saved_at: DateTime<Utc>,
    pub report: ValidationReport,
}

pub struct ReportStore {
    path: PathBuf,
}

impl ReportStore {
    pub fn new(project_root: &Path) -> Self {
        Self {
            path: project_root.join(STATE_DIR).join("last-report.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn guardar(&self, report: &ValidationReport) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let stored = StoredReport {
            key: REPORT_KEY.to_string(),
            saved_at: Utc::now(),
            report: report.clone(),
        };
        fs::write(&self.path, serde_json::to_string_pretty(&stored)?)?;
        Ok(())
    }

    /// Último reporte guardado; `None` si no hay ninguno o el archivo es ilegible.
    pub fn cargar(&self) -> Option<StoredReport> {
        let content = fs::read_to_string(&self.path).ok()?;
        serde_json::from_str::<StoredReport>(&content)
            .ok()
            .filter(|s| s.key == REPORT_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inspect::UnavailableEnvironment;
    use crate::report::run_validation;

    #[test]
    fn test_save_and_load_last_report() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path());
        assert!(store.cargar().is_none());

        let report = run_validation(&UnavailableEnvironment);
        store.guardar(&report).unwrap();

        let stored = store.cargar().unwrap();
        assert_eq!(stored.key, REPORT_KEY);
        assert_eq!(stored.report, report);
        assert!(stored.saved_at >= report.generated_at);
    }

    #[test]
    fn test_newer_report_supersedes() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path());
        let first = run_validation(&UnavailableEnvironment);
        let second = run_validation(&UnavailableEnvironment);
        store.guardar(&first).unwrap();
        store.guardar(&second).unwrap();
        assert_eq!(store.cargar().unwrap().report.run_id, second.run_id);
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = ReportStore::new(dir.path());
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "{ not json").unwrap();
        assert!(store.cargar().is_none());
    }
}
