pub mod report;
pub mod rules;
pub mod validate;
pub mod watch;

use crate::config::ValidatorConfig;
use crate::rules::RuleCatalog;
use crate::report::Validator;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "visual-sentinel")]
#[command(about = "Visual conformance checker for rendered styles", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Valida un snapshot del DOM contra el catálogo de reglas
    Validate {
        /// Snapshot JSON con estilos computados
        snapshot: String,
        /// Formato de salida: text, json o sarif
        #[arg(long, default_value = "text")]
        format: String,
        /// Espera antes de validar (por defecto el de la configuración)
        #[arg(long)]
        delay_ms: Option<u64>,
        /// No guardar el reporte como último reporte
        #[arg(long)]
        no_save: bool,
    },
    /// Re-valida el snapshot cada vez que cambia en disco
    Watch {
        /// Snapshot JSON a vigilar
        snapshot: String,
    },
    /// Lista las reglas activas del catálogo
    Rules {
        /// Filtrar por categoría (hover, contrast, gradient, ...)
        #[arg(long)]
        category: Option<String>,
    },
    /// Muestra el último reporte guardado
    Report {
        /// Formato de salida: text, json o sarif
        #[arg(long, default_value = "text")]
        format: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Sarif,
}

impl OutputFormat {
    /// Formato desconocido cae a texto.
    pub fn parse(format: &str) -> Self {
        match format.to_lowercase().as_str() {
            "json" => OutputFormat::Json,
            "sarif" => OutputFormat::Sarif,
            _ => OutputFormat::Text,
        }
    }
}

/// Ruta del snapshot tal como la escribió el usuario: relativa al directorio actual.
pub fn resolve_snapshot_path(snapshot: &str) -> PathBuf {
    let path = Path::new(snapshot);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Error en una línea de JSON para los modos de salida máquina.
pub fn json_error(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Catálogo integrado + reglas YAML extra del proyecto, si existen.
pub fn build_validator(project_root: &Path, quiet: bool) -> Validator {
    let config = ValidatorConfig::load_or_default(project_root);
    let mut catalog = RuleCatalog::builtin(&config);

    let extra = config.extra_rules_file(project_root);
    if extra.exists() {
        match catalog.extend_from_yaml(&extra) {
            Ok(n) if !quiet => {
                println!("   📜 {} reglas extra cargadas desde {}", n, extra.display());
            }
            Ok(_) => {}
            Err(e) => {
                eprintln!(
                    "{}",
                    format!("   ⚠️  Reglas extra ignoradas ({}): {}", extra.display(), e).yellow()
                );
            }
        }
    }

    Validator::with_catalog(config, catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleCategory;
    use std::fs;

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("JSON"), OutputFormat::Json);
        assert_eq!(OutputFormat::parse("sarif"), OutputFormat::Sarif);
        assert_eq!(OutputFormat::parse("whatever"), OutputFormat::Text);
    }

    #[test]
    fn test_relative_snapshot_resolves_from_working_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(resolve_snapshot_path("page.json"), cwd.join("page.json"));
        assert_eq!(
            resolve_snapshot_path("snapshots/page.json"),
            cwd.join("snapshots").join("page.json")
        );

        let absolute = cwd.join("elsewhere").join("page.json");
        let absolute_str = absolute.to_str().unwrap();
        assert_eq!(resolve_snapshot_path(absolute_str), absolute);
    }

    #[test]
    fn test_json_error_escapes_message() {
        let message = "cannot read snapshot C:\\pages\\\"home\".json:\nnot found";
        let out = json_error(message);
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["error"], message);
    }

    #[test]
    fn test_build_validator_loads_extra_rules() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join(crate::config::STATE_DIR);
        fs::create_dir_all(&state).unwrap();
        fs::write(
            state.join("rules.yaml"),
            r#"
- id: custom.cta-cursor
  category: button
  selector: ".cta"
  description: CTA uses a pointer cursor
  required_properties: [cursor]
  check:
    kind: propertyEquals
    property: cursor
    expected: pointer
"#,
        )
        .unwrap();

        let validator = build_validator(dir.path(), true);
        assert!(validator.catalog().get("custom.cta-cursor").is_some());
        assert!(
            validator
                .catalog()
                .get_rules_for(RuleCategory::Button)
                .iter()
                .any(|r| r.id == "custom.cta-cursor")
        );
    }

    #[test]
    fn test_build_validator_ignores_broken_extra_rules() {
        let dir = tempfile::tempdir().unwrap();
        let state = dir.path().join(crate::config::STATE_DIR);
        fs::create_dir_all(&state).unwrap();
        fs::write(state.join("rules.yaml"), "not: [valid").unwrap();

        let validator = build_validator(dir.path(), true);
        assert_eq!(validator.catalog().all().len(), RuleCatalog::default().all().len());
    }
}
