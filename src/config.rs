use crate::rules::EmptyMatchPolicy;
use crate::rules::catalog::{HOVER_TRANSITION_MIN_SECONDS, MIN_VIEWPORT_WIDTH};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Versión actual (leída desde Cargo.toml en tiempo de compilación)
pub const VALIDATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const CONFIG_FILE: &str = ".visualrc.toml";

/// Directorio de trabajo local (último reporte, reglas extra).
pub const STATE_DIR: &str = ".visual-sentinel";

/// Ajustes por regla que se superponen al catálogo.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RuleOverride {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_empty: Option<EmptyMatchPolicy>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ValidatorConfig {
    pub version: String,
    pub hover_transition_min_seconds: f64,
    pub min_viewport_width: u32,
    /// Política para reglas de colección sin coincidencias que no declaran la suya.
    pub empty_collection_policy: EmptyMatchPolicy,
    pub disabled_rules: Vec<String>,
    /// Retardo antes de validar (ms). 0 valida de inmediato.
    pub auto_run_delay_ms: u64,
    pub persist_last_report: bool,
    /// Reglas adicionales en YAML, relativo a la raíz del proyecto.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_rules_path: Option<String>,
    pub rule_overrides: Vec<RuleOverride>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            version: VALIDATOR_VERSION.to_string(),
            hover_transition_min_seconds: HOVER_TRANSITION_MIN_SECONDS,
            min_viewport_width: MIN_VIEWPORT_WIDTH,
            empty_collection_policy: EmptyMatchPolicy::Pass,
            rule_overrides: Vec::new(),
            disabled_rules: Vec::new(),
            auto_run_delay_ms: 0,
            persist_last_report: true,
            extra_rules_path: None,
        }
    }
}

impl ValidatorConfig {
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let toml = toml::to_string_pretty(self)?;
        fs::write(path.join(CONFIG_FILE), toml)?;
        Ok(())
    }

    /// Carga `.visualrc.toml`. Los campos ausentes toman valores por defecto y
    /// una configuración de otra versión se migra a la actual.
    pub fn load(path: &Path) -> Option<Self> {
        let config_path = path.join(CONFIG_FILE);
        let content = fs::read_to_string(&config_path).ok()?;

        match toml::from_str::<ValidatorConfig>(&content) {
            Ok(config) if config.version != VALIDATOR_VERSION => {
                println!(
                    "{}",
                    format!(
                        "   🔄 Migrando configuración de versión {} a {}...",
                        config.version, VALIDATOR_VERSION
                    )
                    .yellow()
                );
                let config = Self::migrar_config(config);
                if let Err(e) = config.save(path) {
                    println!("   ⚠️  No se pudo guardar la configuración migrada: {}", e);
                }
                Some(config)
            }
            Ok(config) => Some(config),
            Err(e) => {
                println!(
                    "{}",
                    format!("   ⚠️  No se pudo leer {}: {}", CONFIG_FILE, e).yellow()
                );
                None
            }
        }
    }

    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    fn migrar_config(mut config: ValidatorConfig) -> ValidatorConfig {
        config.version = VALIDATOR_VERSION.to_string();

        // Umbrales no positivos no tienen sentido; volver a los canónicos
        if config.hover_transition_min_seconds <= 0.0 {
            config.hover_transition_min_seconds = HOVER_TRANSITION_MIN_SECONDS;
        }
        if config.min_viewport_width == 0 {
            config.min_viewport_width = MIN_VIEWPORT_WIDTH;
        }

        config
    }

    /// Busca hacia arriba el directorio que contiene `.visualrc.toml`.
    pub fn find_project_root() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            if current.join(CONFIG_FILE).exists() {
                return Some(current);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    pub fn is_disabled(&self, rule_id: &str) -> bool {
        self.disabled_rules.iter().any(|r| r == rule_id)
    }

    pub fn override_for(&self, rule_id: &str) -> Option<&RuleOverride> {
        self.rule_overrides.iter().find(|o| o.id == rule_id)
    }

    pub fn extra_rules_file(&self, project_root: &Path) -> PathBuf {
        match &self.extra_rules_path {
            Some(p) => project_root.join(p),
            None => project_root.join(STATE_DIR).join("rules.yaml"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_catalog_constants() {
        let cfg = ValidatorConfig::default();
        assert_eq!(cfg.hover_transition_min_seconds, 0.3);
        assert_eq!(cfg.min_viewport_width, 375);
        assert_eq!(cfg.auto_run_delay_ms, 0, "validate runs immediately unless a delay is configured");
        assert_eq!(cfg.empty_collection_policy, EmptyMatchPolicy::Pass);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = ValidatorConfig::default();
        cfg.disabled_rules.push("hover.links".into());
        cfg.rule_overrides.push(RuleOverride {
            id: "hover.buttons".into(),
            on_empty: Some(EmptyMatchPolicy::Fail),
        });
        cfg.save(dir.path()).unwrap();

        let loaded = ValidatorConfig::load(dir.path()).unwrap();
        assert_eq!(loaded, cfg);
        assert!(loaded.is_disabled("hover.links"));
        assert_eq!(
            loaded.override_for("hover.buttons").and_then(|o| o.on_empty),
            Some(EmptyMatchPolicy::Fail)
        );
    }

    #[test]
    fn test_partial_file_uses_defaults_and_migrates() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            "version = \"0.1.0\"\nmin_viewport_width = 0\nempty_collection_policy = \"skip\"\n",
        )
        .unwrap();

        let cfg = ValidatorConfig::load(dir.path()).unwrap();
        assert_eq!(cfg.version, VALIDATOR_VERSION);
        assert_eq!(cfg.min_viewport_width, MIN_VIEWPORT_WIDTH);
        assert_eq!(cfg.empty_collection_policy, EmptyMatchPolicy::Skip);
        assert!(cfg.persist_last_report);
        assert_eq!(cfg.auto_run_delay_ms, 0);
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ValidatorConfig::load(dir.path()).is_none());
        assert_eq!(ValidatorConfig::load_or_default(dir.path()), ValidatorConfig::default());
    }
}
