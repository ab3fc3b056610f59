//! Agregación de resultados de validación
//!
//! `Validator::run_validation` recorre todas las categorías del catálogo contra
//! el estado actual del entorno y construye un `ValidationReport`. Cada llamada
//! vuelve a leer los estilos; no hay caché entre ejecuciones.

pub mod render;
pub mod store;

use crate::config::ValidatorConfig;
use crate::inspect::{StyleEnvironment, Viewport};
use crate::rules::{RuleCatalog, RuleCategory, RuleEvaluator, Verdict, VerdictStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryStatus {
    Pass,
    Warn,
    Fail,
}

impl fmt::Display for CategoryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CategoryStatus::Pass => "PASS",
            CategoryStatus::Warn => "WARN",
            CategoryStatus::Fail => "FAIL",
        })
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResult {
    pub category: RuleCategory,
    pub verdicts: Vec<Verdict>,
    pub passed_count: usize,
    pub failed_count: usize,
    pub status: CategoryStatus,
}

impl CategoryResult {
    pub fn from_verdicts(category: RuleCategory, verdicts: Vec<Verdict>) -> Self {
        let passed_count = verdicts
            .iter()
            .filter(|v| v.status == VerdictStatus::Pass)
            .count();
        let failed_count = verdicts.iter().filter(|v| v.status.is_failure()).count();
        let warned = verdicts.iter().any(|v| v.status == VerdictStatus::Warning);

        let status = if failed_count > 0 {
            CategoryStatus::Fail
        } else if warned {
            CategoryStatus::Warn
        } else {
            CategoryStatus::Pass
        };

        Self {
            category,
            verdicts,
            passed_count,
            failed_count,
            status,
        }
    }

    /// Veredictos que no son un pase.
    pub fn issues(&self) -> impl Iterator<Item = &Verdict> {
        self.verdicts.iter().filter(|v| v.status != VerdictStatus::Pass)
    }

    fn soft_issue_count(&self) -> usize {
        self.verdicts
            .iter()
            .filter(|v| matches!(v.status, VerdictStatus::Warning | VerdictStatus::Info))
            .count()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum RunStatus {
    Completed,
    EnvironmentUnavailable { reason: String },
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentInfo {
    pub viewport: Option<Viewport>,
    pub context_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub categories: BTreeMap<RuleCategory, CategoryResult>,
    pub total_issues: usize,
    pub environment: EnvironmentInfo,
    pub generated_at: DateTime<Utc>,
}

impl ValidationReport {
    fn new(status: RunStatus, categories: BTreeMap<RuleCategory, CategoryResult>, environment: EnvironmentInfo) -> Self {
        let total_issues = categories
            .values()
            .map(|c| {
                let failed = if c.status == CategoryStatus::Fail { c.failed_count } else { 0 };
                let listed = if c.category.reports_issue_list() { c.soft_issue_count() } else { 0 };
                failed + listed
            })
            .sum();

        Self {
            run_id: Uuid::new_v4(),
            status,
            categories,
            total_issues,
            environment,
            generated_at: Utc::now(),
        }
    }

    pub fn is_environment_unavailable(&self) -> bool {
        matches!(self.status, RunStatus::EnvironmentUnavailable { .. })
    }

    pub fn category(&self, category: RuleCategory) -> Option<&CategoryResult> {
        self.categories.get(&category)
    }

    pub fn has_failures(&self) -> bool {
        self.is_environment_unavailable()
            || self.categories.values().any(|c| c.status == CategoryStatus::Fail)
    }

    /// Estado compuesto de overflow, responsiveness y performance.
    pub fn seamless_status(&self) -> Option<CategoryStatus> {
        worst(
            self.categories
                .values()
                .filter(|c| c.category.is_seamless())
                .map(|c| c.status),
        )
    }

    pub fn overall_status(&self) -> CategoryStatus {
        if self.is_environment_unavailable() {
            return CategoryStatus::Fail;
        }
        worst(self.categories.values().map(|c| c.status)).unwrap_or(CategoryStatus::Pass)
    }
}

fn worst(statuses: impl Iterator<Item = CategoryStatus>) -> Option<CategoryStatus> {
    statuses.fold(None, |acc, s| {
        Some(match (acc, s) {
            (Some(CategoryStatus::Fail), _) | (_, CategoryStatus::Fail) => CategoryStatus::Fail,
            (Some(CategoryStatus::Warn), _) | (_, CategoryStatus::Warn) => CategoryStatus::Warn,
            _ => CategoryStatus::Pass,
        })
    })
}

pub struct Validator {
    config: ValidatorConfig,
    catalog: RuleCatalog,
}

impl Validator {
    pub fn new(config: ValidatorConfig) -> Self {
        let catalog = RuleCatalog::builtin(&config);
        Self { config, catalog }
    }

    pub fn with_catalog(config: ValidatorConfig, catalog: RuleCatalog) -> Self {
        Self { config, catalog }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn catalog(&self) -> &RuleCatalog {
        &self.catalog
    }

    /// Ejecuta todas las categorías contra el estado actual de `env`.
    ///
    /// Nunca falla: si el entorno no puede resolver estilos el reporte lo
    /// indica en `status` y no incluye resultados parciales.
    pub fn run_validation(&self, env: &dyn StyleEnvironment) -> ValidationReport {
        let environment = EnvironmentInfo {
            viewport: env.viewport().ok(),
            context_id: env.context_id(),
        };
        let evaluator = RuleEvaluator::new(&self.config);
        let mut categories = BTreeMap::new();

        for category in RuleCategory::ALL {
            let rules = self.catalog.get_rules_for(category);
            if rules.is_empty() {
                continue;
            }
            match evaluator.evaluate_category(env, &rules) {
                Ok(verdicts) => {
                    categories.insert(category, CategoryResult::from_verdicts(category, verdicts));
                }
                Err(e) => {
                    return ValidationReport::new(
                        RunStatus::EnvironmentUnavailable {
                            reason: e.to_string(),
                        },
                        BTreeMap::new(),
                        environment,
                    );
                }
            }
        }

        ValidationReport::new(RunStatus::Completed, categories, environment)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

/// Validación completa con la configuración y el catálogo por defecto.
pub fn run_validation(env: &dyn StyleEnvironment) -> ValidationReport {
    Validator::default().run_validation(env)
}
