//! # Visual Sentinel - Validador de conformidad visual
//!
//! Inspecciona los estilos computados de una vista renderizada (o de un
//! snapshot del DOM) y los compara con un catálogo de reglas de diseño:
//! transiciones hover, contraste, armonía de color, gradientes, overflow,
//! ancho de viewport y pistas de GPU. El resultado es un reporte por categoría
//! con veredictos por elemento.

pub mod commands;
pub mod config;
pub mod dom;
pub mod inspect;
pub mod report;
pub mod rules;
pub mod ui;

pub use config::ValidatorConfig;
pub use dom::SnapshotEnvironment;
pub use inspect::{InspectError, StyleEnvironment, UnavailableEnvironment};
pub use report::render::format_report;
pub use report::{CategoryStatus, ValidationReport, Validator, run_validation};
pub use rules::{RuleCatalog, RuleCategory};
