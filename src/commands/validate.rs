use crate::commands::{OutputFormat, build_validator, json_error, resolve_snapshot_path};
use crate::dom::SnapshotEnvironment;
use crate::report::render::{render_json, render_sarif};
use crate::report::store::ReportStore;
use crate::report::{ValidationReport, Validator};
use crate::ui;
use colored::*;
use std::path::Path;
use std::time::Duration;

/// Código de salida: 0 todo bien, 1 alguna categoría en FAIL, 2 entorno no disponible.
pub fn exit_code(report: &ValidationReport) -> i32 {
    if report.is_environment_unavailable() {
        2
    } else if report.has_failures() {
        1
    } else {
        0
    }
}

pub fn emit(report: &ValidationReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => match render_json(report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}", json_error(&e.to_string())),
        },
        OutputFormat::Sarif => println!("{}", render_sarif(report)),
        OutputFormat::Text => ui::imprimir_reporte(report),
    }
}

/// Carga el snapshot y ejecuta una validación completa sobre él.
pub fn validate_snapshot(
    validator: &Validator,
    snapshot: &Path,
) -> Result<ValidationReport, crate::dom::SnapshotError> {
    let env = SnapshotEnvironment::load(snapshot)?;
    Ok(validator.run_validation(&env))
}

pub fn persist(project_root: &Path, report: &ValidationReport, quiet: bool) {
    let store = ReportStore::new(project_root);
    match store.guardar(report) {
        Ok(()) if !quiet => {
            println!("{}", format!("   💾 Reporte guardado en {}", store.path().display()).dimmed());
        }
        Ok(()) => {}
        Err(e) => eprintln!("   ⚠️  No se pudo guardar el reporte: {}", e),
    }
}

pub fn handle_validate(
    project_root: &Path,
    snapshot: &str,
    format: &str,
    delay_ms: Option<u64>,
    save: bool,
) {
    let format = OutputFormat::parse(format);
    let quiet = format != OutputFormat::Text;
    let validator = build_validator(project_root, quiet);

    let delay = delay_ms.unwrap_or(validator.config().auto_run_delay_ms);
    if delay > 0 {
        if quiet {
            std::thread::sleep(Duration::from_millis(delay));
        } else {
            let pb = ui::crear_progreso("Esperando a que la vista se estabilice...");
            std::thread::sleep(Duration::from_millis(delay));
            pb.finish_and_clear();
        }
    }

    let path = resolve_snapshot_path(snapshot);
    let report = match validate_snapshot(&validator, &path) {
        Ok(r) => r,
        Err(e) => {
            match format {
                OutputFormat::Json => println!("{}", json_error(&e.to_string())),
                _ => eprintln!("{} {}", "❌".red(), e),
            }
            std::process::exit(2);
        }
    };

    emit(&report, format);

    if save && validator.config().persist_last_report {
        persist(project_root, &report, quiet);
    }

    let code = exit_code(&report);
    if code != 0 {
        std::process::exit(code);
    }
}
