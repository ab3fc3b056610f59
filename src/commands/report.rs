use crate::commands::{OutputFormat, json_error};
use crate::report::render::{format_report, render_json, render_sarif};
use crate::report::store::ReportStore;
use colored::*;
use std::path::Path;

pub fn handle_report_command(project_root: &Path, format: &str) {
    let store = ReportStore::new(project_root);
    let Some(stored) = store.cargar() else {
        eprintln!(
            "{} No hay reporte guardado. Ejecuta `visual-sentinel validate <snapshot>` primero.",
            "⚠️ ".yellow()
        );
        std::process::exit(2);
    };

    match OutputFormat::parse(format) {
        OutputFormat::Json => match render_json(&stored.report) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("{}", json_error(&e.to_string())),
        },
        OutputFormat::Sarif => println!("{}", render_sarif(&stored.report)),
        OutputFormat::Text => {
            println!(
                "{}",
                format!("💾 Guardado: {}", stored.saved_at.format("%Y-%m-%d %H:%M:%S")).dimmed()
            );
            print!("{}", format_report(&stored.report));
        }
    }
}
