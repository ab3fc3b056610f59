//! Módulo de interfaz de usuario
//!
//! Salida coloreada en la terminal y el spinner de espera.

use crate::report::{CategoryStatus, RunStatus, ValidationReport};
use crate::rules::VerdictStatus;
use colored::*;

pub fn mostrar_banner() {
    println!();
    println!(
        "{}",
        "╔═══════════════════════════════════════════════════════════╗".bright_magenta()
    );
    println!(
        "{}",
        "           🎨  Visual Sentinel: style conformance  🎨"
            .bright_white()
            .bold()
    );
    println!(
        "{}",
        "╚═══════════════════════════════════════════════════════════╝".bright_magenta()
    );
}

fn pintar_estado(status: CategoryStatus) -> ColoredString {
    match status {
        CategoryStatus::Pass => "PASS".green().bold(),
        CategoryStatus::Warn => "WARN".yellow().bold(),
        CategoryStatus::Fail => "FAIL".red().bold(),
    }
}

/// Versión coloreada del reporte de texto para la terminal.
pub fn imprimir_reporte(report: &ValidationReport) {
    println!("\n{}", "🎨 VISUAL VALIDATION REPORT".bright_magenta().bold());
    println!("{}", "=".repeat(50).bright_magenta());

    if let RunStatus::EnvironmentUnavailable { reason } = &report.status {
        println!(
            "\n{} {}",
            "❌ ENVIRONMENT UNAVAILABLE:".red().bold(),
            reason
        );
        return;
    }

    println!("\n{}", "📊 SUMMARY:".bold());
    for result in report.categories.values() {
        println!(
            "  {:<18} {} ({}/{})",
            result.category.as_str().to_uppercase(),
            pintar_estado(result.status),
            result.passed_count,
            result.passed_count + result.failed_count
        );
    }
    if let Some(seamless) = report.seamless_status() {
        println!("  {:<18} {}", "SEAMLESS", pintar_estado(seamless));
    }

    for result in report.categories.values() {
        let issues: Vec<_> = result.issues().collect();
        if issues.is_empty() {
            continue;
        }
        println!("\n{}", result.category.as_str().to_uppercase().bold());
        for v in issues {
            let icon = match v.status {
                VerdictStatus::Fail | VerdictStatus::Error => "❌".red(),
                VerdictStatus::Warning => "⚠️ ".yellow(),
                _ => "ℹ️ ".cyan(),
            };
            let element = v.element.as_deref().unwrap_or("-");
            println!(
                "   {} {} {}: {}",
                icon,
                format!("[{}]", v.rule_id).dimmed(),
                element.yellow(),
                v.message
            );
            if let Some(s) = &v.suggestion {
                println!("      👉 {}", s.bright_white());
            }
        }
    }

    println!();
    let total = format!("Total issues: {}", report.total_issues);
    if report.total_issues == 0 {
        println!("{}", format!("✅ {}", total).green().bold());
    } else {
        println!("{}", format!("🔍 {}", total).yellow().bold());
    }
    println!(
        "{}",
        format!(
            "   Run {} en {} ({})",
            report.run_id,
            report.environment.context_id,
            report.generated_at.format("%Y-%m-%d %H:%M:%S")
        )
        .dimmed()
    );
}

pub fn crear_progreso(mensaje: &str) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new_spinner();
    if let Ok(style) = indicatif::ProgressStyle::default_spinner().template("{spinner:.magenta} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(mensaje.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}
