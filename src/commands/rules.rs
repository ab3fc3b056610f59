use crate::commands::build_validator;
use crate::config::{CONFIG_FILE, ValidatorConfig};
use crate::rules::{RuleCategory, RuleLevel};
use colored::Colorize;

pub fn handle_rules_command(project_root: &std::path::Path, category: Option<&str>) {
    let filter = match category {
        Some(name) => match RuleCategory::parse(name) {
            Some(c) => Some(c),
            None => {
                let known: Vec<&str> = RuleCategory::ALL.iter().map(|c| c.as_str()).collect();
                eprintln!(
                    "{} Categoría desconocida '{}'. Disponibles: {}",
                    "❌".red(),
                    name,
                    known.join(", ")
                );
                std::process::exit(2);
            }
        },
        None => None,
    };

    let validator = build_validator(project_root, false);
    let config = validator.config();

    println!("\n{}", "Reglas activas:".bold());

    for category in RuleCategory::ALL {
        if filter.is_some_and(|f| f != category) {
            continue;
        }
        let rules = validator.catalog().get_rules_for(category);
        if rules.is_empty() {
            continue;
        }
        println!("\n  {}", category.as_str().to_uppercase().bright_magenta());
        for r in rules {
            let level = match r.level {
                RuleLevel::Error => "[ERROR]",
                RuleLevel::Warning => "[WARNING]",
                RuleLevel::Info => "[INFO]",
            };
            println!(
                "  {} {:<26} {:<10} {}  {}",
                "[ON] ".green(),
                r.id.yellow(),
                level,
                r.description,
                r.selector.dimmed()
            );
        }
    }

    if !config.disabled_rules.is_empty() {
        println!();
        for id in &config.disabled_rules {
            println!("  {} {}", "[OFF]".red(), id.dimmed());
        }
    }

    println!();
    if ValidatorConfig::load(project_root).is_none() {
        println!("   Info: No se encontro {}. Usando valores por defecto.", CONFIG_FILE);
    } else {
        println!("   Info: Para cambiar umbrales, edita {}:", CONFIG_FILE);
    }
    println!("   hover_transition_min_seconds = {}", config.hover_transition_min_seconds);
    println!("   min_viewport_width = {}", config.min_viewport_width);
    println!("   auto_run_delay_ms = {}", config.auto_run_delay_ms);
}
