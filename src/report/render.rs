use crate::report::{RunStatus, ValidationReport};
use crate::rules::VerdictStatus;
use std::fmt::Write;

fn status_icon(status: VerdictStatus) -> &'static str {
    match status {
        VerdictStatus::Pass => "✅",
        VerdictStatus::Fail => "❌",
        VerdictStatus::Warning => "⚠️ ",
        VerdictStatus::Info => "ℹ️ ",
        VerdictStatus::Error => "💥",
    }
}

/// Reporte de texto seccionado. Función pura: el mismo reporte produce
/// siempre el mismo texto.
pub fn format_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    let rule = "=".repeat(50);

    let _ = writeln!(out, "🎨 VISUAL VALIDATION REPORT");
    let _ = writeln!(out, "{}", rule);

    match &report.status {
        RunStatus::EnvironmentUnavailable { reason } => {
            let _ = writeln!(out, "\n❌ ENVIRONMENT UNAVAILABLE: {}", reason);
            let _ = writeln!(out, "   No styles could be resolved; no checks were run.");
        }
        RunStatus::Completed => {
            let _ = writeln!(out, "\n📊 SUMMARY:");
            for result in report.categories.values() {
                let _ = writeln!(
                    out,
                    "- {}: {} ({}/{})",
                    result.category.as_str().to_uppercase(),
                    result.status,
                    result.passed_count,
                    result.passed_count + result.failed_count
                );
            }
            if let Some(seamless) = report.seamless_status() {
                let _ = writeln!(out, "- SEAMLESS INTEGRATION: {}", seamless);
            }
            let _ = writeln!(out, "Total issues: {}", report.total_issues);

            let _ = writeln!(out, "\n📋 DETAILS:");
            for result in report.categories.values() {
                let _ = writeln!(out, "\n{}:", result.category.as_str().to_uppercase());
                if result.verdicts.is_empty() {
                    let _ = writeln!(out, "   (no matching elements)");
                }
                for v in &result.verdicts {
                    let element = v
                        .element
                        .as_deref()
                        .map(|e| format!(" {}", e))
                        .unwrap_or_default();
                    let _ = writeln!(
                        out,
                        "   {} [{}]{}: {}",
                        status_icon(v.status),
                        v.rule_id,
                        element,
                        v.message
                    );
                    if let Some(s) = &v.suggestion {
                        let _ = writeln!(out, "      👉 {}", s);
                    }
                }
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "⏰ Generated at: {}", report.generated_at.to_rfc3339());
    let _ = writeln!(out, "🆔 Run: {}", report.run_id);
    let _ = writeln!(out, "🌐 Context: {}", report.environment.context_id);
    match report.environment.viewport {
        Some(v) => {
            let _ = writeln!(out, "📱 Viewport: {}x{}", v.width, v.height);
        }
        None => {
            let _ = writeln!(out, "📱 Viewport: unavailable");
        }
    }
    out
}

pub fn render_json(report: &ValidationReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

/// Renders a SARIF 2.1.0 JSON string with one result per non-passing verdict.
/// Elements are reported as logical locations since there is no source file.
pub fn render_sarif(report: &ValidationReport) -> String {
    let mut seen_rules: Vec<&str> = Vec::new();
    let mut results_json: Vec<serde_json::Value> = Vec::new();

    if let RunStatus::EnvironmentUnavailable { reason } = &report.status {
        seen_rules.push("environment.unavailable");
        results_json.push(serde_json::json!({
            "ruleId": "environment.unavailable",
            "level": "error",
            "message": { "text": reason },
        }));
    }

    for result in report.categories.values() {
        for v in result.issues() {
            if !seen_rules.contains(&v.rule_id.as_str()) {
                seen_rules.push(&v.rule_id);
            }
            let level = match v.status {
                VerdictStatus::Fail | VerdictStatus::Error => "error",
                VerdictStatus::Info => "note",
                _ => "warning",
            };
            let text = match &v.suggestion {
                Some(s) => format!("{} ({})", v.message, s),
                None => v.message.clone(),
            };
            results_json.push(serde_json::json!({
                "ruleId": v.rule_id,
                "level": level,
                "message": { "text": text },
                "locations": [{
                    "logicalLocations": [{
                        "fullyQualifiedName": v.element.as_deref().unwrap_or(""),
                        "kind": "element"
                    }]
                }]
            }));
        }
    }

    let rules_json: Vec<serde_json::Value> = seen_rules
        .iter()
        .map(|r| {
            serde_json::json!({
                "id": r,
                "shortDescription": { "text": r }
            })
        })
        .collect();

    let sarif = serde_json::json!({
        "$schema": "https://raw.githubusercontent.com/oasis-tcs/sarif-spec/master/Schemata/sarif-schema-2.1.0.json",
        "version": "2.1.0",
        "runs": [{
            "tool": {
                "driver": {
                    "name": "visual-sentinel",
                    "version": env!("CARGO_PKG_VERSION"),
                    "rules": rules_json
                }
            },
            "results": results_json
        }]
    });

    serde_json::to_string_pretty(&sarif).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{SnapshotEnvironment, SnapshotNode};
    use crate::inspect::{UnavailableEnvironment, Viewport};
    use crate::report::run_validation;

    fn page() -> SnapshotEnvironment {
        let root = SnapshotNode::new("html").child(
            SnapshotNode::new("body")
                .child(SnapshotNode::new("button").class("btn-cyber").style("transition", "none")),
        );
        SnapshotEnvironment::new(root, Viewport { width: 1280, height: 720 })
    }

    #[test]
    fn test_format_is_idempotent() {
        let report = run_validation(&page());
        assert_eq!(format_report(&report), format_report(&report));
    }

    #[test]
    fn test_format_contains_sections_and_environment() {
        let report = run_validation(&page());
        let text = format_report(&report);
        assert!(text.contains("📊 SUMMARY:"));
        assert!(text.contains("- HOVER: FAIL"));
        assert!(text.contains("[hover.btn-cyber] button.btn-cyber"));
        assert!(text.contains("📱 Viewport: 1280x720"));
        assert!(text.contains(&report.generated_at.to_rfc3339()));
        assert!(text.contains("SEAMLESS INTEGRATION"));
    }

    #[test]
    fn test_format_unavailable_environment() {
        let report = run_validation(&UnavailableEnvironment);
        let text = format_report(&report);
        assert!(text.contains("ENVIRONMENT UNAVAILABLE"));
        assert!(!text.contains("📊 SUMMARY:"));
        assert!(text.contains("📱 Viewport: unavailable"));
    }

    #[test]
    fn test_render_sarif_produces_valid_structure() {
        let report = run_validation(&page());
        let sarif = render_sarif(&report);
        let parsed: serde_json::Value = serde_json::from_str(&sarif).expect("must be valid JSON");
        assert_eq!(parsed["version"], "2.1.0");
        let results = parsed["runs"][0]["results"].as_array().unwrap();
        assert!(results.iter().any(|r| r["ruleId"] == "hover.btn-cyber" && r["level"] == "error"));
        assert!(
            results
                .iter()
                .all(|r| r["ruleId"] != "responsiveness.viewport"),
            "passing checks must not be reported"
        );
    }

    #[test]
    fn test_render_json_roundtrip() {
        let report = run_validation(&page());
        let json = render_json(&report).unwrap();
        let back: ValidationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_issues, report.total_issues);
    }
}
