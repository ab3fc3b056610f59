//! Lectura de valores `transition` computados.

use once_cell::sync::Lazy;
use regex::Regex;

static TIME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(-?\d*\.?\d+)(ms|s)$").unwrap());

const EASING_KEYWORDS: &[&str] = &[
    "ease",
    "ease-in",
    "ease-out",
    "ease-in-out",
    "linear",
    "step-start",
    "step-end",
];

#[derive(Debug, Clone, PartialEq)]
pub struct TransitionItem {
    pub property: String,
    pub duration_secs: f64,
    pub easing: String,
    pub delay_secs: f64,
}

impl TransitionItem {
    pub fn covers(&self, property: &str) -> bool {
        self.property == "all" || self.property == property
    }
}

/// Convierte `0.3s` / `300ms` a segundos.
pub fn parse_time(token: &str) -> Option<f64> {
    let caps = TIME_RE.captures(token.trim())?;
    let value: f64 = caps[1].parse().ok()?;
    Some(if &caps[2] == "ms" { value / 1000.0 } else { value })
}

/// Divide por `sep` ignorando los separadores dentro de paréntesis.
fn split_top_level(value: &str, sep: impl Fn(char) -> bool) -> Vec<String> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in value.chars() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth == 0 && sep(c) {
            if !current.trim().is_empty() {
                parts.push(current.trim().to_string());
            }
            current.clear();
        } else {
            current.push(c);
        }
    }
    if !current.trim().is_empty() {
        parts.push(current.trim().to_string());
    }
    parts
}

fn is_easing(token: &str) -> bool {
    EASING_KEYWORDS.contains(&token) || token.starts_with("cubic-bezier(") || token.starts_with("steps(")
}

/// Descompone un `transition` computado en sus elementos. `none` no produce ninguno.
pub fn parse_transition(value: &str) -> Vec<TransitionItem> {
    let value = value.trim();
    if value.is_empty() || value == "none" {
        return Vec::new();
    }

    split_top_level(value, |c| c == ',')
        .into_iter()
        .filter_map(|item| {
            let mut parsed = TransitionItem {
                property: "all".to_string(),
                duration_secs: 0.0,
                easing: "ease".to_string(),
                delay_secs: 0.0,
            };
            let mut times_seen = 0;

            for token in split_top_level(&item, char::is_whitespace) {
                if let Some(t) = parse_time(&token) {
                    if times_seen == 0 {
                        parsed.duration_secs = t;
                    } else {
                        parsed.delay_secs = t;
                    }
                    times_seen += 1;
                } else if is_easing(&token) {
                    parsed.easing = token;
                } else {
                    parsed.property = token;
                }
            }

            (parsed.property != "none").then_some(parsed)
        })
        .collect()
}
