//! Evaluador de reglas
//!
//! Para cada regla: resuelve los elementos (Matching), aplica el predicado de
//! su `Check` (Checking) y emite veredictos. Un fallo de una regla nunca
//! interrumpe las demás; sólo `EnvironmentUnavailable` corta la ejecución.

use crate::config::ValidatorConfig;
use crate::inspect::{InspectError, StyleEnvironment, StyleSnapshot, resolve_styles};
use crate::rules::timing::{TransitionItem, parse_transition};
use crate::rules::{
    Check, EmptyMatchPolicy, MatchScope, Rule, RuleLevel, Verdict, VerdictStatus,
};

pub const ELEMENT_NOT_FOUND: &str = "Element not found";

pub struct RuleEvaluator<'a> {
    config: &'a ValidatorConfig,
}

fn failure_status(level: RuleLevel) -> VerdictStatus {
    match level {
        RuleLevel::Error => VerdictStatus::Fail,
        RuleLevel::Warning => VerdictStatus::Warning,
        RuleLevel::Info => VerdictStatus::Info,
    }
}

impl<'a> RuleEvaluator<'a> {
    pub fn new(config: &'a ValidatorConfig) -> Self {
        Self { config }
    }

    /// Evalúa las reglas de una categoría en orden. Sólo devuelve `Err` si el
    /// entorno no puede resolver estilos.
    pub fn evaluate_category(
        &self,
        env: &dyn StyleEnvironment,
        rules: &[&Rule],
    ) -> Result<Vec<Verdict>, InspectError> {
        let mut verdicts = Vec::new();
        for rule in rules {
            verdicts.extend(self.evaluate_rule(env, rule)?);
        }
        Ok(verdicts)
    }

    pub fn evaluate_rule(
        &self,
        env: &dyn StyleEnvironment,
        rule: &Rule,
    ) -> Result<Vec<Verdict>, InspectError> {
        let result = match &rule.check {
            Check::SectionGradientMarker {
                marker_class,
                overlay_selector,
            } => self.check_sections(env, rule, marker_class, overlay_selector),
            Check::MinViewportWidth => self.check_viewport(env, rule),
            Check::GpuHint => self.check_gpu_hints(env, rule),
            _ => self.check_elements(env, rule),
        };

        match result {
            Ok(verdicts) => Ok(verdicts),
            Err(e) if e.is_environment_unavailable() => Err(e),
            Err(e) => Ok(vec![error_verdict(rule, &e)]),
        }
    }

    fn empty_match(&self, rule: &Rule) -> Vec<Verdict> {
        if rule.scope == MatchScope::Structural {
            return vec![
                Verdict::new(rule, VerdictStatus::Fail, ELEMENT_NOT_FOUND)
                    .on(rule.selector.clone())
                    .suggest(format!("Verificar que {} exista en la página", rule.selector)),
            ];
        }

        let message = format!("Ningún elemento coincide con {}", rule.selector);
        match rule.on_empty.unwrap_or(self.config.empty_collection_policy) {
            // Pase vacuo: passed=0, failed=0
            EmptyMatchPolicy::Pass => Vec::new(),
            EmptyMatchPolicy::Skip => vec![Verdict::new(rule, VerdictStatus::Info, message)],
            EmptyMatchPolicy::Warn => {
                let mut v = Verdict::new(rule, VerdictStatus::Warning, message);
                v.suggestion = rule.suggestion.clone();
                vec![v]
            }
            EmptyMatchPolicy::Fail => {
                let mut v = Verdict::new(rule, VerdictStatus::Fail, message);
                v.suggestion = rule.suggestion.clone();
                vec![v]
            }
        }
    }

    fn check_elements(
        &self,
        env: &dyn StyleEnvironment,
        rule: &Rule,
    ) -> Result<Vec<Verdict>, InspectError> {
        let resolved = resolve_styles(env, &rule.selector, &rule.required_properties)?;
        if resolved.is_empty() {
            return Ok(self.empty_match(rule));
        }

        Ok(resolved
            .into_iter()
            .map(|r| match r {
                Ok(snapshot) => self.check_snapshot(rule, &snapshot),
                Err(e) => error_verdict(rule, &e),
            })
            .collect())
    }

    fn check_snapshot(&self, rule: &Rule, snapshot: &StyleSnapshot) -> Verdict {
        let (passed, message) = match &rule.check {
            Check::TransitionCoverage { targets } => self.transition_coverage(rule, snapshot, targets),
            Check::ApprovedTextColor {
                colors,
                require_shadow,
            } => approved_text_color(snapshot, colors, *require_shadow),
            Check::CanonicalColor { values } => canonical_color(rule, snapshot, values),
            Check::SmoothTiming { easings } => self.smooth_timing(rule, snapshot, easings),
            Check::GradientBackground { overlay_fragment } => {
                return gradient_background(rule, snapshot, overlay_fragment);
            }
            Check::PropertyEquals { property, expected } => {
                let actual = snapshot.get(property);
                (
                    actual == expected.as_str(),
                    format!("{}: {} (se esperaba {})", property, actual, expected),
                )
            }
            Check::SectionGradientMarker { .. } | Check::MinViewportWidth | Check::GpuHint => {
                (false, "la comprobación no aplica a elementos individuales".to_string())
            }
        };

        let element = snapshot.element.to_string();
        if passed {
            Verdict::new(rule, VerdictStatus::Pass, message).on(element)
        } else {
            let mut v = Verdict::new(rule, failure_status(rule.level), message).on(element);
            v.suggestion = rule.suggestion.clone();
            v
        }
    }

    fn min_duration(&self, rule: &Rule) -> f64 {
        rule.tolerance
            .min_duration_secs
            .unwrap_or(self.config.hover_transition_min_seconds)
    }

    fn transition_coverage(
        &self,
        rule: &Rule,
        snapshot: &StyleSnapshot,
        targets: &[String],
    ) -> (bool, String) {
        let transition = snapshot.get("transition");
        let items = parse_transition(transition);
        let min = self.min_duration(rule);

        if items.is_empty() {
            return (
                false,
                format!("Hover sin configurar ({}): transition: none", rule.description),
            );
        }

        let timed = |item: &&TransitionItem| item.duration_secs >= min;

        if targets.is_empty() {
            return if items.iter().any(|i| timed(&i)) {
                (true, format!("transition: {}", transition))
            } else {
                (
                    false,
                    format!(
                        "Hover sin configurar ({}): transition menor de {}s",
                        rule.description, min
                    ),
                )
            };
        }

        let missing: Vec<&str> = targets
            .iter()
            .filter(|t| !items.iter().filter(timed).any(|i| i.covers(t)))
            .map(String::as_str)
            .collect();

        if missing.is_empty() {
            (true, format!("transition: {}", transition))
        } else {
            (
                false,
                format!(
                    "Hover sin configurar ({}): falta {} de al menos {}s",
                    rule.description,
                    missing.join(", "),
                    min
                ),
            )
        }
    }

    fn smooth_timing(&self, rule: &Rule, snapshot: &StyleSnapshot, easings: &[String]) -> (bool, String) {
        let transition = snapshot.get("transition");
        let min = self.min_duration(rule);
        let max = rule.tolerance.max_duration_secs.unwrap_or(f64::INFINITY);

        let smooth = parse_transition(transition).iter().any(|i| {
            i.duration_secs >= min
                && i.duration_secs <= max
                && easings.iter().any(|e| i.easing.starts_with(e.as_str()))
        });

        let message = if smooth {
            format!("transition: {}", transition)
        } else {
            format!(
                "Transición brusca: {} (se esperaba >= {}s con {})",
                if transition.is_empty() { "none" } else { transition },
                min,
                easings.join(" o ")
            )
        };
        (smooth, message)
    }

    fn check_sections(
        &self,
        env: &dyn StyleEnvironment,
        rule: &Rule,
        marker_class: &str,
        overlay_selector: &str,
    ) -> Result<Vec<Verdict>, InspectError> {
        let sections = env.query_all(&rule.selector)?;
        if sections.is_empty() {
            return Ok(self.empty_match(rule));
        }

        let mut verdicts = Vec::new();
        let last = sections.len() - 1;

        for (index, section) in sections.into_iter().enumerate() {
            let descriptor = env.describe(section);
            let name = descriptor.id.clone().unwrap_or_else(|| "unknown".to_string());

            if let Some(e) = rule
                .required_properties
                .iter()
                .find_map(|p| env.computed_value(section, p).err())
            {
                if e.is_environment_unavailable() {
                    return Err(e);
                }
                verdicts.push(error_verdict(rule, &e).on(name));
                continue;
            }

            // La última sección no necesita transición hacia una siguiente
            if index == last {
                continue;
            }

            let has_marker = descriptor.classes.iter().any(|c| c == marker_class)
                || match env.query_within(section, overlay_selector) {
                    Ok(overlays) => !overlays.is_empty(),
                    Err(e) if e.is_environment_unavailable() => return Err(e),
                    Err(e) => {
                        verdicts.push(error_verdict(rule, &e).on(name));
                        continue;
                    }
                };

            if has_marker {
                verdicts.push(
                    Verdict::new(rule, VerdictStatus::Pass, "La sección tiene transición en gradiente").on(name),
                );
            } else {
                let mut v = Verdict::new(
                    rule,
                    failure_status(rule.level),
                    "Sección sin transición en gradiente",
                )
                .on(name);
                v.suggestion = rule.suggestion.clone();
                verdicts.push(v);
            }
        }

        Ok(verdicts)
    }

    fn check_viewport(&self, env: &dyn StyleEnvironment, rule: &Rule) -> Result<Vec<Verdict>, InspectError> {
        let viewport = env.viewport()?;
        let min = rule
            .tolerance
            .min_viewport_width
            .unwrap_or(self.config.min_viewport_width);
        let message = format!("Viewport {}x{} (ancho mínimo {}px)", viewport.width, viewport.height, min);

        let verdict = if viewport.width >= min {
            Verdict::new(rule, VerdictStatus::Pass, message)
        } else {
            let mut v = Verdict::new(rule, failure_status(rule.level), message);
            v.suggestion = rule.suggestion.clone();
            v
        };
        Ok(vec![verdict])
    }

    fn check_gpu_hints(&self, env: &dyn StyleEnvironment, rule: &Rule) -> Result<Vec<Verdict>, InspectError> {
        let resolved = resolve_styles(env, &rule.selector, &rule.required_properties)?;
        if resolved.is_empty() {
            return Ok(self.empty_match(rule));
        }

        let mut verdicts = Vec::new();
        let mut optimized = 0;
        let mut hinted = 0;
        for r in &resolved {
            match r {
                Ok(snapshot) => {
                    optimized += 1;
                    if !matches!(snapshot.get("will-change"), "" | "auto") {
                        hinted += 1;
                    }
                }
                Err(e) => verdicts.push(error_verdict(rule, e)),
            }
        }

        if optimized > 0 {
            verdicts.push(Verdict::new(
                rule,
                VerdictStatus::Pass,
                format!(
                    "{} elemento(s) optimizado(s), {} con will-change explícito",
                    optimized, hinted
                ),
            ));
        }
        Ok(verdicts)
    }
}

fn error_verdict(rule: &Rule, error: &InspectError) -> Verdict {
    let v = Verdict::new(rule, VerdictStatus::Error, format!("Error al verificar: {}", error))
        .suggest("Verificar selector e implementación");
    match error {
        InspectError::PropertyResolution { element, .. } => v.on(element.clone()),
        _ => v.on(rule.selector.clone()),
    }
}

fn approved_text_color(snapshot: &StyleSnapshot, colors: &[String], require_shadow: bool) -> (bool, String) {
    let color = snapshot.get("color");
    let shadow = snapshot.get("text-shadow");
    let has_color = colors.iter().any(|c| c == color);
    let has_shadow = !shadow.is_empty() && shadow != "none";
    let passed = has_color && (has_shadow || !require_shadow);

    let message = match (has_color, has_shadow || !require_shadow) {
        (true, true) => format!("color: {}; text-shadow: {}", color, shadow),
        (false, _) => format!("El color de texto {} no está en el conjunto aprobado", color),
        (true, false) => format!("El color de texto {} no tiene text-shadow", color),
    };
    (passed, message)
}

fn canonical_color(rule: &Rule, snapshot: &StyleSnapshot, values: &[String]) -> (bool, String) {
    let matched = rule.required_properties.iter().find(|p| {
        let actual = snapshot.get(p);
        values.iter().any(|v| actual.contains(v.as_str()))
    });

    match matched {
        Some(p) => (true, format!("{}: {}", p, snapshot.get(p))),
        None => (
            false,
            format!(
                "Morado fuera de la paleta: {}",
                rule.required_properties
                    .iter()
                    .map(|p| format!("{}: {}", p, snapshot.get(p)))
                    .collect::<Vec<_>>()
                    .join("; ")
            ),
        ),
    }
}

/// Canal alfa del primer `rgba(...)` que empieza por `fragment`. Sin alfa explícito es 1.
fn overlay_opacity(background: &str, fragment: &str) -> Option<f64> {
    let start = background.find(fragment)? + fragment.len();
    let rest = &background[start..];
    let args = &rest[..rest.find(')')?];
    match args.trim_start_matches(',').trim() {
        "" => Some(1.0),
        alpha => alpha.split(',').next_back()?.trim().parse().ok(),
    }
}

fn gradient_background(rule: &Rule, snapshot: &StyleSnapshot, overlay_fragment: &str) -> Verdict {
    let background = snapshot.get("background");
    let layers = background.matches("-gradient(").count();
    let element = snapshot.element.to_string();

    let overlay_alpha = overlay_opacity(background, overlay_fragment);
    let out_of_range = rule
        .tolerance
        .opacity
        .zip(overlay_alpha)
        .filter(|(range, alpha)| !range.contains(*alpha));

    let (status, message) = if layers == 0 {
        (failure_status(rule.level), "El fondo no tiene capa de gradiente".to_string())
    } else if !background.contains(overlay_fragment) {
        (
            VerdictStatus::Warning,
            format!("{} capa(s) de gradiente sin overlay morado", layers),
        )
    } else if let Some((range, alpha)) = out_of_range {
        (
            VerdictStatus::Warning,
            format!(
                "Opacidad del overlay morado {} fuera de [{}, {}]",
                alpha, range.min, range.max
            ),
        )
    } else {
        (
            VerdictStatus::Pass,
            format!("{} capa(s) de gradiente con overlay morado", layers),
        )
    };

    let v = Verdict::new(rule, status, message).on(element);
    match status {
        VerdictStatus::Pass => v,
        _ => Verdict {
            suggestion: rule.suggestion.clone(),
            ..v
        },
    }
}
