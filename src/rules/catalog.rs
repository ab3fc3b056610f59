//! Catálogo declarativo de reglas visuales
//!
//! Cada regla asocia un selector con el contrato de estilos que deben cumplir
//! los elementos que coinciden. Las reglas se construyen al arrancar y no se
//! modifican después; un archivo YAML puede añadir reglas nuevas.

use crate::config::ValidatorConfig;
use crate::inspect::is_recognized_property;
use crate::rules::{Check, MatchScope, Rule, RuleCategory, RuleLevel, Tolerance};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

/// Duración mínima de la transición de hover, en segundos.
pub const HOVER_TRANSITION_MIN_SECONDS: f64 = 0.3;
/// Ancho mínimo de viewport soportado (móvil).
pub const MIN_VIEWPORT_WIDTH: u32 = 375;

/// WCAG AAA
pub const CONTRAST_HIGH_MIN_RATIO: f64 = 7.1;
/// WCAG AA
pub const CONTRAST_MEDIUM_MIN_RATIO: f64 = 4.5;
/// WCAG AA
pub const CONTRAST_BODY_MIN_RATIO: f64 = 4.5;

pub const TEXT_WHITE_RGB: &str = "rgb(255, 255, 255)";
pub const TEXT_LIGHT_GRAY_RGB: &str = "rgb(248, 250, 252)";

/// Purple-500 (#a855f7)
pub const PURPLE_PRIMARY_RGB: &str = "rgb(168, 85, 247)";
/// Purple-400 (#c084fc)
pub const PURPLE_LIGHT_RGB: &str = "rgb(192, 132, 252)";
pub const PURPLE_OVERLAY_FRAGMENT: &str = "rgba(168, 85, 247";

const GRADIENT_SECTIONS: [&str; 5] = ["hero", "about", "projects", "skills", "contact"];

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("rule '{id}' declares no required style properties")]
    EmptyProperties { id: String },

    #[error("rule '{id}' requires unknown style property '{property}'")]
    UnknownProperty { id: String, property: String },

    #[error("duplicate rule id '{id}'")]
    DuplicateId { id: String },

    #[error("cannot read rules file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed rules file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone)]
pub struct RuleCatalog {
    rules: Vec<Rule>,
}

fn rule(
    id: &str,
    category: RuleCategory,
    scope: MatchScope,
    selector: &str,
    description: &str,
    properties: &[&str],
    check: Check,
) -> Rule {
    Rule {
        id: id.to_string(),
        category,
        selector: selector.to_string(),
        description: description.to_string(),
        required_properties: properties.iter().map(|p| p.to_string()).collect(),
        scope,
        on_empty: None,
        level: RuleLevel::Error,
        tolerance: Tolerance::default(),
        check,
        suggestion: None,
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Rule {
    fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    fn with_level(mut self, level: RuleLevel) -> Self {
        self.level = level;
        self
    }

    fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.suggestion = Some(suggestion.to_string());
        self
    }

    fn with_on_empty(mut self, policy: crate::rules::EmptyMatchPolicy) -> Self {
        self.on_empty = Some(policy);
        self
    }

    /// Comprueba el invariante de propiedades: no vacío y todas reconocidas.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.required_properties.is_empty() {
            return Err(CatalogError::EmptyProperties {
                id: self.id.clone(),
            });
        }
        if let Some(p) = self
            .required_properties
            .iter()
            .find(|p| !is_recognized_property(p))
        {
            return Err(CatalogError::UnknownProperty {
                id: self.id.clone(),
                property: p.clone(),
            });
        }
        Ok(())
    }
}

fn hover_rules(config: &ValidatorConfig) -> Vec<Rule> {
    use MatchScope::*;
    let timing = Tolerance {
        min_duration_secs: Some(config.hover_transition_min_seconds),
        ..Tolerance::default()
    };
    let coverage = |targets: &[&str]| Check::TransitionCoverage {
        targets: strings(targets),
    };

    vec![
        rule("hover.btn-cyber", RuleCategory::Hover, Structural, ".btn-cyber",
            "Botón Cyber: el hover anima transform y box-shadow",
            &["transition"], coverage(&["transform", "box-shadow"])),
        rule("hover.glass-cyber", RuleCategory::Hover, Structural, ".glass-cyber",
            "Glass Cyber: el hover anima border-color",
            &["transition"], coverage(&["border-color"])),
        rule("hover.card-cyber", RuleCategory::Hover, Structural, ".card-cyber",
            "Card Cyber: el hover anima transform",
            &["transition"], coverage(&["transform"])),
        rule("hover.buttons", RuleCategory::Hover, Collection, "button",
            "Botones: todos declaran transición de hover",
            &["transition", "cursor"], coverage(&[])),
        rule("hover.links", RuleCategory::Hover, Collection, "a[href]",
            "Enlaces: todos declaran transición de hover",
            &["transition"], coverage(&[])),
    ]
    .into_iter()
    .map(|r| {
        r.with_tolerance(timing.clone())
            .with_suggestion("Declarar `transition` con transform/box-shadow de al menos 0.3s")
    })
    .collect()
}

fn transition_rules() -> Vec<Rule> {
    vec![
        rule("transition.sections", RuleCategory::Transition, MatchScope::Collection, "section[id]",
            "Secciones: transición en gradiente hacia la siguiente",
            &["background-color"],
            Check::SectionGradientMarker {
                marker_class: "section-transition".to_string(),
                overlay_selector: ".gradient-overlay".to_string(),
            })
        .with_level(RuleLevel::Info)
        .with_suggestion("Añadir la clase section-transition o un .gradient-overlay"),
    ]
}

fn contrast_rules() -> Vec<Rule> {
    let tiers = [
        ("contrast.high", ".text-high-contrast", "Títulos principales y elementos críticos", CONTRAST_HIGH_MIN_RATIO),
        ("contrast.medium", ".text-medium-contrast", "Subtítulos e información importante", CONTRAST_MEDIUM_MIN_RATIO),
        ("contrast.body", ".text-body-contrast", "Párrafos y texto corrido", CONTRAST_BODY_MIN_RATIO),
    ];

    tiers
        .into_iter()
        .map(|(id, selector, usage, ratio)| {
            rule(id, RuleCategory::Contrast, MatchScope::Collection, selector, usage,
                &["color", "text-shadow"],
                Check::ApprovedTextColor {
                    colors: strings(&[TEXT_WHITE_RGB, TEXT_LIGHT_GRAY_RGB]),
                    require_shadow: true,
                })
            .with_tolerance(Tolerance {
                min_contrast_ratio: Some(ratio),
                ..Tolerance::default()
            })
            .with_suggestion("Usar #ffffff o #f8fafc con text-shadow")
        })
        .collect()
}

fn color_harmony_rules() -> Vec<Rule> {
    vec![
        rule("colorHarmony.purple", RuleCategory::ColorHarmony, MatchScope::Collection,
            ".text-purple, .border-purple, .icon-purple",
            "Acentos morados: sólo los tonos canónicos de la paleta",
            &["color", "border-color"],
            Check::CanonicalColor {
                values: strings(&[PURPLE_PRIMARY_RGB, PURPLE_LIGHT_RGB]),
            })
        .with_suggestion("Usar purple-500 (#a855f7) o purple-400 (#c084fc)"),
    ]
}

fn gradient_rules() -> Vec<Rule> {
    GRADIENT_SECTIONS
        .iter()
        .map(|section| {
            rule(&format!("gradient.{}", section), RuleCategory::Gradient, MatchScope::Structural,
                &format!(".gradient-{}", section),
                &format!("Fondo de {} con gradiente multicapa", section),
                &["background"],
                Check::GradientBackground {
                    overlay_fragment: PURPLE_OVERLAY_FRAGMENT.to_string(),
                })
            .with_tolerance(Tolerance {
                opacity: Some(crate::rules::Range { min: 0.06, max: 0.15 }),
                ..Tolerance::default()
            })
            .with_suggestion("Componer linear-gradient con un overlay rgba(168, 85, 247, 0.06-0.15)")
        })
        .collect()
}

fn smooth_timing(config: &ValidatorConfig) -> (Tolerance, Check) {
    (
        Tolerance {
            min_duration_secs: Some(config.hover_transition_min_seconds),
            ..Tolerance::default()
        },
        Check::SmoothTiming {
            easings: strings(&["ease", "cubic-bezier"]),
        },
    )
}

fn button_rules(config: &ValidatorConfig) -> Vec<Rule> {
    let (tolerance, check) = smooth_timing(config);
    vec![
        rule("button.interactions", RuleCategory::Button, MatchScope::Collection,
            ".btn-primary, .btn-glass, .glass-hover",
            "Botones primarios y glass: transición de 0.3s con easing suave",
            &["transition", "transform"], check)
        .with_tolerance(tolerance)
        .with_suggestion("Usar `transition: all 0.3s ease`"),
    ]
}

fn animation_rules(config: &ValidatorConfig) -> Vec<Rule> {
    let (tolerance, check) = smooth_timing(config);
    vec![
        rule("animation.smoothness", RuleCategory::Animation, MatchScope::Collection,
            "[class*=\"motion-\"], .glass, .btn-primary, .btn-glass",
            "Elementos animados: transiciones suaves",
            &["transition", "animation"], check)
        .with_tolerance(tolerance)
        .with_suggestion("Usar ease/cubic-bezier(0.25, 0.46, 0.45, 0.94) de al menos 0.3s"),
    ]
}

fn overflow_rules() -> Vec<Rule> {
    ["html", "body"]
        .into_iter()
        .map(|tag| {
            rule(&format!("overflow.{}", tag), RuleCategory::Overflow, MatchScope::Structural, tag,
                &format!("{} sin scroll horizontal", tag),
                &["overflow-x"],
                Check::PropertyEquals {
                    property: "overflow-x".to_string(),
                    expected: "hidden".to_string(),
                })
            .with_suggestion("Declarar overflow-x: hidden en html y body")
        })
        .collect()
}

fn responsiveness_rules(config: &ValidatorConfig) -> Vec<Rule> {
    vec![
        rule("responsiveness.viewport", RuleCategory::Responsiveness, MatchScope::Structural, "html",
            "Viewport al menos del ancho móvil mínimo",
            &["width"], Check::MinViewportWidth)
        .with_tolerance(Tolerance {
            min_viewport_width: Some(config.min_viewport_width),
            ..Tolerance::default()
        })
        .with_suggestion("Probar en 375x667, 1366x768 y 1920x1080"),
    ]
}

fn performance_rules() -> Vec<Rule> {
    vec![
        rule("performance.gpu-hints", RuleCategory::Performance, MatchScope::Collection,
            "[style*=\"will-change\"], .glass, .btn-primary, .btn-glass",
            "Al menos un elemento optimizado para GPU",
            &["will-change"], Check::GpuHint)
        .with_level(RuleLevel::Warning)
        .with_on_empty(crate::rules::EmptyMatchPolicy::Warn)
        .with_suggestion("Añadir will-change a los elementos animados"),
    ]
}

impl RuleCatalog {
    /// Catálogo integrado con umbrales, overrides y reglas deshabilitadas de `config`.
    pub fn builtin(config: &ValidatorConfig) -> Self {
        let mut rules = Vec::new();
        for category in RuleCategory::ALL {
            rules.extend(match category {
                RuleCategory::Hover => hover_rules(config),
                RuleCategory::Transition => transition_rules(),
                RuleCategory::Contrast => contrast_rules(),
                RuleCategory::ColorHarmony => color_harmony_rules(),
                RuleCategory::Gradient => gradient_rules(),
                RuleCategory::Button => button_rules(config),
                RuleCategory::Animation => animation_rules(config),
                RuleCategory::Overflow => overflow_rules(),
                RuleCategory::Responsiveness => responsiveness_rules(config),
                RuleCategory::Performance => performance_rules(),
            });
        }

        let mut catalog = Self { rules };
        catalog.apply_config(config);
        catalog
    }

    pub fn from_rules(rules: Vec<Rule>) -> Result<Self, CatalogError> {
        let mut catalog = Self { rules: Vec::new() };
        catalog.extend(rules)?;
        Ok(catalog)
    }

    fn apply_config(&mut self, config: &ValidatorConfig) {
        self.rules.retain(|r| !config.is_disabled(&r.id));
        for rule in &mut self.rules {
            if let Some(policy) = config.override_for(&rule.id).and_then(|o| o.on_empty) {
                rule.on_empty = Some(policy);
            }
        }
    }

    /// Añade reglas tras validarlas. Ninguna se añade si alguna es inválida.
    pub fn extend(&mut self, rules: Vec<Rule>) -> Result<(), CatalogError> {
        let mut seen: HashSet<&str> = self.rules.iter().map(|r| r.id.as_str()).collect();
        for r in &rules {
            r.validate()?;
            if !seen.insert(r.id.as_str()) {
                return Err(CatalogError::DuplicateId { id: r.id.clone() });
            }
        }
        self.rules.extend(rules);
        Ok(())
    }

    pub fn extend_from_yaml(&mut self, yaml_path: &Path) -> Result<usize, CatalogError> {
        let content = fs::read_to_string(yaml_path)?;
        let rules: Vec<Rule> = serde_yaml::from_str(&content)?;
        let count = rules.len();
        self.extend(rules)?;
        Ok(count)
    }

    /// Reglas de una categoría, en orden de declaración.
    pub fn get_rules_for(&self, category: RuleCategory) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.category == category).collect()
    }

    pub fn all(&self) -> &[Rule] {
        &self.rules
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn validate(&self) -> Result<(), CatalogError> {
        self.rules.iter().try_for_each(Rule::validate)
    }
}

impl Default for RuleCatalog {
    fn default() -> Self {
        Self::builtin(&ValidatorConfig::default())
    }
}
