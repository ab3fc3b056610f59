pub mod catalog;
pub mod evaluator;
pub mod timing;

pub use catalog::RuleCatalog;
pub use evaluator::RuleEvaluator;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum RuleCategory {
    Hover,
    Transition,
    Contrast,
    ColorHarmony,
    Gradient,
    Button,
    Animation,
    Overflow,
    Responsiveness,
    Performance,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 10] = [
        RuleCategory::Hover,
        RuleCategory::Transition,
        RuleCategory::Contrast,
        RuleCategory::ColorHarmony,
        RuleCategory::Gradient,
        RuleCategory::Button,
        RuleCategory::Animation,
        RuleCategory::Overflow,
        RuleCategory::Responsiveness,
        RuleCategory::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::Hover => "hover",
            RuleCategory::Transition => "transition",
            RuleCategory::Contrast => "contrast",
            RuleCategory::ColorHarmony => "colorHarmony",
            RuleCategory::Gradient => "gradient",
            RuleCategory::Button => "button",
            RuleCategory::Animation => "animation",
            RuleCategory::Overflow => "overflow",
            RuleCategory::Responsiveness => "responsiveness",
            RuleCategory::Performance => "performance",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }

    /// Sub-checks que forman la "integración seamless".
    pub fn is_seamless(&self) -> bool {
        matches!(
            self,
            RuleCategory::Overflow | RuleCategory::Responsiveness | RuleCategory::Performance
        )
    }

    /// Categorías que reportan listas de incidencias además de contadores.
    pub fn reports_issue_list(&self) -> bool {
        matches!(self, RuleCategory::Hover | RuleCategory::Transition)
    }
}

impl fmt::Display for RuleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severidad de una regla cuando su comprobación no se cumple.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuleLevel {
    #[default]
    Error,
    Warning,
    Info,
}

/// Cómo se interpreta el conjunto de elementos que coincide con el selector.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MatchScope {
    /// Se espera un elemento concreto; cero coincidencias es "Element not found".
    Structural,
    #[default]
    Collection,
}

/// Qué hacer cuando una regla de colección no encuentra elementos.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmptyMatchPolicy {
    /// Pase vacuo: no hay nada que viole la regla.
    #[default]
    Pass,
    Skip,
    Warn,
    Fail,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Default)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Límites numéricos de una regla. `min_contrast_ratio` se declara pero no
/// se calcula a partir de la luminancia (ver `Check::ApprovedTextColor`).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Tolerance {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_contrast_ratio: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_duration_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opacity: Option<Range>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_viewport_width: Option<u32>,
}

/// Predicado que aplica una regla sobre los estilos resueltos.
///
/// Las comparaciones de color son por contención de texto sobre el valor
/// computado (`rgb(168, 85, 247)`), no por distancia en un espacio de color.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Check {
    /// `transition` cubre cada propiedad de `targets` (o `all`) con duración mínima.
    TransitionCoverage {
        #[serde(default)]
        targets: Vec<String>,
    },
    /// Color en la lista aprobada y, si se pide, `text-shadow` distinto de `none`.
    ApprovedTextColor {
        colors: Vec<String>,
        #[serde(default = "default_true")]
        require_shadow: bool,
    },
    /// Alguna de las propiedades requeridas contiene uno de los valores canónicos.
    CanonicalColor { values: Vec<String> },
    /// Duración mínima y una familia de easing aceptada.
    SmoothTiming { easings: Vec<String> },
    /// El fondo contiene un gradiente; `overlay_fragment` señala la capa morada.
    GradientBackground { overlay_fragment: String },
    /// Cada sección salvo la última lleva la clase marcadora o contiene el overlay.
    SectionGradientMarker {
        marker_class: String,
        overlay_selector: String,
    },
    PropertyEquals { property: String, expected: String },
    MinViewportWidth,
    /// Al menos un elemento con pista de GPU.
    GpuHint,
}

fn default_true() -> bool {
    true
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Rule {
    pub id: String,
    pub category: RuleCategory,
    pub selector: String,
    pub description: String,
    pub required_properties: Vec<String>,
    #[serde(default)]
    pub scope: MatchScope,
    /// `None` usa la política global de la configuración.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_empty: Option<EmptyMatchPolicy>,
    #[serde(default)]
    pub level: RuleLevel,
    #[serde(default)]
    pub tolerance: Tolerance,
    pub check: Check,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Pass,
    Fail,
    Warning,
    Info,
    Error,
}

impl VerdictStatus {
    pub fn is_failure(&self) -> bool {
        matches!(self, VerdictStatus::Fail | VerdictStatus::Error)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Verdict {
    pub rule_id: String,
    pub status: VerdictStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Verdict {
    pub fn new(rule: &Rule, status: VerdictStatus, message: impl Into<String>) -> Self {
        Self {
            rule_id: rule.id.clone(),
            status,
            element: None,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn on(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn suggest(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}
