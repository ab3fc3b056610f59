//! Inspector de estilos computados
//!
//! Abstrae el entorno de renderizado (equivalente a `querySelectorAll` +
//! `getComputedStyle`) y resuelve los valores finales de cada propiedad para
//! los elementos que coinciden con un selector.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Propiedades de estilo reconocidas por el inspector.
pub const RECOGNIZED_PROPERTIES: &[&str] = &[
    "animation",
    "background",
    "background-color",
    "background-image",
    "border-color",
    "box-shadow",
    "color",
    "cursor",
    "filter",
    "opacity",
    "overflow-x",
    "overflow-y",
    "text-shadow",
    "transform",
    "transition",
    "width",
    "will-change",
];

pub fn is_recognized_property(name: &str) -> bool {
    RECOGNIZED_PROPERTIES.contains(&name)
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum InspectError {
    #[error("style resolution unavailable: {reason}")]
    EnvironmentUnavailable { reason: String },

    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("cannot resolve '{property}' on {element}: {reason}")]
    PropertyResolution {
        property: String,
        element: String,
        reason: String,
    },
}

impl InspectError {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::EnvironmentUnavailable {
            reason: reason.into(),
        }
    }

    pub fn is_environment_unavailable(&self) -> bool {
        matches!(self, Self::EnvironmentUnavailable { .. })
    }
}

/// Referencia opaca a un elemento dentro de un entorno.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef(pub usize);

/// Identificador legible de un elemento: tag + id + clases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementDescriptor {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl fmt::Display for ElementDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)?;
        if let Some(id) = &self.id {
            write!(f, "#{}", id)?;
        }
        for class in &self.classes {
            write!(f, ".{}", class)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Capacidad de consulta y resolución de estilos que provee el host.
pub trait StyleEnvironment {
    /// Todos los elementos del documento que coinciden con `selector`, en orden de documento.
    fn query_all(&self, selector: &str) -> Result<Vec<ElementRef>, InspectError>;

    /// Descendientes de `scope` que coinciden con `selector`.
    fn query_within(&self, scope: ElementRef, selector: &str)
    -> Result<Vec<ElementRef>, InspectError>;

    fn describe(&self, element: ElementRef) -> ElementDescriptor;

    /// Valor computado (cascada + herencia aplicadas) de una propiedad.
    fn computed_value(&self, element: ElementRef, property: &str) -> Result<String, InspectError>;

    fn viewport(&self) -> Result<Viewport, InspectError>;

    /// Identificador del contexto de ejecución (user agent, headless runner, ...).
    fn context_id(&self) -> String;
}

/// Entorno sin capacidad de resolver estilos (fuera de una vista renderizada).
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableEnvironment;

const NO_RENDERER: &str = "no rendered view is attached";

impl StyleEnvironment for UnavailableEnvironment {
    fn query_all(&self, _selector: &str) -> Result<Vec<ElementRef>, InspectError> {
        Err(InspectError::unavailable(NO_RENDERER))
    }

    fn query_within(
        &self,
        _scope: ElementRef,
        _selector: &str,
    ) -> Result<Vec<ElementRef>, InspectError> {
        Err(InspectError::unavailable(NO_RENDERER))
    }

    fn describe(&self, element: ElementRef) -> ElementDescriptor {
        ElementDescriptor {
            tag: format!("<detached {}>", element.0),
            id: None,
            classes: Vec::new(),
        }
    }

    fn computed_value(&self, _element: ElementRef, _property: &str) -> Result<String, InspectError> {
        Err(InspectError::unavailable(NO_RENDERER))
    }

    fn viewport(&self) -> Result<Viewport, InspectError> {
        Err(InspectError::unavailable(NO_RENDERER))
    }

    fn context_id(&self) -> String {
        "unavailable".to_string()
    }
}

/// Valores resueltos para un elemento. Se crea por evaluación y se descarta después.
#[derive(Debug, Clone, PartialEq)]
pub struct StyleSnapshot {
    pub element: ElementDescriptor,
    pub values: BTreeMap<String, String>,
}

impl StyleSnapshot {
    pub fn get(&self, property: &str) -> &str {
        self.values.get(property).map(String::as_str).unwrap_or("")
    }
}

pub type Resolved = Result<StyleSnapshot, InspectError>;

/// Resuelve `properties` para cada elemento que coincide con `selector`.
///
/// Cero coincidencias no es un error: devuelve un vector vacío y el llamador
/// decide. Un fallo al leer una propiedad sólo afecta a ese elemento, salvo
/// `EnvironmentUnavailable`, que se propaga.
pub fn resolve_styles(
    env: &dyn StyleEnvironment,
    selector: &str,
    properties: &[String],
) -> Result<Vec<Resolved>, InspectError> {
    let elements = env.query_all(selector)?;
    let mut resolved = Vec::with_capacity(elements.len());

    for element in elements {
        resolved.push(snapshot_element(env, element, properties)?);
    }

    Ok(resolved)
}

fn snapshot_element(
    env: &dyn StyleEnvironment,
    element: ElementRef,
    properties: &[String],
) -> Result<Resolved, InspectError> {
    let descriptor = env.describe(element);
    let mut values = BTreeMap::new();

    for property in properties {
        match env.computed_value(element, property) {
            Ok(value) => {
                values.insert(property.clone(), value);
            }
            Err(e) if e.is_environment_unavailable() => return Err(e),
            Err(e) => return Ok(Err(e)),
        }
    }

    Ok(Ok(StyleSnapshot {
        element: descriptor,
        values,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognized_properties() {
        assert!(is_recognized_property("transition"));
        assert!(is_recognized_property("text-shadow"));
        assert!(!is_recognized_property("colour"));
    }

    #[test]
    fn test_unavailable_environment_fails_everything() {
        let env = UnavailableEnvironment;
        let err = resolve_styles(&env, "button", &["transition".to_string()]).unwrap_err();
        assert!(err.is_environment_unavailable());
        assert!(env.viewport().is_err());
    }

    #[test]
    fn test_descriptor_display() {
        let d = ElementDescriptor {
            tag: "button".into(),
            id: Some("cta".into()),
            classes: vec!["btn-cyber".into(), "glass".into()],
        };
        assert_eq!(d.to_string(), "button#cta.btn-cyber.glass");
    }
}
