//! Entorno de estilos respaldado por una captura del DOM
//!
//! Una captura es un árbol de elementos con sus estilos computados exportado
//! desde un navegador (devtools, runner headless de CI). Las propiedades
//! ausentes se heredan del ancestro más cercano cuando la propiedad es
//! heredable, o toman su valor inicial.

use crate::dom::selector::{ElementTree, SelectorList};
use crate::inspect::{
    ElementDescriptor, ElementRef, InspectError, StyleEnvironment, Viewport,
    is_recognized_property,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("cannot read snapshot {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Propiedades heredables y su valor inicial; el resto sólo tiene valor inicial.
const INHERITED: &[&str] = &["color", "cursor", "text-shadow"];

fn initial_value(property: &str) -> &'static str {
    match property {
        "animation" => "none 0s ease 0s 1 normal none running",
        "background" => "rgba(0, 0, 0, 0) none repeat scroll 0% 0% / auto padding-box border-box",
        "background-color" => "rgba(0, 0, 0, 0)",
        "background-image" | "box-shadow" | "filter" | "text-shadow" | "transform" => "none",
        "color" => "rgb(0, 0, 0)",
        "cursor" | "width" | "will-change" => "auto",
        "opacity" => "1",
        "overflow-x" | "overflow-y" => "visible",
        "transition" => "all 0s ease 0s",
        _ => "",
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub tag: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub classes: Vec<String>,
    /// Valores computados capturados, por nombre de propiedad CSS.
    #[serde(default)]
    pub computed: BTreeMap<String, String>,
    #[serde(default)]
    pub children: Vec<SnapshotNode>,
}

impl SnapshotNode {
    pub fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            ..Self::default()
        }
    }

    pub fn class(mut self, class: &str) -> Self {
        self.classes.push(class.to_string());
        self
    }

    pub fn attr(mut self, name: &str, value: &str) -> Self {
        self.attributes.insert(name.to_string(), value.to_string());
        self
    }

    pub fn style(mut self, property: &str, value: &str) -> Self {
        self.computed.insert(property.to_string(), value.to_string());
        self
    }

    pub fn child(mut self, child: SnapshotNode) -> Self {
        self.children.push(child);
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotDocument {
    pub viewport: Viewport,
    #[serde(default)]
    pub user_agent: Option<String>,
    pub root: SnapshotNode,
}

#[derive(Debug, Clone)]
struct FlatNode {
    parent: Option<usize>,
    tag: String,
    attributes: BTreeMap<String, String>,
    classes: Vec<String>,
    computed: BTreeMap<String, String>,
    // Índice (exclusivo) del último descendiente en orden de documento.
    subtree_end: usize,
}

#[derive(Debug, Clone)]
pub struct SnapshotEnvironment {
    nodes: Vec<FlatNode>,
    viewport: Viewport,
    user_agent: String,
}

impl SnapshotEnvironment {
    pub fn new(root: SnapshotNode, viewport: Viewport) -> Self {
        Self::from_document(SnapshotDocument {
            viewport,
            user_agent: None,
            root,
        })
    }

    pub fn from_document(doc: SnapshotDocument) -> Self {
        let mut nodes = Vec::new();
        flatten(doc.root, None, &mut nodes);
        Self {
            nodes,
            viewport: doc.viewport,
            user_agent: doc
                .user_agent
                .unwrap_or_else(|| format!("dom-snapshot/{}", env!("CARGO_PKG_VERSION"))),
        }
    }

    pub fn from_json(content: &str) -> Result<Self, SnapshotError> {
        let doc: SnapshotDocument = serde_json::from_str(content)?;
        Ok(Self::from_document(doc))
    }

    pub fn load(path: &Path) -> Result<Self, SnapshotError> {
        let content = fs::read_to_string(path).map_err(|source| SnapshotError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn parse_selector(selector: &str) -> Result<SelectorList, InspectError> {
        SelectorList::parse(selector).map_err(|e| InspectError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })
    }

    fn node(&self, element: ElementRef) -> Result<&FlatNode, InspectError> {
        self.nodes
            .get(element.0)
            .ok_or_else(|| InspectError::PropertyResolution {
                property: String::new(),
                element: format!("#{}", element.0),
                reason: "element is not part of this snapshot".to_string(),
            })
    }
}

fn flatten(node: SnapshotNode, parent: Option<usize>, out: &mut Vec<FlatNode>) {
    let index = out.len();
    out.push(FlatNode {
        parent,
        tag: node.tag.to_ascii_lowercase(),
        attributes: node.attributes,
        classes: node.classes,
        computed: node.computed,
        subtree_end: index + 1,
    });
    for child in node.children {
        flatten(child, Some(index), out);
    }
    out[index].subtree_end = out.len();
}

impl ElementTree for SnapshotEnvironment {
    fn parent(&self, node: usize) -> Option<usize> {
        self.nodes[node].parent
    }

    fn tag(&self, node: usize) -> &str {
        &self.nodes[node].tag
    }

    fn element_id(&self, node: usize) -> Option<&str> {
        self.nodes[node].attributes.get("id").map(String::as_str)
    }

    fn has_class(&self, node: usize, class: &str) -> bool {
        self.nodes[node].classes.iter().any(|c| c == class)
    }

    fn attribute(&self, node: usize, name: &str) -> Option<String> {
        let n = &self.nodes[node];
        if name == "class" && !n.classes.is_empty() {
            return Some(n.classes.join(" "));
        }
        n.attributes.get(name).cloned()
    }
}

impl StyleEnvironment for SnapshotEnvironment {
    fn query_all(&self, selector: &str) -> Result<Vec<ElementRef>, InspectError> {
        let list = Self::parse_selector(selector)?;
        Ok((0..self.nodes.len())
            .filter(|&n| list.matches(self, n))
            .map(ElementRef)
            .collect())
    }

    fn query_within(
        &self,
        scope: ElementRef,
        selector: &str,
    ) -> Result<Vec<ElementRef>, InspectError> {
        let list = Self::parse_selector(selector)?;
        let end = self.node(scope)?.subtree_end;
        Ok((scope.0 + 1..end)
            .filter(|&n| list.matches(self, n))
            .map(ElementRef)
            .collect())
    }

    fn describe(&self, element: ElementRef) -> ElementDescriptor {
        match self.nodes.get(element.0) {
            Some(n) => ElementDescriptor {
                tag: n.tag.clone(),
                id: n.attributes.get("id").cloned(),
                classes: n.classes.clone(),
            },
            None => ElementDescriptor {
                tag: format!("<unknown {}>", element.0),
                id: None,
                classes: Vec::new(),
            },
        }
    }

    fn computed_value(&self, element: ElementRef, property: &str) -> Result<String, InspectError> {
        let node = self.node(element)?;
        if !is_recognized_property(property) {
            return Err(InspectError::PropertyResolution {
                property: property.to_string(),
                element: self.describe(element).to_string(),
                reason: "unrecognized style property".to_string(),
            });
        }

        if let Some(value) = node.computed.get(property) {
            return Ok(value.clone());
        }

        if INHERITED.contains(&property) {
            let mut current = node.parent;
            while let Some(p) = current {
                if let Some(value) = self.nodes[p].computed.get(property) {
                    return Ok(value.clone());
                }
                current = self.nodes[p].parent;
            }
        }

        // border-color inicial es currentColor
        if property == "border-color" {
            return self.computed_value(element, "color");
        }

        Ok(initial_value(property).to_string())
    }

    fn viewport(&self) -> Result<Viewport, InspectError> {
        Ok(self.viewport)
    }

    fn context_id(&self) -> String {
        self.user_agent.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> SnapshotEnvironment {
        let root = SnapshotNode::new("html").style("overflow-x", "hidden").child(
            SnapshotNode::new("body")
                .style("color", "rgb(248, 250, 252)")
                .child(
                    SnapshotNode::new("section")
                        .attr("id", "hero")
                        .child(SnapshotNode::new("p").class("text-body-contrast"))
                        .child(SnapshotNode::new("div").class("gradient-overlay")),
                )
                .child(SnapshotNode::new("section").attr("id", "about")),
        );
        SnapshotEnvironment::new(root, Viewport { width: 1280, height: 720 })
    }

    #[test]
    fn test_inherited_and_initial_values() {
        let env = page();
        let p = env.query_all(".text-body-contrast").unwrap()[0];
        assert_eq!(env.computed_value(p, "color").unwrap(), "rgb(248, 250, 252)");
        assert_eq!(env.computed_value(p, "text-shadow").unwrap(), "none");
        // overflow-x no se hereda
        assert_eq!(env.computed_value(p, "overflow-x").unwrap(), "visible");
        assert_eq!(env.computed_value(p, "transition").unwrap(), "all 0s ease 0s");
    }

    #[test]
    fn test_border_color_defaults_to_current_color() {
        let root = SnapshotNode::new("html").child(
            SnapshotNode::new("body")
                .style("color", "rgb(168, 85, 247)")
                .child(SnapshotNode::new("div").class("border-purple"))
                .child(
                    SnapshotNode::new("div")
                        .class("framed")
                        .style("border-color", "rgb(51, 65, 85)"),
                ),
        );
        let env = SnapshotEnvironment::new(root, Viewport { width: 1280, height: 720 });
        let inherited = env.query_all(".border-purple").unwrap()[0];
        assert_eq!(env.computed_value(inherited, "border-color").unwrap(), "rgb(168, 85, 247)");
        let explicit = env.query_all(".framed").unwrap()[0];
        assert_eq!(env.computed_value(explicit, "border-color").unwrap(), "rgb(51, 65, 85)");

        let bare = SnapshotEnvironment::new(SnapshotNode::new("html"), Viewport { width: 1280, height: 720 });
        assert_eq!(bare.computed_value(ElementRef(0), "border-color").unwrap(), "rgb(0, 0, 0)");
    }

    #[test]
    fn test_unrecognized_property_is_an_error() {
        let env = page();
        let p = env.query_all("p").unwrap()[0];
        let err = env.computed_value(p, "colour").unwrap_err();
        assert!(matches!(err, InspectError::PropertyResolution { .. }));
    }

    #[test]
    fn test_query_within_is_scoped_to_descendants() {
        let env = page();
        let sections = env.query_all("section[id]").unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(env.query_within(sections[0], ".gradient-overlay").unwrap().len(), 1);
        assert!(env.query_within(sections[1], ".gradient-overlay").unwrap().is_empty());
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let env = page();
        let err = env.query_all("a:hover").unwrap_err();
        assert!(matches!(err, InspectError::InvalidSelector { .. }));
    }

    #[test]
    fn test_from_json() {
        let json = r#"{
            "viewport": { "width": 375, "height": 667 },
            "userAgent": "HeadlessChrome/120",
            "root": { "tag": "HTML", "children": [
                { "tag": "button", "classes": ["btn-cyber"], "computed": { "transition": "all 0.3s ease 0s" } }
            ] }
        }"#;
        let env = SnapshotEnvironment::from_json(json).unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(env.context_id(), "HeadlessChrome/120");
        assert_eq!(env.viewport().unwrap().width, 375);
        assert_eq!(env.query_all("html").unwrap().len(), 1);
        let btn = env.query_all(".btn-cyber").unwrap()[0];
        assert_eq!(env.describe(btn).to_string(), "button.btn-cyber");
    }

    #[test]
    fn test_load_missing_file() {
        let err = SnapshotEnvironment::load(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(matches!(err, SnapshotError::Io { .. }));
    }
}
