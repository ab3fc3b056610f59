//! Subconjunto de selectores CSS usado por las reglas del catálogo.
//!
//! Soporta tipo, `*`, `#id`, `.clase`, atributos (`[a]`, `=`, `*=`, `^=`,
//! `$=`, `~=`), combinadores descendiente y `>` y listas separadas por comas.

use std::fmt;

/// Vista mínima de un árbol de elementos sobre la que se evalúan selectores.
pub trait ElementTree {
    fn parent(&self, node: usize) -> Option<usize>;
    fn tag(&self, node: usize) -> &str;
    fn element_id(&self, node: usize) -> Option<&str>;
    fn has_class(&self, node: usize, class: &str) -> bool;
    fn attribute(&self, node: usize, name: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorError {
    pub position: usize,
    pub reason: String,
}

impl fmt::Display for SelectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at {})", self.reason, self.position)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum AttrOp {
    Exists,
    Equals(String),
    Contains(String),
    Prefix(String),
    Suffix(String),
    Word(String),
}

#[derive(Debug, Clone, PartialEq)]
struct AttributeMatcher {
    name: String,
    op: AttrOp,
}

impl AttributeMatcher {
    fn matches(&self, value: Option<String>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match &self.op {
            AttrOp::Exists => true,
            AttrOp::Equals(v) => value == *v,
            AttrOp::Contains(v) => !v.is_empty() && value.contains(v.as_str()),
            AttrOp::Prefix(v) => !v.is_empty() && value.starts_with(v.as_str()),
            AttrOp::Suffix(v) => !v.is_empty() && value.ends_with(v.as_str()),
            AttrOp::Word(v) => value.split_whitespace().any(|w| w == v),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attributes: Vec<AttributeMatcher>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attributes.is_empty()
    }

    fn matches<T: ElementTree + ?Sized>(&self, tree: &T, node: usize) -> bool {
        if let Some(tag) = &self.tag {
            if tag != "*" && !tree.tag(node).eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if tree.element_id(node) != Some(id.as_str()) {
                return false;
            }
        }
        self.classes.iter().all(|c| tree.has_class(node, c))
            && self
                .attributes
                .iter()
                .all(|a| a.matches(tree.attribute(node, &a.name)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq)]
struct ComplexSelector {
    // El combinador relaciona cada compuesto con el anterior; el del primero se ignora.
    parts: Vec<(Combinator, Compound)>,
}

impl ComplexSelector {
    fn matches<T: ElementTree + ?Sized>(&self, tree: &T, node: usize) -> bool {
        self.matches_at(tree, self.parts.len() - 1, node)
    }

    fn matches_at<T: ElementTree + ?Sized>(&self, tree: &T, index: usize, node: usize) -> bool {
        let (combinator, compound) = &self.parts[index];
        if !compound.matches(tree, node) {
            return false;
        }
        if index == 0 {
            return true;
        }
        match combinator {
            Combinator::Child => tree
                .parent(node)
                .is_some_and(|p| self.matches_at(tree, index - 1, p)),
            Combinator::Descendant => {
                let mut current = tree.parent(node);
                while let Some(ancestor) = current {
                    if self.matches_at(tree, index - 1, ancestor) {
                        return true;
                    }
                    current = tree.parent(ancestor);
                }
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectorList {
    selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        Parser::new(input).parse_list()
    }

    pub fn matches<T: ElementTree + ?Sized>(&self, tree: &T, node: usize) -> bool {
        self.selectors.iter().any(|s| s.matches(tree, node))
    }
}

struct Parser {
    chars: Vec<char>,
    pos: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            pos: 0,
        }
    }

    fn error<T>(&self, reason: impl Into<String>) -> Result<T, SelectorError> {
        Err(SelectorError {
            position: self.pos,
            reason: reason.into(),
        })
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn parse_list(&mut self) -> Result<SelectorList, SelectorError> {
        let mut selectors = Vec::new();
        loop {
            self.skip_whitespace();
            selectors.push(self.parse_complex()?);
            match self.peek() {
                Some(',') => self.pos += 1,
                None => break,
                Some(c) => return self.error(format!("unexpected '{}'", c)),
            }
        }
        Ok(SelectorList { selectors })
    }

    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut parts = Vec::new();
        let mut combinator = Combinator::Descendant;

        loop {
            let compound = self.parse_compound()?;
            if compound.is_empty() {
                return self.error("expected a selector");
            }
            parts.push((combinator, compound));

            let had_space = self.skip_whitespace();
            match self.peek() {
                None | Some(',') => break,
                Some('>') => {
                    self.pos += 1;
                    self.skip_whitespace();
                    combinator = Combinator::Child;
                }
                Some('+') | Some('~') => return self.error("unsupported combinator"),
                Some(_) if had_space => combinator = Combinator::Descendant,
                Some(c) => return self.error(format!("unexpected '{}'", c)),
            }
        }

        Ok(ComplexSelector { parts })
    }

    fn parse_compound(&mut self) -> Result<Compound, SelectorError> {
        let mut compound = Compound::default();

        if self.peek() == Some('*') {
            self.pos += 1;
            compound.tag = Some("*".to_string());
        } else if self.peek().is_some_and(is_ident_char) {
            compound.tag = Some(self.parse_ident()?.to_ascii_lowercase());
        }

        loop {
            match self.peek() {
                Some('.') => {
                    self.pos += 1;
                    compound.classes.push(self.parse_ident()?);
                }
                Some('#') => {
                    self.pos += 1;
                    compound.id = Some(self.parse_ident()?);
                }
                Some('[') => {
                    self.pos += 1;
                    compound.attributes.push(self.parse_attribute()?);
                }
                Some(':') => return self.error("pseudo-classes are not supported"),
                _ => break,
            }
        }

        Ok(compound)
    }

    fn parse_ident(&mut self) -> Result<String, SelectorError> {
        let start = self.pos;
        while self.peek().is_some_and(is_ident_char) {
            self.pos += 1;
        }
        if start == self.pos {
            return self.error("expected an identifier");
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn parse_attribute(&mut self) -> Result<AttributeMatcher, SelectorError> {
        self.skip_whitespace();
        let name = self.parse_ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.pos += 1;
                return Ok(AttributeMatcher {
                    name,
                    op: AttrOp::Exists,
                });
            }
            Some('=') => {
                self.pos += 1;
                "="
            }
            Some(c @ ('*' | '^' | '$' | '~')) => {
                self.pos += 1;
                if self.peek() != Some('=') {
                    return self.error("expected '='");
                }
                self.pos += 1;
                match c {
                    '*' => "*=",
                    '^' => "^=",
                    '$' => "$=",
                    _ => "~=",
                }
            }
            _ => return self.error("malformed attribute selector"),
        };

        self.skip_whitespace();
        let value = self.parse_attribute_value()?;
        self.skip_whitespace();
        if self.peek() != Some(']') {
            return self.error("expected ']'");
        }
        self.pos += 1;

        let op = match op {
            "=" => AttrOp::Equals(value),
            "*=" => AttrOp::Contains(value),
            "^=" => AttrOp::Prefix(value),
            "$=" => AttrOp::Suffix(value),
            _ => AttrOp::Word(value),
        };
        Ok(AttributeMatcher { name, op })
    }

    fn parse_attribute_value(&mut self) -> Result<String, SelectorError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => {
                self.pos += 1;
                let start = self.pos;
                while self.peek().is_some_and(|c| c != quote) {
                    self.pos += 1;
                }
                if self.peek().is_none() {
                    return self.error("unterminated string");
                }
                let value = self.chars[start..self.pos].iter().collect();
                self.pos += 1;
                Ok(value)
            }
            _ => self.parse_ident(),
        }
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    struct Node {
        parent: Option<usize>,
        tag: &'static str,
        id: Option<&'static str>,
        classes: Vec<&'static str>,
        attrs: BTreeMap<&'static str, &'static str>,
    }

    struct Tree(Vec<Node>);

    impl ElementTree for Tree {
        fn parent(&self, node: usize) -> Option<usize> {
            self.0[node].parent
        }
        fn tag(&self, node: usize) -> &str {
            self.0[node].tag
        }
        fn element_id(&self, node: usize) -> Option<&str> {
            self.0[node].id
        }
        fn has_class(&self, node: usize, class: &str) -> bool {
            self.0[node].classes.contains(&class)
        }
        fn attribute(&self, node: usize, name: &str) -> Option<String> {
            if name == "class" {
                return Some(self.0[node].classes.join(" "));
            }
            self.0[node].attrs.get(name).map(|v| v.to_string())
        }
    }

    fn tree() -> Tree {
        let node = |parent, tag, id, classes: Vec<&'static str>, attrs: Vec<(&'static str, &'static str)>| Node {
            parent,
            tag,
            id,
            classes,
            attrs: attrs.into_iter().collect(),
        };
        Tree(vec![
            node(None, "html", None, vec![], vec![]),
            node(Some(0), "body", None, vec![], vec![]),
            node(Some(1), "section", Some("hero"), vec!["section-transition"], vec![("id", "hero")]),
            node(Some(2), "div", None, vec!["gradient-overlay"], vec![]),
            node(Some(2), "a", None, vec!["motion-fade", "btn-glass"], vec![("href", "#about")]),
            node(Some(1), "button", None, vec![], vec![("style", "will-change: transform")]),
        ])
    }

    fn matching(selector: &str) -> Vec<usize> {
        let t = tree();
        let list = SelectorList::parse(selector).unwrap();
        (0..t.0.len()).filter(|&n| list.matches(&t, n)).collect()
    }

    #[test]
    fn test_simple_selectors() {
        assert_eq!(matching("button"), vec![5]);
        assert_eq!(matching(".gradient-overlay"), vec![3]);
        assert_eq!(matching("#hero"), vec![2]);
        assert_eq!(matching("section[id]"), vec![2]);
        assert_eq!(matching("*").len(), 6);
    }

    #[test]
    fn test_attribute_operators() {
        assert_eq!(matching("[class*=\"motion-\"]"), vec![4]);
        assert_eq!(matching("[style*='will-change']"), vec![5]);
        assert_eq!(matching("a[href^=\"#\"]"), vec![4]);
        assert_eq!(matching("[class~=btn-glass]"), vec![4]);
        assert_eq!(matching("a[href]"), vec![4]);
        assert!(matching("[class*=\"\"]").is_empty());
    }

    #[test]
    fn test_combinators_and_lists() {
        assert_eq!(matching("section .gradient-overlay"), vec![3]);
        assert_eq!(matching("body > section"), vec![2]);
        assert!(matching("html > section").is_empty());
        assert_eq!(matching("html, body"), vec![0, 1]);
        assert_eq!(matching(".glass, .btn-primary, .btn-glass"), vec![4]);
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(SelectorList::parse("").is_err());
        assert!(SelectorList::parse("a:hover").is_err());
        assert!(SelectorList::parse("[href").is_err());
        assert!(SelectorList::parse("a + b").is_err());
        assert!(SelectorList::parse("button,").is_err());
    }
}
