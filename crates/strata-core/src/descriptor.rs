//! The narrow descriptor-tree interface consumed by the snapshot loader.
//!
//! Parsing scenario files is somebody else's job. The loader only needs
//! to look up named children and attributes and to walk children in
//! document order, which is what [`Descriptor`] offers. [`Element`] is a
//! plain in-memory implementation, also produced by the state saver.

use std::fmt;

/// Read-only view of one node of a parsed descriptor tree.
///
/// Implementations must yield children in document order. The loader
/// never mutates the tree.
pub trait Descriptor {
    /// Element tag, e.g. `"model"`.
    fn tag(&self) -> &str;

    /// Value of a named attribute, if present.
    fn attribute(&self, name: &str) -> Option<&str>;

    /// Text content of the element, if any.
    fn text(&self) -> Option<&str>;

    /// All child elements in document order.
    fn children(&self) -> Box<dyn Iterator<Item = &dyn Descriptor> + '_>;

    /// First child element with the given tag.
    fn child(&self, tag: &str) -> Option<&dyn Descriptor> {
        self.children().find(|c| c.tag() == tag)
    }
}

/// An owned descriptor element.
///
/// # Examples
///
/// ```
/// use strata_core::{Descriptor, Element};
///
/// let joint = Element::new("joint")
///     .with_attribute("name", "elbow")
///     .with_child(Element::new("angle").with_attribute("axis", "0").with_text("0.2"));
///
/// assert_eq!(joint.attribute("name"), Some("elbow"));
/// assert_eq!(joint.child("angle").and_then(|a| a.text()), Some("0.2"));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Element {
    tag: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<Element>,
}

impl Element {
    /// An empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Builder: set (or replace) an attribute.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder: set the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Builder: append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Set (or replace) an attribute.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => *v = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: Element) {
        self.children.push(child);
    }

    /// Owned children in document order.
    pub fn elements(&self) -> &[Element] {
        &self.children
    }
}

impl Descriptor for Element {
    fn tag(&self) -> &str {
        &self.tag
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn children(&self) -> Box<dyn Iterator<Item = &dyn Descriptor> + '_> {
        Box::new(self.children.iter().map(|c| c as &dyn Descriptor))
    }
}

fn escape(s: &str, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for c in s.chars() {
        match c {
            '&' => f.write_str("&amp;")?,
            '<' => f.write_str("&lt;")?,
            '>' => f.write_str("&gt;")?,
            '"' => f.write_str("&quot;")?,
            c => write!(f, "{c}")?,
        }
    }
    Ok(())
}

impl Element {
    fn write_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{:width$}<{}", "", self.tag, width = depth * 2)?;
        for (k, v) in &self.attributes {
            write!(f, " {k}=\"")?;
            escape(v, f)?;
            f.write_str("\"")?;
        }
        if self.children.is_empty() && self.text.is_none() {
            return writeln!(f, "/>");
        }
        f.write_str(">")?;
        if let Some(text) = &self.text {
            escape(text, f)?;
        }
        if !self.children.is_empty() {
            writeln!(f)?;
            for child in &self.children {
                child.write_indented(f, depth + 1)?;
            }
            write!(f, "{:width$}", "", width = depth * 2)?;
        }
        writeln!(f, "</{}>", self.tag)
    }
}

/// Renders the element as indented markup, one element per line.
impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
