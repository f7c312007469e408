// src/element/mod.rs

//! In-memory metadata XML trees
//!
//! A [`MetadataElement`] is the content handed to the section writer by the
//! MIX/PREMIS/description collaborators. It is an ordinary element tree:
//! a qualified name, an ordered attribute list and mixed children (nested
//! elements and text).
//!
//! Namespaces are kept lexical: `mix:mix` is just a name, and namespace
//! declarations are plain `xmlns:*` attributes. That keeps the canonical
//! form (and therefore the digest) independent of prefix resolution.
//!
//! The digest of an element is computed over its canonical serialization,
//! in which attributes are sorted by name. Two trees that differ only in
//! attribute order hash identically.

mod parse;
mod write;

use crate::hash::{self, HashAlgorithm};

pub use write::write_document;

/// A child node of a metadata element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(MetadataElement),
    Text(String),
}

/// An XML element with attributes and children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataElement {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl MetadataElement {
    /// Create an empty element with the given (possibly prefixed) name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder form of [`set_attribute`](Self::set_attribute)
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Builder form of [`push_text`](Self::push_text)
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.push_text(text);
        self
    }

    /// Builder form of [`push_child`](Self::push_child)
    pub fn with_child(mut self, child: MetadataElement) -> Self {
        self.push_child(child);
        self
    }

    /// Set an attribute. An existing attribute with the same name keeps its
    /// position and gets the new value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(existing) => existing.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Append a text node. Adjacent text nodes are merged.
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(Node::Text(last)) = self.children.last_mut() {
            last.push_str(&text);
        } else {
            self.children.push(Node::Text(text));
        }
    }

    pub fn push_child(&mut self, child: MetadataElement) {
        self.children.push(Node::Element(child));
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attributes in insertion order
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Iterate over child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &MetadataElement> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First direct child element with the given name
    pub fn find(&self, name: &str) -> Option<&MetadataElement> {
        self.child_elements().find(|e| e.name == name)
    }

    /// Concatenated direct text content
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Canonical serialization: sorted attributes, escaped text, no
    /// insignificant whitespace, empty elements self-closed.
    pub fn to_canonical_string(&self) -> String {
        let mut out = String::new();
        write::canonical_into(self, &mut out);
        out
    }

    /// Content digest of this element
    pub fn digest(&self, algorithm: HashAlgorithm) -> String {
        digest(self, algorithm)
    }
}

/// Hash the canonical form of `element`.
///
/// Pure function of tag names, attribute names and values (in any order),
/// text and child structure.
pub fn digest(element: &MetadataElement, algorithm: HashAlgorithm) -> String {
    hash::hash_bytes(algorithm, element.to_canonical_string().as_bytes())
}
