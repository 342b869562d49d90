// qsapy - A transpiler turning QS script syntax trees into Python source
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Syntax tree definitions for the qsapy transpiler.
//!
//! The QS front end hands us its tree as XML, so a node is nothing more than
//! an element: a tag, ordered attributes and ordered children. Nodes are
//! never annotated during code generation; parent links and scopes travel
//! in the traversal context instead.

mod query;

pub use query::Descendants;

/// A node of the QS syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Node {
    /// Node type discriminator (the XML tag).
    pub tag: String,
    /// Attributes in document order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes in document order.
    pub children: Vec<Node>,
}

impl Node {
    /// Create a node without attributes or children.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute.
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder: append a child.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// Builder: append several children.
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    /// Get an attribute value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get an attribute value or a fallback.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Set an attribute, replacing an existing value in place.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((key, value)),
        }
    }

    /// Check whether the node has this tag.
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Get the n-th child.
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Iterate over direct children with the given tag.
    pub fn children_named<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.children.iter().filter(move |c| c.tag == tag)
    }

    /// Whether a direct child has `tag` and attribute `key` equal to `value`.
    pub fn has_child_with(&self, tag: &str, key: &str, value: &str) -> bool {
        self.children_named(tag).any(|c| c.get(key) == Some(value))
    }

    /// Serialize the node back to XML (used in diagnostics).
    pub fn to_xml(&self) -> String {
        let mut out = String::new();
        self.write_xml(&mut out);
        out
    }

    fn write_xml(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }
        if self.children.is_empty() {
            out.push_str(" />");
            return;
        }
        out.push('>');
        for child in &self.children {
            child.write_xml(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

fn escape_attribute(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\n' => out.push_str("&#10;"),
            c => out.push(c),
        }
    }
    out
}

impl std::fmt::Display for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_xml())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let node = Node::new("Identifier").with_attr("name", "x");
        assert_eq!(node.tag, "Identifier");
        assert_eq!(node.get("name"), Some("x"));
        assert_eq!(node.get("type"), None);
        assert_eq!(node.get_or("type", "none"), "none");
    }

    #[test]
    fn test_set_keeps_order() {
        let mut node = Node::new("Variable").with_attr("name", "a").with_attr("type", "Number");
        node.set("name", "b");
        node.set("constructor", "1");
        let keys: Vec<_> = node.attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["name", "type", "constructor"]);
        assert_eq!(node.get("name"), Some("b"));
    }

    #[test]
    fn test_has_child_with() {
        let node = Node::new("Expression")
            .with_child(Node::new("OpMath").with_attr("type", "PLUS"))
            .with_child(Node::new("Constant").with_attr("type", "String"));
        assert!(node.has_child_with("OpMath", "type", "PLUS"));
        assert!(!node.has_child_with("OpMath", "type", "MINUS"));
    }

    #[test]
    fn test_to_xml() {
        let node = Node::new("Value").with_child(
            Node::new("Constant")
                .with_attr("delim", "\"")
                .with_attr("value", "a<b"),
        );
        assert_eq!(
            node.to_xml(),
            "<Value><Constant delim=\"&quot;\" value=\"a&lt;b\" /></Value>"
        );
    }
}
