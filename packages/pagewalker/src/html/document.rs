//! Owned, mutable HTML document tree.
//!
//! Markup is parsed once with `scraper` (html5ever) and copied into a flat
//! arena so elements can be addressed by [`NodeId`] and form state
//! (values, checked/selected flags) can be written back.

use std::collections::HashMap;
use std::fmt;

use scraper::Html;

use super::utils::normalize_whitespace;

/// Handle to a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element payload: lower-cased local name and attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    local_name: String,
    attributes: Vec<(String, String)>,
}

impl ElementData {
    fn new<'a>(name: &str, attributes: impl Iterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            local_name: name.to_ascii_lowercase(),
            attributes: attributes
                .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
                .collect(),
        }
    }

    /// Local tag name without namespace prefix, lower case.
    #[must_use]
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Attribute pairs in source order.
    #[must_use]
    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Kind of node stored in the arena.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    /// The document root.
    Document,
    /// An element.
    Element(ElementData),
    /// A text node.
    Text(String),
}

#[derive(Debug, Clone)]
struct Node {
    data: NodeData,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Parsed HTML document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
}

impl Document {
    /// Parse an HTML document.
    ///
    /// Parsing never fails: html5ever recovers from malformed markup the way
    /// browsers do. Tag and attribute names are lower-cased; comments,
    /// doctypes and processing instructions are dropped.
    ///
    /// # Examples
    /// ```
    /// use pagewalker::html::Document;
    ///
    /// let doc = Document::parse("<P ID=intro>Hello <b>world</b></P>");
    /// let p = doc.descendants(doc.root()).find(|n| doc.local_name(*n) == Some("p")).unwrap();
    /// assert_eq!(doc.attribute(p, "id"), Some("intro"));
    /// assert_eq!(doc.own_text(p), "Hello");
    /// assert_eq!(doc.inner_text(p), "Hello world");
    /// ```
    #[must_use]
    pub fn parse(html: &str) -> Self {
        let parsed = Html::parse_document(html);
        let mut nodes: Vec<Node> = Vec::new();
        let mut ids = HashMap::new();

        for source in parsed.tree.root().descendants() {
            let data = match source.value() {
                scraper::Node::Document | scraper::Node::Fragment => NodeData::Document,
                scraper::Node::Element(element) => {
                    NodeData::Element(ElementData::new(element.name(), element.attrs()))
                }
                scraper::Node::Text(text) => NodeData::Text(String::from(&**text)),
                _ => continue,
            };

            let id = NodeId(nodes.len());
            let parent = source.parent().and_then(|p| ids.get(&p.id()).copied());
            if let Some(NodeId(parent_index)) = parent {
                nodes[parent_index].children.push(id);
            }
            ids.insert(source.id(), id);
            nodes.push(Node {
                data,
                parent,
                children: Vec::new(),
            });
        }

        if nodes.is_empty() {
            nodes.push(Node {
                data: NodeData::Document,
                parent: None,
                children: Vec::new(),
            });
        }

        Self { nodes }
    }

    /// Parse raw response bytes, replacing invalid UTF-8.
    #[must_use]
    pub fn parse_bytes(bytes: &[u8]) -> Self {
        Self::parse(&String::from_utf8_lossy(bytes))
    }

    /// The document root node.
    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The `<html>` element.
    #[must_use]
    pub fn root_element(&self) -> Option<NodeId> {
        self.element_children(self.root()).next()
    }

    /// Node payload.
    ///
    /// # Panics
    /// Panics if `id` does not belong to this document.
    #[must_use]
    pub fn data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0].data
    }

    /// Whether the node is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.data(id), NodeData::Element(_))
    }

    fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.data(id) {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match &mut self.nodes[id.0].data {
            NodeData::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Local tag name of an element.
    #[must_use]
    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.element(id).map(ElementData::local_name)
    }

    /// Attribute value, looked up case-insensitively.
    #[must_use]
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id).and_then(|element| element.attribute(name))
    }

    /// All attributes of an element.
    #[must_use]
    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        self.element(id).map(ElementData::attributes).unwrap_or(&[])
    }

    /// Whether an element carries an attribute (with any value).
    #[must_use]
    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    /// Set an attribute, replacing an existing value. No-op for non-elements.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(element) = self.element_mut(id) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        match element.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => element.attributes.push((name, value.to_string())),
        }
    }

    /// Remove an attribute if present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(element) = self.element_mut(id) {
            element
                .attributes
                .retain(|(key, _)| !key.eq_ignore_ascii_case(name));
        }
    }

    /// Parent node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// Child nodes in document order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Element children in document order.
    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.is_element(*child))
    }

    /// All nodes below `id` in document order, excluding `id` itself.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            document: self,
            stack: self.children(id).iter().rev().copied().collect(),
        }
    }

    /// All nodes above `id`, nearest first, excluding `id` itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.parent(id), |current| self.parent(*current))
    }

    /// Whitespace-normalized text of the node's direct text children.
    #[must_use]
    pub fn own_text(&self, id: NodeId) -> String {
        let raw: String = self
            .children(id)
            .iter()
            .filter_map(|child| match self.data(*child) {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ");
        normalize_whitespace(&raw)
    }

    /// Whitespace-normalized text of all descendant text nodes.
    #[must_use]
    pub fn inner_text(&self, id: NodeId) -> String {
        normalize_whitespace(&self.raw_text(id))
    }

    /// Concatenated descendant text exactly as it appears in the source.
    #[must_use]
    pub fn raw_text(&self, id: NodeId) -> String {
        self.descendants(id)
            .filter_map(|node| match self.data(node) {
                NodeData::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children of a node with a single text node.
    pub fn set_text(&mut self, id: NodeId, text: &str) {
        for child in std::mem::take(&mut self.nodes[id.0].children) {
            self.nodes[child.0].parent = None;
        }
        let text_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            data: NodeData::Text(text.to_string()),
            parent: Some(id),
            children: Vec::new(),
        });
        self.nodes[id.0].children.push(text_id);
    }

    /// Short start-tag rendering of an element for error messages.
    ///
    /// # Examples
    /// ```
    /// use pagewalker::html::Document;
    ///
    /// let doc = Document::parse(r#"<input type="checkbox" name="agree">"#);
    /// let input = doc.descendants(doc.root()).find(|n| doc.local_name(*n) == Some("input")).unwrap();
    /// assert_eq!(doc.summary(input), r#"<input type="checkbox" name="agree">"#);
    /// ```
    #[must_use]
    pub fn summary(&self, id: NodeId) -> String {
        match self.data(id) {
            NodeData::Document => "#document".to_string(),
            NodeData::Text(text) => format!("#text \"{}\"", normalize_whitespace(text)),
            NodeData::Element(element) => {
                let mut out = format!("<{}", element.local_name);
                for (name, value) in &element.attributes {
                    out.push_str(&format!(" {name}=\"{value}\""));
                }
                out.push('>');
                out
            }
        }
    }
}

/// Pre-order iterator over the descendants of a node.
#[derive(Debug)]
pub struct Descendants<'a> {
    document: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let next = self.stack.pop()?;
        self.stack
            .extend(self.document.children(next).iter().rev().copied());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(doc: &Document, tag: &str) -> NodeId {
        doc.descendants(doc.root())
            .find(|n| doc.local_name(*n) == Some(tag))
            .unwrap()
    }

    #[test]
    fn test_names_are_lowercased() {
        let doc = Document::parse(r#"<DIV Class="Box"><SPAN>x</SPAN></DIV>"#);
        let div = find(&doc, "div");
        assert_eq!(doc.local_name(div), Some("div"));
        assert_eq!(doc.attribute(div, "class"), Some("Box"));
        assert_eq!(doc.attribute(div, "CLASS"), Some("Box"));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let doc = Document::parse("<ul><li>a</li><li>b</li></ul><p>c</p>");
        let tags: Vec<&str> = doc
            .descendants(doc.root())
            .filter_map(|n| doc.local_name(n))
            .collect();
        assert_eq!(tags, vec!["html", "head", "body", "ul", "li", "li", "p"]);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let doc = Document::parse("<form><fieldset><input name=a></fieldset></form>");
        let input = find(&doc, "input");
        let tags: Vec<&str> = doc
            .ancestors(input)
            .filter_map(|n| doc.local_name(n))
            .collect();
        assert_eq!(tags, vec!["fieldset", "form", "body", "html"]);
    }

    #[test]
    fn test_set_and_remove_attribute() {
        let mut doc = Document::parse("<input name=q>");
        let input = find(&doc, "input");
        doc.set_attribute(input, "Value", "rust");
        assert_eq!(doc.attribute(input, "value"), Some("rust"));
        doc.set_attribute(input, "value", "go");
        assert_eq!(doc.attributes(input).len(), 2);
        doc.remove_attribute(input, "VALUE");
        assert!(!doc.has_attribute(input, "value"));
    }

    #[test]
    fn test_set_text_replaces_children() {
        let mut doc = Document::parse("<textarea name=t>old <b>text</b></textarea>");
        let textarea = find(&doc, "textarea");
        doc.set_text(textarea, "new");
        assert_eq!(doc.raw_text(textarea), "new");
        assert_eq!(doc.children(textarea).len(), 1);
    }

    #[test]
    fn test_own_text_excludes_children() {
        let doc = Document::parse("<li>  Home\n <a>link</a> page </li>");
        let li = find(&doc, "li");
        assert_eq!(doc.own_text(li), "Home page");
        assert_eq!(doc.inner_text(li), "Home link page");
    }
}
