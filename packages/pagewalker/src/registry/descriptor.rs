//! Tag descriptors: which document nodes a wrapper kind may represent.

use std::fmt;

use crate::html::{Document, NodeId};

/// Tag name that matches any element.
pub const WILDCARD_TAG: &str = "*";

/// A `(tag name, optional attribute filter)` rule.
///
/// Tag and attribute names are stored lower-cased and trimmed; attribute
/// values are trimmed and lower-cased too, since the attributes used as
/// filters (`type` and friends) are case-insensitive in HTML.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TagDescriptor {
    tag_name: String,
    attribute: Option<(String, String)>,
}

impl TagDescriptor {
    /// Descriptor matching a tag regardless of attributes.
    #[must_use]
    pub fn tag(tag_name: &str) -> Self {
        Self {
            tag_name: normalize(tag_name),
            attribute: None,
        }
    }

    /// Descriptor matching a tag that carries `name="value"`.
    #[must_use]
    pub fn with_attribute(tag_name: &str, name: &str, value: &str) -> Self {
        Self {
            tag_name: normalize(tag_name),
            attribute: Some((normalize(name), normalize(value))),
        }
    }

    /// Descriptor matching every element.
    #[must_use]
    pub fn wildcard() -> Self {
        Self::tag(WILDCARD_TAG)
    }

    /// Lower-cased tag name, or `*`.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        &self.tag_name
    }

    /// Attribute filter as `(name, value)`.
    #[must_use]
    pub fn attribute(&self) -> Option<(&str, &str)> {
        self.attribute
            .as_ref()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Whether this is the `*` descriptor.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.tag_name == WILDCARD_TAG
    }

    /// Whether an attribute filter is present.
    #[must_use]
    pub fn has_attribute_filter(&self) -> bool {
        self.attribute.is_some()
    }

    /// Check whether a node satisfies this descriptor.
    ///
    /// # Examples
    /// ```
    /// use pagewalker::html::{find_by_tag, Document};
    /// use pagewalker::registry::TagDescriptor;
    ///
    /// let doc = Document::parse(r#"<input type="CheckBox">"#);
    /// let input = find_by_tag(&doc, doc.root(), "input").unwrap();
    ///
    /// assert!(TagDescriptor::with_attribute("input", "type", "checkbox").matches(&doc, input));
    /// assert!(TagDescriptor::tag("input").matches(&doc, input));
    /// assert!(!TagDescriptor::with_attribute("input", "type", "radio").matches(&doc, input));
    /// ```
    #[must_use]
    pub fn matches(&self, document: &Document, node: NodeId) -> bool {
        let Some(local_name) = document.local_name(node) else {
            return false;
        };
        if self.is_wildcard() {
            return true;
        }
        if local_name != self.tag_name {
            return false;
        }
        match &self.attribute {
            None => true,
            Some((name, value)) => document
                .attribute(node, name)
                .is_some_and(|actual| actual.trim().eq_ignore_ascii_case(value)),
        }
    }
}

impl fmt::Display for TagDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.attribute {
            Some((name, value)) => write!(f, "{}[@{name}='{value}']", self.tag_name),
            None => f.write_str(&self.tag_name),
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equivalence_is_normalized() {
        assert_eq!(
            TagDescriptor::with_attribute("INPUT", " Type ", "CheckBox "),
            TagDescriptor::with_attribute("input", "type", "checkbox")
        );
        assert_ne!(
            TagDescriptor::with_attribute("input", "type", "checkbox"),
            TagDescriptor::tag("input")
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(TagDescriptor::tag("a").to_string(), "a");
        assert_eq!(
            TagDescriptor::with_attribute("input", "type", "file").to_string(),
            "input[@type='file']"
        );
        assert_eq!(TagDescriptor::wildcard().to_string(), "*");
    }

    #[test]
    fn test_wildcard_matches_elements_only() {
        let doc = Document::parse("<p>text</p>");
        let p = crate::html::find_by_tag(&doc, doc.root(), "p").unwrap();
        assert!(TagDescriptor::wildcard().matches(&doc, p));
        assert!(!TagDescriptor::wildcard().matches(&doc, doc.root()));
    }
}
