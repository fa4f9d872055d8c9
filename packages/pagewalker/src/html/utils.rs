//! Helpers for reading document trees.

use super::document::{Document, NodeId};

/// Collapse runs of whitespace into single spaces and trim.
///
/// # Examples
/// ```
/// use pagewalker::html::normalize_whitespace;
///
/// assert_eq!(normalize_whitespace("  Log\n\t in  "), "Log in");
/// ```
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Check if a node is an element with the given local name.
#[must_use]
pub fn has_tag(document: &Document, node: NodeId, tag: &str) -> bool {
    document
        .local_name(node)
        .is_some_and(|name| name.eq_ignore_ascii_case(tag))
}

/// Find the first descendant element with the given local name.
///
/// # Examples
/// ```
/// use pagewalker::html::{find_by_tag, Document};
///
/// let doc = Document::parse("<form><input name=q></form>");
/// assert!(find_by_tag(&doc, doc.root(), "input").is_some());
/// assert!(find_by_tag(&doc, doc.root(), "select").is_none());
/// ```
#[must_use]
pub fn find_by_tag(document: &Document, node: NodeId, tag: &str) -> Option<NodeId> {
    document
        .descendants(node)
        .find(|candidate| has_tag(document, *candidate, tag))
}

/// Text of the document's `<title>` element.
#[must_use]
pub fn title(document: &Document) -> Option<String> {
    find_by_tag(document, document.root(), "title").map(|node| document.inner_text(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title() {
        let doc = Document::parse("<html><head><title> Home\n page </title></head></html>");
        assert_eq!(title(&doc), Some("Home page".to_string()));
    }

    #[test]
    fn test_title_missing() {
        let doc = Document::parse("<p>no title</p>");
        assert_eq!(title(&doc), None);
    }

    #[test]
    fn test_has_tag_ignores_case() {
        let doc = Document::parse("<p>x</p>");
        let p = find_by_tag(&doc, doc.root(), "p").unwrap();
        assert!(has_tag(&doc, p, "P"));
        assert!(!has_tag(&doc, p, "div"));
    }
}
