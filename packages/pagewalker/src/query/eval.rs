//! Query evaluation against a [`Document`].

use std::borrow::Cow;

use super::ast::{Axis, Expr, NodeTest, Operand, Query};
use crate::html::{Document, NodeId};

/// Evaluate a parsed query from a context node.
///
/// Descendant results come back in document order, ancestor results nearest
/// first. Only element nodes are ever returned.
///
/// # Examples
/// ```
/// use pagewalker::html::Document;
/// use pagewalker::query::{evaluate, parse_query};
///
/// let doc = Document::parse(r#"<p>a</p><P class="x">b</P>"#);
/// let query = parse_query("descendant::p[@class]").unwrap();
/// assert_eq!(evaluate(&doc, doc.root(), &query).len(), 1);
/// ```
#[must_use]
pub fn evaluate(document: &Document, context: NodeId, query: &Query) -> Vec<NodeId> {
    let matches = |node: &NodeId| {
        document.is_element(*node)
            && test_name(document, *node, &query.test)
            && query
                .predicates
                .iter()
                .all(|predicate| test_expr(document, *node, predicate))
    };

    match query.axis {
        Axis::Descendant => std::iter::once(context)
            .chain(document.descendants(context))
            .filter(matches)
            .collect(),
        Axis::Ancestor => document.ancestors(context).filter(matches).collect(),
    }
}

fn test_name(document: &Document, node: NodeId, test: &NodeTest) -> bool {
    match test {
        NodeTest::Any => true,
        NodeTest::Name(name) => document.local_name(node) == Some(name.as_str()),
    }
}

fn test_expr(document: &Document, node: NodeId, expr: &Expr) -> bool {
    match expr {
        Expr::Or(items) => items.iter().any(|item| test_expr(document, node, item)),
        Expr::And(items) => items.iter().all(|item| test_expr(document, node, item)),
        Expr::Equals(operand, literal) => {
            value(document, node, operand).is_some_and(|actual| actual == *literal)
        }
        Expr::Exists(operand) => match operand {
            Operand::Attribute(name) => document.has_attribute(node, name),
            other => value(document, node, other).is_some_and(|actual| !actual.is_empty()),
        },
    }
}

fn value<'a>(document: &'a Document, node: NodeId, operand: &Operand) -> Option<Cow<'a, str>> {
    match operand {
        Operand::Attribute(name) => document.attribute(node, name).map(Cow::Borrowed),
        Operand::Text => Some(Cow::Owned(document.own_text(node))),
        Operand::LocalName => document.local_name(node).map(Cow::Borrowed),
        Operand::LowerCase(inner) => {
            value(document, node, inner).map(|value| Cow::Owned(value.to_lowercase()))
        }
    }
}
