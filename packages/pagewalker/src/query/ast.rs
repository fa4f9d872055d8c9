//! Structural query syntax tree.
//!
//! The language is a narrow XPath-like subset:
//!
//! ```text
//! query     := axis '::' nametest predicate*
//! axis      := 'descendant' | 'ancestor'
//! nametest  := NAME | '*'
//! predicate := '[' or-expr ']'
//! or-expr   := and-expr ('or' and-expr)*
//! and-expr  := primary ('and' primary)*
//! primary   := '(' or-expr ')' | operand ('=' LITERAL)?
//! operand   := '@' NAME | 'text()' | 'local-name()' | 'lower-case(' operand ')'
//! ```
//!
//! Literals are single-quoted; a quote inside a literal is doubled.

use std::fmt;

/// Traversal direction from the context node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// The context node and every node below it.
    Descendant,
    /// Every node above the context node, nearest first.
    Ancestor,
}

impl Axis {
    /// Axis keyword.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Descendant => "descendant",
            Self::Ancestor => "ancestor",
        }
    }
}

/// Element name test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `*`
    Any,
    /// Exact local name.
    Name(String),
}

/// Value read from a candidate node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// `@name`
    Attribute(String),
    /// `text()`: whitespace-normalized own text.
    Text,
    /// `local-name()`
    LocalName,
    /// `lower-case(operand)`
    LowerCase(Box<Operand>),
}

/// Predicate expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Or(Vec<Expr>),
    And(Vec<Expr>),
    /// `operand = 'literal'`
    Equals(Operand, String),
    /// Bare operand: the attribute exists, or the value is non-empty.
    Exists(Operand),
}

/// A complete structural query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(name) => write!(f, "@{name}"),
            Self::Text => f.write_str("text()"),
            Self::LocalName => f.write_str("local-name()"),
            Self::LowerCase(inner) => write!(f, "lower-case({inner})"),
        }
    }
}

impl Expr {
    fn fmt_nested(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Or(items) | Self::And(items) if items.len() > 1 => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (items, separator) = match self {
            Self::Equals(operand, literal) => return write!(f, "{operand}={}", quote(literal)),
            Self::Exists(operand) => return write!(f, "{operand}"),
            Self::Or(items) => (items, " or "),
            Self::And(items) => (items, " and "),
        };
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                f.write_str(separator)?;
            }
            item.fmt_nested(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::", self.axis.as_str())?;
        match &self.test {
            NodeTest::Any => f.write_str("*")?,
            NodeTest::Name(name) => f.write_str(name)?,
        }
        for predicate in &self.predicates {
            write!(f, "[{predicate}]")?;
        }
        Ok(())
    }
}

/// Quote a literal, doubling embedded single quotes.
///
/// # Examples
/// ```
/// use pagewalker::query::quote;
///
/// assert_eq!(quote("plain"), "'plain'");
/// assert_eq!(quote("it's"), "'it''s'");
/// ```
#[must_use]
pub fn quote(literal: &str) -> String {
    format!("'{}'", literal.replace('\'', "''"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_nested_precedence() {
        let query = Query {
            axis: Axis::Descendant,
            test: NodeTest::Any,
            predicates: vec![Expr::Or(vec![
                Expr::And(vec![
                    Expr::Equals(Operand::LocalName, "input".to_string()),
                    Expr::Equals(
                        Operand::LowerCase(Box::new(Operand::Attribute("type".to_string()))),
                        "checkbox".to_string(),
                    ),
                ]),
                Expr::Equals(Operand::LocalName, "select".to_string()),
            ])],
        };
        assert_eq!(
            query.to_string(),
            "descendant::*[(local-name()='input' and lower-case(@type)='checkbox') or local-name()='select']"
        );
    }

    #[test]
    fn test_display_single_step() {
        let query = Query {
            axis: Axis::Ancestor,
            test: NodeTest::Name("form".to_string()),
            predicates: vec![Expr::Exists(Operand::Attribute("action".to_string()))],
        };
        assert_eq!(query.to_string(), "ancestor::form[@action]");
    }
}
