//! Query construction from descriptor sets and filter criteria.

use std::fmt;

use super::ast::{Axis, Expr, NodeTest, Operand, Query};
use crate::config::validate_name;
use crate::error::Result;
use crate::html::normalize_whitespace;
use crate::registry::{ElementType, TagDescriptor, TypeRegistry};

/// Whether a comparison folds case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Case {
    #[default]
    Sensitive,
    Insensitive,
}

/// Builds a [`Query`] for a wrapper type plus filters.
///
/// # Examples
/// ```
/// use pagewalker::query::{Case, QueryBuilder};
/// use pagewalker::registry::{ElementKind, ElementType, TypeRegistry};
///
/// let registry = TypeRegistry::standard();
/// let query = QueryBuilder::for_type(&registry, ElementType::Kind(ElementKind::CheckBox))
///     .unwrap()
///     .attribute("name", "Agree", Case::Insensitive)
///     .unwrap()
///     .build();
/// assert_eq!(
///     query.to_string(),
///     "descendant::input[lower-case(@type)='checkbox'][lower-case(@name)='agree']"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    axis: Axis,
    test: NodeTest,
    predicates: Vec<Expr>,
}

impl QueryBuilder {
    /// Query matching every element on the descendant axis.
    #[must_use]
    pub fn any() -> Self {
        Self {
            axis: Axis::Descendant,
            test: NodeTest::Any,
            predicates: Vec::new(),
        }
    }

    /// Query matching any of the given descriptors.
    ///
    /// A single descriptor renders as `tag` or `tag[lower-case(@attr)='value']`;
    /// several render as a union predicate over `local-name()`. A wildcard
    /// anywhere in the set, or an empty set, matches every element.
    #[must_use]
    pub fn for_descriptors(descriptors: &[TagDescriptor]) -> Self {
        let mut builder = Self::any();
        if descriptors.iter().any(TagDescriptor::is_wildcard) {
            return builder;
        }

        match descriptors {
            [] => {}
            [single] => {
                builder.test = NodeTest::Name(single.tag_name().to_string());
                if let Some(filter) = attribute_filter(single) {
                    builder.predicates.push(filter);
                }
            }
            several => {
                let alternatives = several
                    .iter()
                    .map(|descriptor| {
                        let tag = Expr::Equals(Operand::LocalName, descriptor.tag_name().to_string());
                        match attribute_filter(descriptor) {
                            Some(filter) => Expr::And(vec![tag, filter]),
                            None => tag,
                        }
                    })
                    .collect();
                builder.predicates.push(Expr::Or(alternatives));
            }
        }
        builder
    }

    /// Query matching the registered descriptors of a type.
    pub fn for_type(registry: &TypeRegistry, target: ElementType) -> Result<Self> {
        let descriptors = registry.descriptors(target)?;
        Ok(Self::for_descriptors(&descriptors))
    }

    /// Replace the traversal axis.
    #[must_use]
    pub fn with_axis(mut self, axis: Axis) -> Self {
        self.axis = axis;
        self
    }

    /// Require `@name = value`, optionally case-folded inside the query.
    pub fn attribute(mut self, name: &str, value: &str, case: Case) -> Result<Self> {
        validate_name(name)?;
        let operand = Operand::Attribute(name.to_ascii_lowercase());
        self.predicates.push(compare(operand, value, case));
        Ok(self)
    }

    /// Require the element's own text to equal `value` after whitespace
    /// normalization.
    #[must_use]
    pub fn text(mut self, value: &str, case: Case) -> Self {
        let value = normalize_whitespace(value);
        self.predicates.push(compare(Operand::Text, &value, case));
        self
    }

    /// Require a local tag name, ignoring case and namespace prefix.
    pub fn tag_name(mut self, name: &str) -> Result<Self> {
        validate_name(name)?;
        let local = name.rsplit(':').next().unwrap_or(name);
        self.predicates
            .push(compare(Operand::LocalName, local, Case::Insensitive));
        Ok(self)
    }

    /// Finish the query.
    #[must_use]
    pub fn build(self) -> Query {
        Query {
            axis: self.axis,
            test: self.test,
            predicates: self.predicates,
        }
    }
}

impl fmt::Display for QueryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.clone().build())
    }
}

fn compare(operand: Operand, value: &str, case: Case) -> Expr {
    match case {
        Case::Sensitive => Expr::Equals(operand, value.to_string()),
        Case::Insensitive => Expr::Equals(Operand::LowerCase(Box::new(operand)), value.to_lowercase()),
    }
}

fn attribute_filter(descriptor: &TagDescriptor) -> Option<Expr> {
    descriptor.attribute().map(|(name, value)| {
        compare(Operand::Attribute(name.to_string()), value, Case::Insensitive)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BrowserError;
    use crate::html::Document;
    use crate::query::evaluate;
    use crate::registry::{create_standard_registry, ElementGroup, ElementKind};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_single_descriptor() {
        let registry = create_standard_registry();
        let query = QueryBuilder::for_type(&registry, ElementKind::Anchor.into()).unwrap();
        assert_eq!(query.to_string(), "descendant::a");

        let query = QueryBuilder::for_type(&registry, ElementKind::RadioButton.into()).unwrap();
        assert_eq!(query.to_string(), "descendant::input[lower-case(@type)='radio']");
    }

    #[test]
    fn test_union_of_descriptors() {
        let query = QueryBuilder::for_descriptors(&[
            TagDescriptor::tag("button"),
            TagDescriptor::with_attribute("input", "type", "submit"),
        ]);
        assert_eq!(
            query.to_string(),
            "descendant::*[local-name()='button' or (local-name()='input' and lower-case(@type)='submit')]"
        );
    }

    #[test]
    fn test_wildcard_matches_everything() {
        let registry = create_standard_registry();
        let query =
            QueryBuilder::for_type(&registry, ElementType::Group(ElementGroup::Element)).unwrap();
        assert_eq!(query.to_string(), "descendant::*");
    }

    #[test]
    fn test_single_descriptor_query_is_precise() {
        let registry = create_standard_registry();
        let doc = Document::parse(
            r#"<input type="checkbox"><input type="CHECKBOX"><input type="radio"><div type="checkbox"></div>"#,
        );
        let query = QueryBuilder::for_type(&registry, ElementKind::CheckBox.into())
            .unwrap()
            .build();
        let found = evaluate(&doc, doc.root(), &query);
        assert_eq!(found.len(), 2);
        assert!(found.iter().all(|n| doc.local_name(*n) == Some("input")));
    }

    #[test]
    fn test_text_filter_normalizes() {
        let query = QueryBuilder::any().text("  Log\n in ", Case::Insensitive);
        assert_eq!(query.to_string(), "descendant::*[lower-case(text())='log in']");
    }

    #[test]
    fn test_tag_name_uses_local_name() {
        let query = QueryBuilder::any().tag_name("svg:RECT").unwrap();
        assert_eq!(query.to_string(), "descendant::*[lower-case(local-name())='rect']");
    }

    #[test]
    fn test_attribute_name_is_validated() {
        let result = QueryBuilder::any().attribute("x'] or ['", "y", Case::Sensitive);
        assert!(matches!(result, Err(BrowserError::InvalidQuery { .. })));
    }

    #[test]
    fn test_literal_quotes_survive_round_trip() {
        let query = QueryBuilder::any()
            .attribute("title", "it's", Case::Sensitive)
            .unwrap()
            .with_axis(Axis::Ancestor);
        let rendered = query.to_string();
        assert_eq!(rendered, "ancestor::*[@title='it''s']");
        assert_eq!(crate::query::parse_query(&rendered).unwrap(), query.build());
    }
}
