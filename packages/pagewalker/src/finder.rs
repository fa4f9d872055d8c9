//! Element lookup.
//!
//! An [`ElementFinder`] combines a wrapper type's descriptors with a search
//! criterion into a structural query, runs it from a scope node, and hands
//! every match to the element factory.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::elements::{create, Wrapper};
use crate::error::{BrowserError, Result};
use crate::html::NodeId;
use crate::navigation::Page;
use crate::query::{evaluate, parse_query, Axis, Case, QueryBuilder};
use crate::registry::{ElementGroup, ElementKind, ElementType};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Criterion {
    Attribute { name: String, value: String },
    Text(String),
    TagName(String),
}

/// A search criterion.
///
/// # Examples
/// ```
/// use pagewalker::finder::By;
///
/// assert_eq!(By::name("user").to_string(), "name='user'");
/// assert_eq!(By::text("Log in").ignore_case().to_string(), "text='Log in' (ignoring case)");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct By {
    criterion: Criterion,
    case: Case,
}

impl By {
    fn new(criterion: Criterion) -> Self {
        Self {
            criterion,
            case: Case::Sensitive,
        }
    }

    /// `@name = value`.
    #[must_use]
    pub fn attribute(name: &str, value: &str) -> Self {
        Self::new(Criterion::Attribute {
            name: name.to_string(),
            value: value.to_string(),
        })
    }

    #[must_use]
    pub fn name(value: &str) -> Self {
        Self::attribute("name", value)
    }

    #[must_use]
    pub fn id(value: &str) -> Self {
        Self::attribute("id", value)
    }

    #[must_use]
    pub fn value(value: &str) -> Self {
        Self::attribute("value", value)
    }

    /// Own text, whitespace-normalized.
    #[must_use]
    pub fn text(value: &str) -> Self {
        Self::new(Criterion::Text(value.to_string()))
    }

    /// Local tag name, always compared case-insensitively. Bypasses the
    /// wrapper type's descriptors.
    #[must_use]
    pub fn tag_name(name: &str) -> Self {
        Self {
            criterion: Criterion::TagName(name.to_string()),
            case: Case::Insensitive,
        }
    }

    /// Fold case on both sides of the comparison.
    #[must_use]
    pub fn ignore_case(mut self) -> Self {
        self.case = Case::Insensitive;
        self
    }

    fn is_tag_name(&self) -> bool {
        matches!(self.criterion, Criterion::TagName(_))
    }

    fn apply(&self, builder: QueryBuilder) -> Result<QueryBuilder> {
        match &self.criterion {
            Criterion::Attribute { name, value } => builder.attribute(name, value, self.case),
            Criterion::Text(value) => Ok(builder.text(value, self.case)),
            Criterion::TagName(name) => builder.tag_name(name),
        }
    }
}

impl fmt::Display for By {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.criterion {
            Criterion::Attribute { name, value } => write!(f, "{name}='{value}'")?,
            Criterion::Text(value) => write!(f, "text='{value}'")?,
            Criterion::TagName(name) => return write!(f, "tag name '{name}'"),
        }
        if self.case == Case::Insensitive {
            f.write_str(" (ignoring case)")?;
        }
        Ok(())
    }
}

/// Runs element lookups on one axis from a scope node.
///
/// `all*` methods return matches lazily; singular methods require exactly
/// one match and fail with [`BrowserError::ElementNotFound`] or
/// [`BrowserError::MultipleElements`] otherwise.
///
/// # Examples
/// ```
/// use pagewalker::elements::{CheckBox, TextInput};
/// use pagewalker::Page;
///
/// let page = Page::parse(
///     "http://localhost/",
///     r#"<form><input name="user"><input type="checkbox" name="remember"></form>"#,
/// )
/// .unwrap();
///
/// let user: TextInput = page.find().by_name("user").unwrap();
/// assert_eq!(user.attribute("name").as_deref(), Some("user"));
///
/// // The checkbox is an <input> too, but it is never returned as a text input.
/// assert_eq!(page.find().all::<TextInput>().unwrap().count(), 1);
/// assert!(page.find().by_name::<CheckBox>("remember").is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ElementFinder {
    page: Page,
    scope: NodeId,
    axis: Axis,
}

impl ElementFinder {
    pub(crate) fn new(page: Page, scope: NodeId, axis: Axis) -> Self {
        Self { page, scope, axis }
    }

    #[must_use]
    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Run a query string from the scope node.
    pub fn execute(&self, query: &str) -> Result<Vec<NodeId>> {
        let parsed = parse_query(query)?;
        let nodes = evaluate(&self.page.document(), self.scope, &parsed);
        tracing::debug!(query, matches = nodes.len(), "Executed query");
        Ok(nodes)
    }

    /// Every element of type `W`.
    pub fn all<W: Wrapper>(&self) -> Result<Elements<W>> {
        self.search(None)
    }

    /// Every element of type `W` matching `by`.
    pub fn all_by<W: Wrapper>(&self, by: &By) -> Result<Elements<W>> {
        self.search(Some(by))
    }

    /// The only element of type `W`.
    pub fn single<W: Wrapper>(&self) -> Result<W> {
        exactly_one(self.all()?, W::TYPE, "any".to_string())
    }

    /// The only element of type `W` matching `by`.
    pub fn by<W: Wrapper>(&self, by: &By) -> Result<W> {
        exactly_one(self.all_by(by)?, W::TYPE, by.to_string())
    }

    pub fn all_by_attribute<W: Wrapper>(&self, name: &str, value: &str) -> Result<Elements<W>> {
        self.all_by(&By::attribute(name, value))
    }

    pub fn all_by_name<W: Wrapper>(&self, name: &str) -> Result<Elements<W>> {
        self.all_by(&By::name(name))
    }

    pub fn all_by_id<W: Wrapper>(&self, id: &str) -> Result<Elements<W>> {
        self.all_by(&By::id(id))
    }

    pub fn all_by_value<W: Wrapper>(&self, value: &str) -> Result<Elements<W>> {
        self.all_by(&By::value(value))
    }

    pub fn all_by_text<W: Wrapper>(&self, text: &str) -> Result<Elements<W>> {
        self.all_by(&By::text(text))
    }

    pub fn all_by_tag_name<W: Wrapper>(&self, tag_name: &str) -> Result<Elements<W>> {
        self.all_by(&By::tag_name(tag_name))
    }

    pub fn by_attribute<W: Wrapper>(&self, name: &str, value: &str) -> Result<W> {
        self.by(&By::attribute(name, value))
    }

    pub fn by_name<W: Wrapper>(&self, name: &str) -> Result<W> {
        self.by(&By::name(name))
    }

    pub fn by_id<W: Wrapper>(&self, id: &str) -> Result<W> {
        self.by(&By::id(id))
    }

    pub fn by_value<W: Wrapper>(&self, value: &str) -> Result<W> {
        self.by(&By::value(value))
    }

    pub fn by_text<W: Wrapper>(&self, text: &str) -> Result<W> {
        self.by(&By::text(text))
    }

    pub fn by_tag_name<W: Wrapper>(&self, tag_name: &str) -> Result<W> {
        self.by(&By::tag_name(tag_name))
    }

    /// Every element of type `W` accepted by `predicate`.
    ///
    /// The predicate runs in memory on the wrapped candidates.
    pub fn all_by_predicate<W, F>(&self, predicate: F) -> Result<impl Iterator<Item = Result<W>>>
    where
        W: Wrapper,
        F: Fn(&W) -> bool,
    {
        Ok(self
            .all::<W>()?
            .filter(move |candidate| candidate.as_ref().map_or(true, &predicate)))
    }

    /// The only element of type `W` accepted by `predicate`.
    pub fn by_predicate<W, F>(&self, predicate: F) -> Result<W>
    where
        W: Wrapper,
        F: Fn(&W) -> bool,
    {
        exactly_one(self.all_by_predicate(predicate)?, W::TYPE, "predicate".to_string())
    }

    fn search<W: Wrapper>(&self, by: Option<&By>) -> Result<Elements<W>> {
        let builder = match by {
            Some(by) if by.is_tag_name() => QueryBuilder::any(),
            _ => QueryBuilder::for_type(self.page.registry(), W::TYPE)?,
        };
        let builder = match by {
            Some(by) => by.apply(builder)?,
            None => builder,
        };
        let query = builder.with_axis(self.axis).to_string();
        let nodes = self.execute(&query)?;
        Ok(Elements::new(self.page.clone(), nodes))
    }
}

fn exactly_one<W>(
    candidates: impl Iterator<Item = Result<W>>,
    target: ElementType,
    criterion: String,
) -> Result<W> {
    let mut found = candidates.collect::<Result<Vec<W>>>()?;
    match found.len() {
        0 => Err(BrowserError::ElementNotFound { target, criterion }),
        1 => found.pop().ok_or(BrowserError::ElementNotFound { target, criterion }),
        count => Err(BrowserError::MultipleElements {
            target,
            criterion,
            count,
        }),
    }
}

/// Lazily wrapped query matches.
///
/// Nodes whose resolved kind is not assignable to `W` are skipped, so a bare
/// `<input>` descriptor never yields a checkbox as a text input.
pub struct Elements<W> {
    page: Page,
    nodes: std::vec::IntoIter<NodeId>,
    accepted: Option<Arc<[ElementKind]>>,
    marker: PhantomData<fn() -> W>,
}

impl<W: Wrapper> Elements<W> {
    fn new(page: Page, nodes: Vec<NodeId>) -> Self {
        let accepted = match W::TYPE {
            ElementType::Kind(ElementKind::Any) | ElementType::Group(ElementGroup::Element) => None,
            target => Some(page.registry().assignable_kinds(target)),
        };
        Self {
            page,
            nodes: nodes.into_iter(),
            accepted,
            marker: PhantomData,
        }
    }
}

fn is_accepted(page: &Page, accepted: Option<&[ElementKind]>, node: NodeId) -> Result<bool> {
    let Some(accepted) = accepted else {
        return Ok(true);
    };
    let document = page.document();
    let kind = page.registry().resolver().resolve(
        &document,
        node,
        ElementType::Group(ElementGroup::Element),
    )?;
    Ok(accepted.contains(&kind))
}

impl<W: Wrapper> Iterator for Elements<W> {
    type Item = Result<W>;

    fn next(&mut self) -> Option<Self::Item> {
        let Self {
            page,
            nodes,
            accepted,
            ..
        } = self;
        for node in nodes.by_ref() {
            match is_accepted(page, accepted.as_deref(), node) {
                Ok(true) => return Some(create(page.element(node))),
                Ok(false) => continue,
                Err(err) => return Some(Err(err)),
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.nodes.len()))
    }
}

impl<W> fmt::Debug for Elements<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Elements")
            .field("remaining", &self.nodes.len())
            .finish_non_exhaustive()
    }
}
