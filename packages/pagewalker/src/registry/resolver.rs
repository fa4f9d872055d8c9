//! Resolution of document nodes to concrete element kinds.

use super::core::TypeRegistry;
use super::types::{ElementKind, ElementType};
use crate::error::{BrowserError, Result};
use crate::html::{Document, NodeId};

/// Picks the concrete kind a node should be wrapped as.
#[derive(Debug, Clone, Copy)]
pub struct TypeResolver<'a> {
    registry: &'a TypeRegistry,
}

impl<'a> TypeResolver<'a> {
    /// Create a resolver over a registry.
    #[must_use]
    pub fn new(registry: &'a TypeRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the concrete kind for `node` among kinds assignable to `target`.
    ///
    /// Descriptors with an attribute filter are tried before tag-only ones, so
    /// `<input type="checkbox">` resolves to the checkbox kind even though the
    /// text input kind also accepts a bare `<input>`. Wildcard descriptors never
    /// take part; a node nothing claims resolves to [`ElementKind::Any`].
    ///
    /// # Errors
    /// [`BrowserError::AmbiguousType`] when two or more kinds match in the same
    /// pass. That is a registration defect and is never guessed around.
    pub fn resolve(&self, document: &Document, node: NodeId, target: ElementType) -> Result<ElementKind> {
        let candidates = self.registry.assignable_kinds(target);

        for with_attribute in [true, false] {
            let matching: Vec<ElementKind> = candidates
                .iter()
                .copied()
                .filter(|kind| {
                    self.registry
                        .declared_descriptors(*kind)
                        .iter()
                        .filter(|d| !d.is_wildcard() && d.has_attribute_filter() == with_attribute)
                        .any(|d| d.matches(document, node))
                })
                .collect();

            match matching.len() {
                0 => continue,
                1 => {
                    let kind = matching[0];
                    tracing::trace!(node = %node, kind = %kind, "Resolved element kind");
                    return Ok(kind);
                }
                _ => {
                    return Err(BrowserError::AmbiguousType {
                        element: document.summary(node),
                        candidates: matching,
                    })
                }
            }
        }

        Ok(ElementKind::Any)
    }

    /// Check a node against the descriptors of one kind.
    ///
    /// Kinds declaring the wildcard descriptor accept every element.
    ///
    /// # Errors
    /// [`BrowserError::InvalidElement`] carrying the node and the kind's full
    /// descriptor list.
    pub fn validate(&self, document: &Document, node: NodeId, kind: ElementKind) -> Result<()> {
        let descriptors = self.registry.descriptors(ElementType::Kind(kind))?;
        if descriptors.iter().any(|d| d.matches(document, node)) {
            Ok(())
        } else {
            Err(BrowserError::InvalidElement {
                element: document.summary(node),
                target: ElementType::Kind(kind),
                descriptors: descriptors.to_vec(),
            })
        }
    }
}
