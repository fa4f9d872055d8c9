//! Element type registry mapping kinds to tag descriptors.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock, OnceLock};

use super::config::create_standard_registry;
use super::descriptor::TagDescriptor;
use super::resolver::TypeResolver;
use super::types::{ElementGroup, ElementKind, ElementType};
use crate::error::{BrowserError, Result};

/// Shared registry with the standard HTML element kinds.
static STANDARD_REGISTRY: LazyLock<Arc<TypeRegistry>> =
    LazyLock::new(|| Arc::new(create_standard_registry()));

/// Declared metadata for one concrete kind.
#[derive(Debug, Clone)]
pub struct Registration {
    kind: ElementKind,
    descriptors: Vec<TagDescriptor>,
    groups: Vec<ElementGroup>,
}

impl Registration {
    /// Start a registration for a kind.
    #[must_use]
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            descriptors: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Add a tag-only descriptor.
    #[must_use]
    pub fn with_tag(mut self, tag_name: &str) -> Self {
        self.descriptors.push(TagDescriptor::tag(tag_name));
        self
    }

    /// Add a descriptor with an attribute filter.
    #[must_use]
    pub fn with_tag_attribute(mut self, tag_name: &str, name: &str, value: &str) -> Self {
        self.descriptors
            .push(TagDescriptor::with_attribute(tag_name, name, value));
        self
    }

    /// Add several descriptors sharing a tag and attribute name.
    #[must_use]
    pub fn with_tag_attributes<'a>(
        mut self,
        tag_name: &str,
        name: &str,
        values: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        for value in values {
            self.descriptors
                .push(TagDescriptor::with_attribute(tag_name, name, value));
        }
        self
    }

    /// Add an arbitrary descriptor.
    #[must_use]
    pub fn with_descriptor(mut self, descriptor: TagDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Declare membership of an abstract group.
    #[must_use]
    pub fn with_group(mut self, group: ElementGroup) -> Self {
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
        self
    }

    /// The registered kind.
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.kind
    }

    /// Declared descriptors.
    #[must_use]
    pub fn descriptors(&self) -> &[TagDescriptor] {
        &self.descriptors
    }

    fn is_assignable_to(&self, target: ElementType) -> bool {
        match target {
            ElementType::Kind(kind) => self.kind == kind,
            ElementType::Group(ElementGroup::Element) => true,
            ElementType::Group(group) => self.groups.contains(&group),
        }
    }
}

/// Per-type memo slots, created up front so reads never need a lock.
struct Memo {
    descriptors: HashMap<ElementType, OnceLock<Arc<[TagDescriptor]>>>,
    assignable: HashMap<ElementType, OnceLock<Arc<[ElementKind]>>>,
}

impl Memo {
    fn new() -> Self {
        let types = ElementType::all();
        Self {
            descriptors: types.iter().map(|ty| (*ty, OnceLock::new())).collect(),
            assignable: types.iter().map(|ty| (*ty, OnceLock::new())).collect(),
        }
    }
}

/// Registry mapping element kinds to their tag descriptors.
///
/// Descriptor sets and assignable-kind sets are computed on first use and
/// memoized per [`ElementType`]. Each slot is a [`OnceLock`], so concurrent
/// first lookups for the same type compute it once and every later read
/// returns the same `Arc`.
pub struct TypeRegistry {
    registrations: Vec<Registration>,
    memo: Memo,
}

impl TypeRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registrations: Vec::new(),
            memo: Memo::new(),
        }
    }

    /// The shared registry with the standard HTML element kinds.
    #[must_use]
    pub fn standard() -> Arc<TypeRegistry> {
        Arc::clone(&STANDARD_REGISTRY)
    }

    /// Register a kind, replacing any earlier registration for it.
    pub fn register(&mut self, registration: Registration) {
        match self
            .registrations
            .iter_mut()
            .find(|existing| existing.kind == registration.kind)
        {
            Some(existing) => *existing = registration,
            None => self.registrations.push(registration),
        }
        self.memo = Memo::new();
    }

    /// Whether a kind has been registered.
    #[must_use]
    pub fn is_registered(&self, kind: ElementKind) -> bool {
        self.registrations.iter().any(|r| r.kind == kind)
    }

    /// Registered kinds assignable to `target`, in registration order.
    #[must_use]
    pub fn assignable_kinds(&self, target: ElementType) -> Arc<[ElementKind]> {
        let build = || -> Arc<[ElementKind]> {
            self.registrations
                .iter()
                .filter(|r| r.is_assignable_to(target))
                .map(|r| r.kind)
                .collect()
        };
        match self.memo.assignable.get(&target) {
            Some(slot) => Arc::clone(slot.get_or_init(build)),
            None => build(),
        }
    }

    /// Descriptors declared by one kind.
    #[must_use]
    pub fn declared_descriptors(&self, kind: ElementKind) -> &[TagDescriptor] {
        self.registrations
            .iter()
            .find(|r| r.kind == kind)
            .map(Registration::descriptors)
            .unwrap_or(&[])
    }

    /// De-duplicated descriptors of every kind assignable to `target`.
    ///
    /// # Errors
    /// [`BrowserError::NoDescriptors`] if the set is empty, which means a kind
    /// was registered without tags or never registered at all.
    pub fn descriptors(&self, target: ElementType) -> Result<Arc<[TagDescriptor]>> {
        let build = || -> Arc<[TagDescriptor]> {
            tracing::debug!(target_type = %target, "Collecting tag descriptors");
            let mut collected: Vec<TagDescriptor> = Vec::new();
            for registration in self.registrations.iter().filter(|r| r.is_assignable_to(target)) {
                for descriptor in &registration.descriptors {
                    if !collected.contains(descriptor) {
                        collected.push(descriptor.clone());
                    }
                }
            }
            collected.into()
        };

        let descriptors = match self.memo.descriptors.get(&target) {
            Some(slot) => Arc::clone(slot.get_or_init(build)),
            None => build(),
        };

        if descriptors.is_empty() {
            return Err(BrowserError::NoDescriptors(target));
        }
        Ok(descriptors)
    }

    /// Resolver over this registry.
    #[must_use]
    pub fn resolver(&self) -> TypeResolver<'_> {
        TypeResolver::new(self)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("registrations", &self.registrations)
            .finish_non_exhaustive()
    }
}
