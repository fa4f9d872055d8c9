//! Element wrappers.
//!
//! [`Element`] is the common contract: a node of a loaded [`Page`]. Concrete
//! wrappers ([`TextInput`], [`Select`], [`Anchor`], ...) are thin typed views
//! over an element, built by the factory in [`create`] which validates the
//! node against the wrapper kind's descriptors, or resolves the concrete kind
//! when an abstract group is requested.

use std::fmt;

use crate::error::{BrowserError, Result};
use crate::finder::ElementFinder;
use crate::html::NodeId;
use crate::navigation::Page;
use crate::query::Axis;
use crate::registry::{ElementGroup, ElementKind, ElementType};

/// Declares a concrete wrapper type for one [`ElementKind`].
macro_rules! element_wrapper {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub(crate) $crate::elements::Element);

        impl $crate::elements::Wrapper for $name {
            const TYPE: $crate::registry::ElementType =
                $crate::registry::ElementType::Kind($crate::registry::ElementKind::$kind);

            fn from_element(
                element: $crate::elements::Element,
                kind: $crate::registry::ElementKind,
            ) -> Option<Self> {
                (kind == $crate::registry::ElementKind::$kind).then_some(Self(element))
            }
        }

        impl std::ops::Deref for $name {
            type Target = $crate::elements::Element;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl From<$name> for $crate::elements::TypedElement {
            fn from(wrapper: $name) -> Self {
                $crate::elements::TypedElement::$kind(wrapper)
            }
        }
    };
}

mod clickable;
mod controls;
mod form;

pub use clickable::{Anchor, Button, Clickable};
pub use controls::{
    CheckBox, FileInput, FormControl, FormField, HiddenInput, OptionItem, RadioButton, Select,
    TextArea, TextInput,
};
pub use form::Form;

/// A typed view that can be built from an [`Element`].
pub trait Wrapper: Sized {
    /// Kind or group this wrapper stands for.
    const TYPE: ElementType;

    /// Wrap an element whose concrete kind is already known.
    ///
    /// Returns `None` if this wrapper cannot represent `kind`.
    fn from_element(element: Element, kind: ElementKind) -> Option<Self>;
}

/// Build a wrapper for an element.
///
/// A concrete target validates the node against its own descriptors; an
/// abstract target resolves the concrete kind first.
///
/// # Errors
/// - [`BrowserError::InvalidElement`] if the node cannot be represented as `W`.
/// - [`BrowserError::AmbiguousType`] if several kinds claim the node.
pub fn create<W: Wrapper>(element: Element) -> Result<W> {
    let registry = element.page.registry();
    let kind = {
        let document = element.page.document();
        let resolver = registry.resolver();
        match W::TYPE {
            ElementType::Kind(kind) => {
                resolver.validate(&document, element.node, kind)?;
                kind
            }
            ElementType::Group(_) => resolver.resolve(&document, element.node, W::TYPE)?,
        }
    };

    match W::from_element(element.clone(), kind) {
        Some(wrapper) => Ok(wrapper),
        None => Err(BrowserError::InvalidElement {
            element: element.summary(),
            target: W::TYPE,
            descriptors: registry.descriptors(W::TYPE)?.to_vec(),
        }),
    }
}

/// A node of a loaded page.
///
/// Holds the page alive; becomes stale when the page's document is replaced
/// by a new navigation (the old page stays readable).
#[derive(Clone)]
pub struct Element {
    page: Page,
    node: NodeId,
}

impl Element {
    pub(crate) fn new(page: Page, node: NodeId) -> Self {
        Self { page, node }
    }

    /// The page this element belongs to.
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    #[must_use]
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Lower-cased local tag name.
    #[must_use]
    pub fn tag_name(&self) -> String {
        self.page
            .document()
            .local_name(self.node)
            .unwrap_or_default()
            .to_string()
    }

    /// Attribute value, looked up case-insensitively.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.page
            .document()
            .attribute(self.node, name)
            .map(str::to_string)
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.page.document().has_attribute(self.node, name)
    }

    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    /// Whitespace-normalized text of the element and its descendants.
    #[must_use]
    pub fn text(&self) -> String {
        self.page.document().inner_text(self.node)
    }

    /// Whitespace-normalized text of the element's direct text children.
    #[must_use]
    pub fn own_text(&self) -> String {
        self.page.document().own_text(self.node)
    }

    /// Start tag rendering, e.g. `<input type="text" name="q">`.
    #[must_use]
    pub fn summary(&self) -> String {
        self.page.document().summary(self.node)
    }

    /// Concrete kind of this element.
    pub fn kind(&self) -> Result<ElementKind> {
        self.page.registry().resolver().resolve(
            &self.page.document(),
            self.node,
            ElementType::Group(ElementGroup::Element),
        )
    }

    /// Finder over the elements below this one.
    #[must_use]
    pub fn find(&self) -> ElementFinder {
        ElementFinder::new(self.page.clone(), self.node, Axis::Descendant)
    }

    /// Finder over the elements above this one, nearest first.
    #[must_use]
    pub fn find_ancestor(&self) -> ElementFinder {
        ElementFinder::new(self.page.clone(), self.node, Axis::Ancestor)
    }

    /// The form this element belongs to: the one named by its `form`
    /// attribute, otherwise the nearest enclosing form.
    pub fn form(&self) -> Result<Option<Form>> {
        if let Some(id) = self.attribute("form") {
            return self.page.find().all_by_id::<Form>(&id)?.next().transpose();
        }
        self.find_ancestor().all::<Form>()?.next().transpose()
    }

    /// Re-wrap this element as `W`.
    pub fn cast<W: Wrapper>(&self) -> Result<W> {
        create(self.clone())
    }

    /// Wrap this element as its resolved concrete kind.
    pub fn typed(&self) -> Result<TypedElement> {
        self.cast()
    }

    pub(crate) fn set_attribute(&self, name: &str, value: &str) {
        self.page.document_mut().set_attribute(self.node, name, value);
    }

    pub(crate) fn remove_attribute(&self, name: &str) {
        self.page.document_mut().remove_attribute(self.node, name);
    }
}

impl Wrapper for Element {
    const TYPE: ElementType = ElementType::Group(ElementGroup::Element);

    fn from_element(element: Element, _kind: ElementKind) -> Option<Self> {
        Some(element)
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node && self.page.same_page(&other.page)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("node", &self.node)
            .field("tag", &self.summary())
            .finish()
    }
}

element_wrapper! {
    /// Any element, including ones no other kind claims.
    AnyElement => Any
}

element_wrapper! {
    /// `<label>`.
    Label => Label
}

impl Label {
    /// The `for` attribute.
    #[must_use]
    pub fn for_id(&self) -> Option<String> {
        self.attribute("for")
    }

    /// The labelled control: the one named by `for`, else the first control
    /// inside the label.
    pub fn control(&self) -> Result<Option<FormField>> {
        match self.for_id() {
            Some(id) => self.page().find().all_by_id::<FormField>(&id)?.next().transpose(),
            None => self.find().all::<FormField>()?.next().transpose(),
        }
    }
}

/// An element wrapped as its resolved concrete kind.
#[derive(Debug, Clone)]
pub enum TypedElement {
    Any(AnyElement),
    Anchor(Anchor),
    Button(Button),
    CheckBox(CheckBox),
    FileInput(FileInput),
    Form(Form),
    HiddenInput(HiddenInput),
    Label(Label),
    OptionItem(OptionItem),
    RadioButton(RadioButton),
    Select(Select),
    TextArea(TextArea),
    TextInput(TextInput),
}

impl TypedElement {
    /// Wrap an element as `kind` without validating it.
    pub(crate) fn wrap(element: Element, kind: ElementKind) -> Self {
        match kind {
            ElementKind::Any => Self::Any(AnyElement(element)),
            ElementKind::Anchor => Self::Anchor(Anchor(element)),
            ElementKind::Button => Self::Button(Button(element)),
            ElementKind::CheckBox => Self::CheckBox(CheckBox(element)),
            ElementKind::FileInput => Self::FileInput(FileInput(element)),
            ElementKind::Form => Self::Form(Form(element)),
            ElementKind::HiddenInput => Self::HiddenInput(HiddenInput(element)),
            ElementKind::Label => Self::Label(Label(element)),
            ElementKind::OptionItem => Self::OptionItem(OptionItem(element)),
            ElementKind::RadioButton => Self::RadioButton(RadioButton(element)),
            ElementKind::Select => Self::Select(Select(element)),
            ElementKind::TextArea => Self::TextArea(TextArea(element)),
            ElementKind::TextInput => Self::TextInput(TextInput(element)),
        }
    }

    #[must_use]
    pub fn kind(&self) -> ElementKind {
        match self {
            Self::Any(_) => ElementKind::Any,
            Self::Anchor(_) => ElementKind::Anchor,
            Self::Button(_) => ElementKind::Button,
            Self::CheckBox(_) => ElementKind::CheckBox,
            Self::FileInput(_) => ElementKind::FileInput,
            Self::Form(_) => ElementKind::Form,
            Self::HiddenInput(_) => ElementKind::HiddenInput,
            Self::Label(_) => ElementKind::Label,
            Self::OptionItem(_) => ElementKind::OptionItem,
            Self::RadioButton(_) => ElementKind::RadioButton,
            Self::Select(_) => ElementKind::Select,
            Self::TextArea(_) => ElementKind::TextArea,
            Self::TextInput(_) => ElementKind::TextInput,
        }
    }

    /// The underlying element.
    #[must_use]
    pub fn element(&self) -> &Element {
        match self {
            Self::Any(e) => e,
            Self::Anchor(e) => e,
            Self::Button(e) => e,
            Self::CheckBox(e) => e,
            Self::FileInput(e) => e,
            Self::Form(e) => e,
            Self::HiddenInput(e) => e,
            Self::Label(e) => e,
            Self::OptionItem(e) => e,
            Self::RadioButton(e) => e,
            Self::Select(e) => e,
            Self::TextArea(e) => e,
            Self::TextInput(e) => e,
        }
    }

    /// The form control contract, for kinds that take part in submission.
    #[must_use]
    pub fn as_form_control(&self) -> Option<&dyn FormControl> {
        match self {
            Self::Button(e) => Some(e),
            Self::CheckBox(e) => Some(e),
            Self::FileInput(e) => Some(e),
            Self::HiddenInput(e) => Some(e),
            Self::RadioButton(e) => Some(e),
            Self::Select(e) => Some(e),
            Self::TextArea(e) => Some(e),
            Self::TextInput(e) => Some(e),
            Self::Any(_) | Self::Anchor(_) | Self::Form(_) | Self::Label(_) | Self::OptionItem(_) => None,
        }
    }

    /// Current value: a form control's value, or an option's value.
    #[must_use]
    pub fn value(&self) -> Option<String> {
        match self {
            Self::OptionItem(option) => Some(option.value()),
            other => other.as_form_control().and_then(|control| control.value()),
        }
    }
}

impl Wrapper for TypedElement {
    const TYPE: ElementType = ElementType::Group(ElementGroup::Element);

    fn from_element(element: Element, kind: ElementKind) -> Option<Self> {
        Some(Self::wrap(element, kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(markup: &str) -> Page {
        Page::parse("http://localhost/", markup).unwrap()
    }

    #[test]
    fn test_cast_validates_concrete_kind() {
        let page = page(r#"<div id="box"></div><input type="checkbox" id="agree">"#);
        let div: Element = page.find().by_id("box").unwrap();

        match div.cast::<CheckBox>() {
            Err(BrowserError::InvalidElement {
                element,
                target,
                descriptors,
            }) => {
                assert_eq!(element, r#"<div id="box">"#);
                assert_eq!(target, ElementType::Kind(ElementKind::CheckBox));
                assert_eq!(descriptors.len(), 1);
            }
            other => panic!("expected invalid element, got {other:?}"),
        }
        assert!(div.cast::<AnyElement>().is_ok());

        let agree: Element = page.find().by_id("agree").unwrap();
        assert!(agree.cast::<CheckBox>().is_ok());
    }

    #[test]
    fn test_typed_resolves_kind() {
        let page = page(r#"<input type="HIDDEN" name="token"><p id="x">x</p>"#);
        let token: Element = page.find().by_name("token").unwrap();
        assert_eq!(token.typed().unwrap().kind(), ElementKind::HiddenInput);
        let p: Element = page.find().by_id("x").unwrap();
        assert_eq!(p.typed().unwrap().kind(), ElementKind::Any);
        assert!(p.typed().unwrap().as_form_control().is_none());
    }

    #[test]
    fn test_group_cast_rejects_unclaimed_node() {
        let page = page(r#"<p id="x">x</p>"#);
        let p: Element = page.find().by_id("x").unwrap();
        assert!(matches!(
            p.cast::<Clickable>(),
            Err(BrowserError::InvalidElement { .. })
        ));
    }

    #[test]
    fn test_form_lookup() {
        let page = page(
            r#"<form id="f"><fieldset><input name="inner"></fieldset></form>
               <input name="outer" form="f"><input name="orphan">"#,
        );
        let inner: TextInput = page.find().by_name("inner").unwrap();
        let outer: TextInput = page.find().by_name("outer").unwrap();
        let orphan: TextInput = page.find().by_name("orphan").unwrap();

        let form = inner.form().unwrap().unwrap();
        assert_eq!(form.id().as_deref(), Some("f"));
        assert_eq!(outer.form().unwrap().unwrap().node(), form.node());
        assert!(orphan.form().unwrap().is_none());
    }

    #[test]
    fn test_label_control() {
        let page = page(
            r#"<label for="mail">Mail</label><input id="mail" type="email">
               <label>Agree <input type="checkbox" name="agree"></label>"#,
        );
        let mail: Label = page.find().by_text("Mail").unwrap();
        let control = mail.control().unwrap().unwrap();
        assert_eq!(control.kind(), ElementKind::TextInput);

        let agree: Label = page.find().by_text("Agree").unwrap();
        assert_eq!(agree.control().unwrap().unwrap().kind(), ElementKind::CheckBox);
    }

    #[test]
    fn test_element_equality() {
        let page = page(r#"<a id="a">x</a>"#);
        let first: Element = page.find().by_id("a").unwrap();
        let second: Element = page.find().by_tag_name("a").unwrap();
        assert_eq!(first, second);
    }
}
