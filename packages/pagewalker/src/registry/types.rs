//! Element kinds and the types queries can target.

use std::fmt;

/// Concrete element wrapper shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// Wildcard wrapper for elements no other kind claims.
    Any,
    /// `<a>`.
    Anchor,
    /// `<button>` and button-like inputs.
    Button,
    /// `<input type="checkbox">`.
    CheckBox,
    /// `<input type="file">`.
    FileInput,
    /// `<form>`.
    Form,
    /// `<input type="hidden">`.
    HiddenInput,
    /// `<label>`.
    Label,
    /// `<option>`.
    OptionItem,
    /// `<input type="radio">`.
    RadioButton,
    /// `<select>`.
    Select,
    /// `<textarea>`.
    TextArea,
    /// Text-like `<input>` elements, including the untyped `<input>`.
    TextInput,
}

impl ElementKind {
    /// Every kind, in registration order.
    pub const ALL: [ElementKind; 13] = [
        ElementKind::Any,
        ElementKind::Anchor,
        ElementKind::Button,
        ElementKind::CheckBox,
        ElementKind::FileInput,
        ElementKind::Form,
        ElementKind::HiddenInput,
        ElementKind::Label,
        ElementKind::OptionItem,
        ElementKind::RadioButton,
        ElementKind::Select,
        ElementKind::TextArea,
        ElementKind::TextInput,
    ];

    /// Name of the kind.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Any => "AnyElement",
            Self::Anchor => "Anchor",
            Self::Button => "Button",
            Self::CheckBox => "CheckBox",
            Self::FileInput => "FileInput",
            Self::Form => "Form",
            Self::HiddenInput => "HiddenInput",
            Self::Label => "Label",
            Self::OptionItem => "Option",
            Self::RadioButton => "RadioButton",
            Self::Select => "Select",
            Self::TextArea => "TextArea",
            Self::TextInput => "TextInput",
        }
    }
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract groups of kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementGroup {
    /// Every registered kind.
    Element,
    /// Controls that contribute to form submission.
    FormField,
    /// Elements that navigate when clicked.
    Clickable,
}

impl ElementGroup {
    /// Every group.
    pub const ALL: [ElementGroup; 3] = [
        ElementGroup::Element,
        ElementGroup::FormField,
        ElementGroup::Clickable,
    ];

    /// Name of the group.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Element => "Element",
            Self::FormField => "FormField",
            Self::Clickable => "Clickable",
        }
    }
}

/// What a lookup asks for: one concrete kind or an abstract group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Kind(ElementKind),
    Group(ElementGroup),
}

impl ElementType {
    /// Every type, concrete kinds first.
    #[must_use]
    pub fn all() -> Vec<ElementType> {
        ElementKind::ALL
            .into_iter()
            .map(ElementType::Kind)
            .chain(ElementGroup::ALL.into_iter().map(ElementType::Group))
            .collect()
    }

    /// Whether this type needs resolution to find a concrete kind.
    #[must_use]
    pub fn is_abstract(self) -> bool {
        matches!(self, Self::Group(_))
    }
}

impl From<ElementKind> for ElementType {
    fn from(kind: ElementKind) -> Self {
        Self::Kind(kind)
    }
}

impl From<ElementGroup> for ElementType {
    fn from(group: ElementGroup) -> Self {
        Self::Group(group)
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Kind(kind) => f.write_str(kind.as_str()),
            Self::Group(group) => f.write_str(group.as_str()),
        }
    }
}
