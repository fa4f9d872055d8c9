//! Registry configuration for standard HTML documents.

use super::core::{Registration, TypeRegistry};
use super::descriptor::TagDescriptor;
use super::types::{ElementGroup, ElementKind};

/// `type` values rendered as a single-line text field.
pub const TEXT_INPUT_TYPES: [&str; 14] = [
    "text",
    "password",
    "email",
    "search",
    "tel",
    "url",
    "number",
    "date",
    "datetime-local",
    "month",
    "week",
    "time",
    "color",
    "range",
];

/// `type` values of `<input>` elements that act as buttons.
pub const BUTTON_INPUT_TYPES: [&str; 4] = ["submit", "button", "reset", "image"];

/// Create a registry configured for HTML form pages.
///
/// A bare `<input>` is claimed by the text input kind; more specific
/// `type` filters win over it during resolution.
#[must_use]
pub fn create_standard_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();

    // Wildcard
    registry.register(Registration::new(ElementKind::Any).with_descriptor(TagDescriptor::wildcard()));

    // Navigation
    registry.register(
        Registration::new(ElementKind::Anchor)
            .with_tag("a")
            .with_group(ElementGroup::Clickable),
    );
    registry.register(
        Registration::new(ElementKind::Button)
            .with_tag("button")
            .with_tag_attributes("input", "type", BUTTON_INPUT_TYPES)
            .with_group(ElementGroup::FormField)
            .with_group(ElementGroup::Clickable),
    );

    // Form controls
    registry.register(
        Registration::new(ElementKind::CheckBox)
            .with_tag_attribute("input", "type", "checkbox")
            .with_group(ElementGroup::FormField),
    );
    registry.register(
        Registration::new(ElementKind::FileInput)
            .with_tag_attribute("input", "type", "file")
            .with_group(ElementGroup::FormField),
    );
    registry.register(
        Registration::new(ElementKind::HiddenInput)
            .with_tag_attribute("input", "type", "hidden")
            .with_group(ElementGroup::FormField),
    );
    registry.register(
        Registration::new(ElementKind::RadioButton)
            .with_tag_attribute("input", "type", "radio")
            .with_group(ElementGroup::FormField),
    );
    registry.register(
        Registration::new(ElementKind::Select)
            .with_tag("select")
            .with_group(ElementGroup::FormField),
    );
    registry.register(
        Registration::new(ElementKind::TextArea)
            .with_tag("textarea")
            .with_group(ElementGroup::FormField),
    );
    registry.register(
        Registration::new(ElementKind::TextInput)
            .with_tag_attributes("input", "type", TEXT_INPUT_TYPES)
            .with_tag("input")
            .with_group(ElementGroup::FormField),
    );

    // Structure
    registry.register(Registration::new(ElementKind::Form).with_tag("form"));
    registry.register(Registration::new(ElementKind::Label).with_tag("label"));
    registry.register(Registration::new(ElementKind::OptionItem).with_tag("option"));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ElementType;

    #[test]
    fn test_every_kind_is_registered() {
        let registry = create_standard_registry();
        for kind in ElementKind::ALL {
            assert!(registry.is_registered(kind), "{kind} is not registered");
            assert!(registry.descriptors(ElementType::Kind(kind)).is_ok());
        }
    }

    #[test]
    fn test_clickable_group() {
        let registry = create_standard_registry();
        let kinds = registry.assignable_kinds(ElementType::Group(ElementGroup::Clickable));
        assert_eq!(&*kinds, &[ElementKind::Anchor, ElementKind::Button]);
    }

    #[test]
    fn test_form_field_group_excludes_structure() {
        let registry = create_standard_registry();
        let kinds = registry.assignable_kinds(ElementType::Group(ElementGroup::FormField));
        assert!(kinds.contains(&ElementKind::Select));
        assert!(!kinds.contains(&ElementKind::Form));
        assert!(!kinds.contains(&ElementKind::OptionItem));
    }
}
