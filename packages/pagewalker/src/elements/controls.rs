//! Form controls: inputs, text areas, selects and their options.

use std::ops::Deref;

use super::{Element, TypedElement, Wrapper};
use crate::error::{BrowserError, Result};
use crate::navigation::{FileUpload, PostValue};
use crate::registry::{ElementGroup, ElementKind, ElementType};

/// Contract shared by elements that contribute to a form submission.
pub trait FormControl {
    /// The underlying element.
    fn element(&self) -> &Element;

    /// The `name` attribute.
    fn name(&self) -> Option<String> {
        self.element().attribute("name")
    }

    /// Current value, if the control has one.
    fn value(&self) -> Option<String>;

    fn is_disabled(&self) -> bool {
        self.element().has_attribute("disabled")
    }

    /// Name/value pairs this control adds to a submission.
    ///
    /// Unnamed controls contribute nothing.
    ///
    /// # Errors
    /// When the control's state cannot be read from the page.
    fn post_data(&self) -> Result<Vec<(String, PostValue)>> {
        Ok(match (self.name(), self.value()) {
            (Some(name), Some(value)) if !name.is_empty() => vec![(name, PostValue::Text(value))],
            _ => Vec::new(),
        })
    }
}

fn ensure_enabled(element: &Element, action: &str) -> Result<()> {
    if element.has_attribute("disabled") {
        return Err(BrowserError::InvalidOperation(format!(
            "cannot {action} disabled element {}",
            element.summary()
        )));
    }
    Ok(())
}

fn ensure_editable(element: &Element) -> Result<()> {
    ensure_enabled(element, "edit")?;
    if element.has_attribute("readonly") {
        return Err(BrowserError::InvalidOperation(format!(
            "cannot edit read-only element {}",
            element.summary()
        )));
    }
    Ok(())
}

element_wrapper! {
    /// Single-line text field (`<input>` with a text-like or missing type).
    TextInput => TextInput
}

impl TextInput {
    /// The `type` attribute, lower-cased; `text` when absent.
    #[must_use]
    pub fn input_type(&self) -> String {
        self.attribute("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "text".to_string())
    }

    /// Replace the field's value.
    ///
    /// # Errors
    /// [`BrowserError::InvalidOperation`] when the field is disabled or read-only.
    pub fn set_value(&self, value: &str) -> Result<()> {
        ensure_editable(self)?;
        self.set_attribute("value", value);
        Ok(())
    }
}

impl FormControl for TextInput {
    fn element(&self) -> &Element {
        &self.0
    }

    fn value(&self) -> Option<String> {
        Some(self.attribute("value").unwrap_or_default())
    }
}

element_wrapper! {
    /// `<input type="hidden">`.
    HiddenInput => HiddenInput
}

impl HiddenInput {
    /// Replace the value. Hidden fields ignore `readonly`.
    pub fn set_value(&self, value: &str) -> Result<()> {
        ensure_enabled(self, "edit")?;
        self.set_attribute("value", value);
        Ok(())
    }
}

impl FormControl for HiddenInput {
    fn element(&self) -> &Element {
        &self.0
    }

    fn value(&self) -> Option<String> {
        Some(self.attribute("value").unwrap_or_default())
    }
}

element_wrapper! {
    /// `<textarea>`. The value is the element's text content.
    TextArea => TextArea
}

impl TextArea {
    pub fn set_value(&self, value: &str) -> Result<()> {
        ensure_editable(self)?;
        self.page().document_mut().set_text(self.node(), value);
        Ok(())
    }
}

impl FormControl for TextArea {
    fn element(&self) -> &Element {
        &self.0
    }

    fn value(&self) -> Option<String> {
        Some(self.page().document().raw_text(self.node()))
    }
}

element_wrapper! {
    /// `<input type="checkbox">`.
    CheckBox => CheckBox
}

impl CheckBox {
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.has_attribute("checked")
    }

    pub fn check(&self) -> Result<()> {
        ensure_enabled(self, "check")?;
        self.set_attribute("checked", "checked");
        Ok(())
    }

    pub fn uncheck(&self) -> Result<()> {
        ensure_enabled(self, "uncheck")?;
        self.remove_attribute("checked");
        Ok(())
    }
}

impl FormControl for CheckBox {
    fn element(&self) -> &Element {
        &self.0
    }

    /// The `value` attribute, `on` when absent.
    fn value(&self) -> Option<String> {
        Some(self.attribute("value").unwrap_or_else(|| "on".to_string()))
    }

    fn post_data(&self) -> Result<Vec<(String, PostValue)>> {
        if !self.is_checked() {
            return Ok(Vec::new());
        }
        Ok(match (self.name(), self.value()) {
            (Some(name), Some(value)) if !name.is_empty() => vec![(name, PostValue::Text(value))],
            _ => Vec::new(),
        })
    }
}

element_wrapper! {
    /// `<input type="radio">`.
    RadioButton => RadioButton
}

impl RadioButton {
    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.has_attribute("checked")
    }

    /// Check this button and uncheck the others of its group.
    ///
    /// The group is every radio button with the same name in the same form,
    /// or in the whole page for buttons outside a form.
    pub fn check(&self) -> Result<()> {
        ensure_enabled(self, "check")?;
        if let Some(name) = self.name().filter(|name| !name.is_empty()) {
            let scope = match self.form()? {
                Some(form) => form.find(),
                None => self.page().find(),
            };
            for other in scope.all_by_name::<RadioButton>(&name)? {
                other?.remove_attribute("checked");
            }
        }
        self.set_attribute("checked", "checked");
        Ok(())
    }

    pub fn uncheck(&self) -> Result<()> {
        ensure_enabled(self, "uncheck")?;
        self.remove_attribute("checked");
        Ok(())
    }
}

impl FormControl for RadioButton {
    fn element(&self) -> &Element {
        &self.0
    }

    fn value(&self) -> Option<String> {
        Some(self.attribute("value").unwrap_or_else(|| "on".to_string()))
    }

    fn post_data(&self) -> Result<Vec<(String, PostValue)>> {
        if !self.is_checked() {
            return Ok(Vec::new());
        }
        Ok(match (self.name(), self.value()) {
            (Some(name), Some(value)) if !name.is_empty() => vec![(name, PostValue::Text(value))],
            _ => Vec::new(),
        })
    }
}

element_wrapper! {
    /// `<option>`.
    OptionItem => OptionItem
}

impl OptionItem {
    /// The `value` attribute, falling back to the option's text.
    #[must_use]
    pub fn value(&self) -> String {
        self.attribute("value").unwrap_or_else(|| self.text())
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.has_attribute("selected")
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.has_attribute("disabled")
    }
}

element_wrapper! {
    /// `<select>`, single or multiple.
    Select => Select
}

impl Select {
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.has_attribute("multiple")
    }

    /// All options, in document order.
    pub fn options(&self) -> Result<Vec<OptionItem>> {
        self.find().all::<OptionItem>()?.collect()
    }

    /// Options that would be submitted.
    ///
    /// A single select without an explicit selection submits its first
    /// option; with several marked, the last one wins.
    pub fn selected_options(&self) -> Result<Vec<OptionItem>> {
        let options = self.options()?;
        let mut selected: Vec<OptionItem> =
            options.iter().filter(|option| option.is_selected()).cloned().collect();
        if self.is_multiple() {
            return Ok(selected);
        }
        Ok(match selected.pop() {
            Some(last) => vec![last],
            None => options.into_iter().take(1).collect(),
        })
    }

    /// Select the options whose value is `value`.
    ///
    /// # Errors
    /// [`BrowserError::ElementNotFound`] when no option has that value.
    pub fn select_by_value(&self, value: &str) -> Result<()> {
        self.select_where(|option| option.value() == value, format!("value='{value}'"))
    }

    /// Select the options whose normalized text is `text`.
    pub fn select_by_text(&self, text: &str) -> Result<()> {
        let text = crate::html::normalize_whitespace(text);
        self.select_where(|option| option.text() == text, format!("text='{text}'"))
    }

    /// Deselect the options whose value is `value`.
    pub fn deselect_by_value(&self, value: &str) -> Result<()> {
        ensure_enabled(self, "change")?;
        let matching = self.matching(|option| option.value() == value, format!("value='{value}'"))?;
        for option in matching {
            option.remove_attribute("selected");
        }
        Ok(())
    }

    pub fn deselect_all(&self) -> Result<()> {
        ensure_enabled(self, "change")?;
        for option in self.options()? {
            option.remove_attribute("selected");
        }
        Ok(())
    }

    fn select_where(&self, predicate: impl Fn(&OptionItem) -> bool, criterion: String) -> Result<()> {
        ensure_enabled(self, "change")?;
        let mut matching = self.matching(predicate, criterion)?;
        if !self.is_multiple() {
            matching.truncate(1);
            for option in self.options()? {
                option.remove_attribute("selected");
            }
        }
        for option in &matching {
            option.set_attribute("selected", "selected");
        }
        tracing::debug!(select = %self.summary(), count = matching.len(), "Selected options");
        Ok(())
    }

    fn matching(&self, predicate: impl Fn(&OptionItem) -> bool, criterion: String) -> Result<Vec<OptionItem>> {
        let matching: Vec<OptionItem> = self
            .options()?
            .into_iter()
            .filter(|option| predicate(option))
            .collect();
        if matching.is_empty() {
            return Err(BrowserError::ElementNotFound {
                target: ElementType::Kind(ElementKind::OptionItem),
                criterion,
            });
        }
        Ok(matching)
    }
}

impl FormControl for Select {
    fn element(&self) -> &Element {
        &self.0
    }

    /// Value of the first submitted option.
    fn value(&self) -> Option<String> {
        match self.selected_options() {
            Ok(selected) => selected.first().map(OptionItem::value),
            Err(e) => {
                tracing::warn!(select = %self.summary(), error = %e, "Cannot read selected options");
                None
            }
        }
    }

    fn post_data(&self) -> Result<Vec<(String, PostValue)>> {
        let Some(name) = self.name().filter(|name| !name.is_empty()) else {
            return Ok(Vec::new());
        };
        Ok(self
            .selected_options()?
            .into_iter()
            .filter(|option| !option.is_disabled())
            .map(|option| (name.clone(), PostValue::Text(option.value())))
            .collect())
    }
}

element_wrapper! {
    /// `<input type="file">`. The attached file lives with the page.
    FileInput => FileInput
}

impl FileInput {
    /// Attach a file to send with the next submission.
    pub fn attach(&self, upload: FileUpload) -> Result<()> {
        ensure_enabled(self, "attach a file to")?;
        tracing::debug!(input = %self.summary(), file = %upload.file_name(), "Attached file");
        self.page().set_upload(self.node(), Some(upload));
        Ok(())
    }

    pub fn clear(&self) {
        self.page().set_upload(self.node(), None);
    }

    #[must_use]
    pub fn upload(&self) -> Option<FileUpload> {
        self.page().upload(self.node())
    }
}

impl FormControl for FileInput {
    fn element(&self) -> &Element {
        &self.0
    }

    /// File name of the attachment.
    fn value(&self) -> Option<String> {
        self.upload().map(|upload| upload.file_name())
    }

    /// The attachment as a file part; an empty text part when nothing is
    /// attached.
    fn post_data(&self) -> Result<Vec<(String, PostValue)>> {
        let Some(name) = self.name().filter(|name| !name.is_empty()) else {
            return Ok(Vec::new());
        };
        let value = match self.upload() {
            Some(upload) => PostValue::File(upload),
            None => PostValue::Text(String::new()),
        };
        Ok(vec![(name, value)])
    }
}

/// Any control that takes part in form submission.
#[derive(Debug, Clone)]
pub struct FormField(TypedElement);

impl FormField {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.0.kind()
    }

    #[must_use]
    pub fn typed(&self) -> &TypedElement {
        &self.0
    }

    #[must_use]
    pub fn into_typed(self) -> TypedElement {
        self.0
    }

    /// Set the value the control submits.
    ///
    /// Text-like controls take the value verbatim, selects select the option
    /// with that value.
    ///
    /// # Errors
    /// [`BrowserError::InvalidOperation`] for controls without a settable value.
    pub fn set_value(&self, value: &str) -> Result<()> {
        match &self.0 {
            TypedElement::TextInput(input) => input.set_value(value),
            TypedElement::HiddenInput(input) => input.set_value(value),
            TypedElement::TextArea(area) => area.set_value(value),
            TypedElement::Select(select) => select.select_by_value(value),
            other => Err(BrowserError::InvalidOperation(format!(
                "cannot set the value of {} {}",
                other.kind(),
                other.element().summary()
            ))),
        }
    }

    fn control(&self) -> Option<&dyn FormControl> {
        self.0.as_form_control()
    }
}

impl Wrapper for FormField {
    const TYPE: ElementType = ElementType::Group(ElementGroup::FormField);

    fn from_element(element: Element, kind: ElementKind) -> Option<Self> {
        let typed = TypedElement::wrap(element, kind);
        typed.as_form_control().is_some().then_some(Self(typed))
    }
}

impl Deref for FormField {
    type Target = Element;

    fn deref(&self) -> &Self::Target {
        self.0.element()
    }
}

impl FormControl for FormField {
    fn element(&self) -> &Element {
        self.0.element()
    }

    fn name(&self) -> Option<String> {
        self.control().and_then(|control| control.name())
    }

    fn value(&self) -> Option<String> {
        self.control().and_then(|control| control.value())
    }

    fn is_disabled(&self) -> bool {
        self.control().is_some_and(|control| control.is_disabled())
    }

    fn post_data(&self) -> Result<Vec<(String, PostValue)>> {
        match self.control() {
            Some(control) => control.post_data(),
            None => Ok(Vec::new()),
        }
    }
}

impl From<FormField> for TypedElement {
    fn from(field: FormField) -> Self {
        field.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::Page;
    use pretty_assertions::assert_eq;

    fn page(markup: &str) -> Page {
        Page::parse("http://localhost/", markup).unwrap()
    }

    fn text(value: &str) -> PostValue {
        PostValue::Text(value.to_string())
    }

    #[test]
    fn test_text_input_set_value() {
        let page = page(r#"<input name="user" value="old"><input name="ro" readonly>"#);
        let user: TextInput = page.find().by_name("user").unwrap();
        assert_eq!(user.input_type(), "text");
        assert_eq!(user.value().as_deref(), Some("old"));

        user.set_value("alice").unwrap();
        assert_eq!(user.post_data().unwrap(), vec![("user".to_string(), text("alice"))]);

        let ro: TextInput = page.find().by_name("ro").unwrap();
        assert!(matches!(ro.set_value("x"), Err(BrowserError::InvalidOperation(_))));
    }

    #[test]
    fn test_textarea_value_is_text() {
        let page = page("<textarea name=\"bio\">  two\n lines</textarea>");
        let bio: TextArea = page.find().by_name("bio").unwrap();
        assert_eq!(bio.value().as_deref(), Some("  two\n lines"));
        bio.set_value("new").unwrap();
        assert_eq!(bio.value().as_deref(), Some("new"));
    }

    #[test]
    fn test_checkbox_posts_only_when_checked() {
        let page = page(r#"<input type="checkbox" name="agree">"#);
        let agree: CheckBox = page.find().by_name("agree").unwrap();
        assert!(agree.post_data().unwrap().is_empty());

        agree.check().unwrap();
        assert!(agree.is_checked());
        assert_eq!(agree.post_data().unwrap(), vec![("agree".to_string(), text("on"))]);

        agree.uncheck().unwrap();
        assert!(agree.post_data().unwrap().is_empty());
    }

    #[test]
    fn test_radio_group_is_exclusive() {
        let page = page(
            r#"<form><input type="radio" name="size" value="s" checked>
               <input type="radio" name="size" value="m"></form>
               <form><input type="radio" name="size" value="l" checked></form>"#,
        );
        let medium: RadioButton = page.find().by_value("m").unwrap();
        medium.check().unwrap();

        let checked: Vec<String> = page
            .find()
            .all_by_name::<RadioButton>("size")
            .unwrap()
            .map(Result::unwrap)
            .filter(RadioButton::is_checked)
            .filter_map(|radio| radio.value())
            .collect();
        assert_eq!(checked, vec!["m".to_string(), "l".to_string()]);
    }

    #[test]
    fn test_single_select_defaults_to_first_option() {
        let page = page(
            r#"<select name="color"><option>Red</option><option value="g">Green</option></select>"#,
        );
        let color: Select = page.find().by_name("color").unwrap();
        assert_eq!(color.value().as_deref(), Some("Red"));

        color.select_by_text("Green").unwrap();
        assert_eq!(color.post_data().unwrap(), vec![("color".to_string(), text("g"))]);

        color.select_by_value("Red").unwrap();
        assert_eq!(color.value().as_deref(), Some("Red"));
    }

    #[test]
    fn test_multiple_select() {
        let page = page(
            r#"<select name="tags" multiple>
                 <option value="a" selected>A</option><option value="b">B</option>
                 <option value="c">C</option></select>"#,
        );
        let tags: Select = page.find().by_name("tags").unwrap();
        tags.select_by_value("c").unwrap();
        assert_eq!(
            tags.post_data().unwrap(),
            vec![("tags".to_string(), text("a")), ("tags".to_string(), text("c"))]
        );

        tags.deselect_by_value("a").unwrap();
        tags.deselect_all().unwrap();
        assert!(tags.post_data().unwrap().is_empty());
    }

    #[test]
    fn test_select_unknown_option() {
        let page = page(r#"<select name="s"><option>x</option></select>"#);
        let select: Select = page.find().by_name("s").unwrap();
        match select.select_by_value("y") {
            Err(BrowserError::ElementNotFound { target, criterion }) => {
                assert_eq!(target, ElementType::Kind(ElementKind::OptionItem));
                assert_eq!(criterion, "value='y'");
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[test]
    fn test_file_input_attachment() {
        let page = page(r#"<input type="file" name="doc"><input type="file" name="off" disabled>"#);
        let doc: FileInput = page.find().by_name("doc").unwrap();
        assert_eq!(doc.post_data().unwrap(), vec![("doc".to_string(), text(""))]);

        doc.attach(FileUpload::bytes("a.txt", "hello")).unwrap();
        assert_eq!(doc.value().as_deref(), Some("a.txt"));
        assert_eq!(
            doc.post_data().unwrap(),
            vec![("doc".to_string(), PostValue::File(FileUpload::bytes("a.txt", "hello")))]
        );

        doc.clear();
        assert!(doc.upload().is_none());

        let off: FileInput = page.find().by_name("off").unwrap();
        assert!(off.attach(FileUpload::bytes("b", "")).is_err());
    }

    #[test]
    fn test_form_field_group() {
        let page = page(
            r#"<input name="q"><select name="s"><option>x</option></select>
               <a id="link" href="/">x</a><input type="submit" name="go" value="Go">"#,
        );
        let fields: Vec<FormField> = page.find().all::<FormField>().unwrap().map(Result::unwrap).collect();
        let kinds: Vec<ElementKind> = fields.iter().map(FormField::kind).collect();
        assert_eq!(
            kinds,
            vec![ElementKind::TextInput, ElementKind::Select, ElementKind::Button]
        );

        fields[0].set_value("rust").unwrap();
        assert_eq!(fields[0].value().as_deref(), Some("rust"));
        assert!(matches!(fields[2].set_value("x"), Err(BrowserError::InvalidOperation(_))));

        let link: Element = page.find().by_id("link").unwrap();
        assert!(link.cast::<FormField>().is_err());
    }
}
