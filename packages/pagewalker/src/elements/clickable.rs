//! Links and buttons.

use std::ops::Deref;

use super::{Element, FormControl, TypedElement, Wrapper};
use crate::error::{BrowserError, Result};
use crate::navigation::{HttpRequest, PageModel, PostValue};
use crate::registry::{ElementGroup, ElementKind, ElementType};

element_wrapper! {
    /// `<a>`.
    Anchor => Anchor
}

impl Anchor {
    /// The raw `href` attribute.
    #[must_use]
    pub fn href(&self) -> Option<String> {
        self.attribute("href")
    }

    /// Follow the link and load the target as `P`.
    ///
    /// # Errors
    /// [`BrowserError::InvalidOperation`] for anchors without `href` or on
    /// detached pages; navigation errors otherwise.
    pub fn click<P: PageModel>(&self) -> Result<P> {
        let browser = self.page().browser()?;
        self.click_with_status(browser.config().expected_status())
    }

    /// Follow the link, expecting `expected_status`.
    pub fn click_with_status<P: PageModel>(&self, expected_status: u16) -> Result<P> {
        let href = self.href().ok_or_else(|| {
            BrowserError::InvalidOperation(format!("anchor {} has no href", self.summary()))
        })?;
        let url = self.page().resolve(href.trim())?;
        tracing::debug!(url = %url, "Following link");
        self.page()
            .browser()?
            .request(HttpRequest::get(url), expected_status)
    }
}

element_wrapper! {
    /// `<button>` or a button-like `<input>`.
    Button => Button
}

impl Button {
    /// The `type` attribute, lower-cased.
    ///
    /// `<button>` defaults to `submit`, `<input>` buttons carry their type.
    #[must_use]
    pub fn button_type(&self) -> String {
        self.attribute("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| "submit".to_string())
    }

    /// Whether clicking submits the owning form.
    #[must_use]
    pub fn is_submit(&self) -> bool {
        matches!(self.button_type().as_str(), "submit" | "image")
    }

    /// Submit the owning form with this button as the submitter.
    ///
    /// # Errors
    /// [`BrowserError::InvalidOperation`] for non-submit buttons and buttons
    /// outside a form.
    pub fn click<P: PageModel>(&self) -> Result<P> {
        if !self.is_submit() {
            return Err(BrowserError::InvalidOperation(format!(
                "button {} does not submit a form",
                self.summary()
            )));
        }
        let form = self.form()?.ok_or_else(|| {
            BrowserError::InvalidOperation(format!("button {} is not inside a form", self.summary()))
        })?;
        form.submit_with(self)
    }
}

impl FormControl for Button {
    fn element(&self) -> &Element {
        &self.0
    }

    fn value(&self) -> Option<String> {
        Some(self.attribute("value").unwrap_or_default())
    }

    /// Image buttons submit click coordinates instead of a value.
    fn post_data(&self) -> Result<Vec<(String, PostValue)>> {
        let Some(name) = self.name().filter(|name| !name.is_empty()) else {
            return Ok(Vec::new());
        };
        if self.button_type() == "image" {
            return Ok(vec![
                (format!("{name}.x"), PostValue::from("0")),
                (format!("{name}.y"), PostValue::from("0")),
            ]);
        }
        Ok(vec![(name, PostValue::Text(self.value().unwrap_or_default()))])
    }
}

/// A link or a button.
#[derive(Debug, Clone)]
pub struct Clickable(TypedElement);

impl Clickable {
    #[must_use]
    pub fn kind(&self) -> ElementKind {
        self.0.kind()
    }

    #[must_use]
    pub fn typed(&self) -> &TypedElement {
        &self.0
    }

    /// Follow the link or submit the button's form.
    pub fn click<P: PageModel>(&self) -> Result<P> {
        match &self.0 {
            TypedElement::Anchor(anchor) => anchor.click(),
            TypedElement::Button(button) => button.click(),
            other => Err(BrowserError::InvalidOperation(format!(
                "{} is not clickable",
                other.element().summary()
            ))),
        }
    }
}

impl Wrapper for Clickable {
    const TYPE: ElementType = ElementType::Group(ElementGroup::Clickable);

    fn from_element(element: Element, kind: ElementKind) -> Option<Self> {
        matches!(kind, ElementKind::Anchor | ElementKind::Button)
            .then(|| Self(TypedElement::wrap(element, kind)))
    }
}

impl Deref for Clickable {
    type Target = Element;

    fn deref(&self) -> &Self::Target {
        self.0.element()
    }
}

impl From<Clickable> for TypedElement {
    fn from(clickable: Clickable) -> Self {
        clickable.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{HttpResponse, Method, Page, RequestBody};
    use crate::testing::scripted_browser;

    #[test]
    fn test_anchor_click_resolves_href() {
        let (browser, requests) = scripted_browser(vec![
            HttpResponse::new(200, r#"<a href="../users/7?tab=x">Alice</a>"#),
            HttpResponse::new(200, "<title>Alice</title>"),
        ]);
        let page: Page = browser.navigate_to("/team/list").unwrap();

        let link: Anchor = page.find().by_text("Alice").unwrap();
        let target: Page = link.click().unwrap();

        assert_eq!(target.title().as_deref(), Some("Alice"));
        assert_eq!(requests.borrow()[1].url.as_str(), "http://app.test/users/7?tab=x");
        assert_eq!(requests.borrow()[1].method, Method::Get);
    }

    #[test]
    fn test_anchor_without_href() {
        let page = Page::parse("http://localhost/", "<a name=top>Top</a>").unwrap();
        let anchor: Anchor = page.find().single().unwrap();
        assert!(matches!(
            anchor.click::<Page>(),
            Err(BrowserError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_button_types() {
        let page = Page::parse(
            "http://localhost/",
            r#"<button id="a">Go</button><button id="b" type="RESET">x</button>
               <input id="c" type="image" name="map">"#,
        )
        .unwrap();
        let a: Button = page.find().by_id("a").unwrap();
        let b: Button = page.find().by_id("b").unwrap();
        let c: Button = page.find().by_id("c").unwrap();
        assert!(a.is_submit());
        assert_eq!(b.button_type(), "reset");
        assert!(!b.is_submit());
        assert!(c.is_submit());
        assert_eq!(
            c.post_data().unwrap(),
            vec![
                ("map.x".to_string(), PostValue::from("0")),
                ("map.y".to_string(), PostValue::from("0")),
            ]
        );
        assert!(matches!(b.click::<Page>(), Err(BrowserError::InvalidOperation(_))));
        assert!(matches!(a.click::<Page>(), Err(BrowserError::InvalidOperation(_))));
    }

    #[test]
    fn test_clickable_dispatch() {
        let (browser, requests) = scripted_browser(vec![
            HttpResponse::new(
                200,
                r#"<form method="post" action="/save"><input name="q" value="1">
                   <button name="op" value="save">Save</button></form>"#,
            ),
            HttpResponse::new(200, "saved"),
        ]);
        let page: Page = browser.navigate_to("/edit").unwrap();

        let save: Clickable = page.find().by_text("Save").unwrap();
        assert_eq!(save.kind(), ElementKind::Button);
        let _: Page = save.click().unwrap();

        let request = requests.borrow()[1].clone();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.url.as_str(), "http://app.test/save");
        assert_eq!(
            request.body,
            RequestBody::Form(vec![
                ("q".to_string(), "1".to_string()),
                ("op".to_string(), "save".to_string()),
            ])
        );
    }
}
