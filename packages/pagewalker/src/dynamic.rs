//! Late-bound element lookup for pages without a page model.

use crate::elements::TypedElement;
use crate::error::{BrowserError, Result};
use crate::finder::Elements;
use crate::location::LocationValidation;
use crate::navigation::{Page, PageModel};

/// A page whose members are looked up by key at run time.
///
/// # Examples
/// ```
/// use pagewalker::Page;
///
/// let page = Page::parse("http://localhost/", r#"<input id="q" name="query">"#).unwrap();
/// let dynamic = page.dynamic();
/// assert!(dynamic.get("q").unwrap().is_some());
/// assert!(dynamic.get("query").unwrap().is_some());
/// assert!(dynamic.get("missing").unwrap().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct DynamicPage {
    page: Page,
}

impl DynamicPage {
    #[must_use]
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Look up an element by id, then by name, then by own text.
    ///
    /// Each stage accepts exactly one match. Several elements sharing the
    /// name (a radio group, say) are not resolved; several id or text
    /// matches fall through to the next stage.
    ///
    /// # Errors
    /// [`BrowserError::NotImplemented`] when more than one element has the
    /// name `key`.
    pub fn get(&self, key: &str) -> Result<Option<TypedElement>> {
        let finder = self.page.find();

        if let Some(element) = single(finder.all_by_id(key)?)? {
            tracing::debug!(key, kind = %element.kind(), "Resolved member by id");
            return Ok(Some(element));
        }

        let mut named = finder.all_by_name::<TypedElement>(key)?.collect::<Result<Vec<_>>>()?;
        match named.len() {
            0 => {}
            1 => {
                tracing::debug!(key, "Resolved member by name");
                return Ok(named.pop());
            }
            count => {
                return Err(BrowserError::NotImplemented(format!(
                    "{count} elements are named '{key}'; grouped controls cannot be resolved dynamically"
                )))
            }
        }

        let by_text = single(finder.all_by_text(key)?)?;
        if by_text.is_some() {
            tracing::debug!(key, "Resolved member by text");
        }
        Ok(by_text)
    }

    /// Like [`get`](Self::get), but a missing member is an error.
    ///
    /// # Errors
    /// [`BrowserError::MissingMember`] when no stage finds the key.
    pub fn member(&self, key: &str) -> Result<TypedElement> {
        self.get(key)?
            .ok_or_else(|| BrowserError::MissingMember(key.to_string()))
    }
}

/// The only element of `candidates`, or `None` for zero or several.
fn single(candidates: Elements<TypedElement>) -> Result<Option<TypedElement>> {
    let mut found = candidates.collect::<Result<Vec<_>>>()?;
    Ok(if found.len() == 1 { found.pop() } else { None })
}

impl PageModel for DynamicPage {
    fn location_validation() -> LocationValidation {
        LocationValidation::none()
    }

    fn from_page(page: Page) -> Result<Self> {
        Ok(Self::new(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ElementKind;

    const PAGE: &str = r#"
        <form>
          <input id="user" name="login">
          <input name="password" type="password">
          <input type="radio" name="plan" value="free">
          <input type="radio" name="plan" value="pro">
          <span id="dup">a</span><span id="dup">b</span>
          <button>Sign in</button>
        </form>"#;

    fn dynamic() -> DynamicPage {
        Page::parse("http://localhost/login", PAGE).unwrap().dynamic()
    }

    #[test]
    fn test_lookup_order() {
        let page = dynamic();
        assert_eq!(page.get("user").unwrap().unwrap().kind(), ElementKind::TextInput);
        assert_eq!(page.get("password").unwrap().unwrap().kind(), ElementKind::TextInput);
        assert_eq!(page.get("Sign in").unwrap().unwrap().kind(), ElementKind::Button);
    }

    #[test]
    fn test_id_wins_over_name() {
        let page = Page::parse(
            "http://localhost/",
            r#"<input name="q" value="by-name"><textarea id="q">by-id</textarea>"#,
        )
        .unwrap()
        .dynamic();
        assert_eq!(page.member("q").unwrap().kind(), ElementKind::TextArea);
    }

    #[test]
    fn test_grouped_names_are_not_resolved() {
        assert!(matches!(
            dynamic().get("plan"),
            Err(BrowserError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_ambiguous_id_falls_through() {
        assert!(dynamic().get("dup").unwrap().is_none());
    }

    #[test]
    fn test_missing_member() {
        let page = dynamic();
        assert!(page.get("nothing").unwrap().is_none());
        match page.member("nothing") {
            Err(BrowserError::MissingMember(key)) => assert_eq!(key, "nothing"),
            other => panic!("expected missing member, got {other:?}"),
        }
    }
}
