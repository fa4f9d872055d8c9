//! Loaded pages and page models.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use super::browser::{Browser, BrowserLink};
use super::http::{FileUpload, HttpResponse};
use super::result::{HttpOutcome, HttpResult, Method};
use crate::config::parse_absolute;
use crate::dynamic::DynamicPage;
use crate::elements::Element;
use crate::error::{BrowserError, Result};
use crate::finder::ElementFinder;
use crate::html::{self, Document, NodeId};
use crate::location::LocationValidation;
use crate::query::Axis;
use crate::registry::TypeRegistry;

/// A typed view of a loaded page.
///
/// # Examples
/// ```
/// use pagewalker::elements::TextInput;
/// use pagewalker::{Page, PageModel, Result};
///
/// struct LoginPage {
///     page: Page,
/// }
///
/// impl PageModel for LoginPage {
///     fn declared_location() -> Option<&'static str> {
///         Some("/account/login")
///     }
///
///     fn from_page(page: Page) -> Result<Self> {
///         Ok(Self { page })
///     }
/// }
///
/// impl LoginPage {
///     fn user_name(&self) -> Result<TextInput> {
///         self.page.find().by_name("username")
///     }
/// }
/// ```
pub trait PageModel: Sized {
    /// Location the page lives at, absolute or relative to the base URL.
    fn declared_location() -> Option<&'static str> {
        None
    }

    /// How the final location of a navigation is checked.
    fn location_validation() -> LocationValidation {
        LocationValidation::uri_only()
    }

    /// Wrap a freshly loaded page.
    fn from_page(page: Page) -> Result<Self>;
}

/// A loaded document plus the navigation that produced it.
///
/// Cheap to clone; clones share the same document. Elements keep the page
/// alive, and the page keeps its browser session alive.
#[derive(Clone)]
pub struct Page {
    inner: Rc<PageData>,
}

struct PageData {
    browser: Option<BrowserLink>,
    registry: Arc<TypeRegistry>,
    document: RefCell<Document>,
    result: HttpResult,
    content_type: Option<String>,
    uploads: RefCell<HashMap<NodeId, FileUpload>>,
}

impl Page {
    pub(crate) fn new(
        browser: Option<BrowserLink>,
        registry: Arc<TypeRegistry>,
        result: HttpResult,
        response: &HttpResponse,
    ) -> Self {
        Self {
            inner: Rc::new(PageData {
                browser,
                registry,
                document: RefCell::new(Document::parse_bytes(&response.body)),
                result,
                content_type: response.content_type().map(str::to_string),
                uploads: RefCell::new(HashMap::new()),
            }),
        }
    }

    /// Build a detached page from markup, as if fetched from `location`.
    ///
    /// The page has no browser, so clicking links or submitting forms fails
    /// with [`BrowserError::InvalidOperation`].
    ///
    /// # Examples
    /// ```
    /// use pagewalker::Page;
    ///
    /// let page = Page::parse("http://localhost/", "<title>Home</title>").unwrap();
    /// assert_eq!(page.title().as_deref(), Some("Home"));
    /// assert_eq!(page.status(), 200);
    /// ```
    pub fn parse(location: &str, markup: &str) -> Result<Self> {
        let outcome = HttpOutcome::from_url(
            parse_absolute(location)?,
            Method::Get,
            200,
            "OK",
            Duration::ZERO,
        );
        let response = HttpResponse::new(200, markup).with_header("content-type", "text/html");
        Ok(Self::new(
            None,
            TypeRegistry::standard(),
            HttpResult::new(vec![outcome])?,
            &response,
        ))
    }

    /// The parsed document.
    ///
    /// # Panics
    /// Panics if called while the document is being modified, which cannot
    /// happen through the public API.
    #[must_use]
    pub fn document(&self) -> Ref<'_, Document> {
        self.inner.document.borrow()
    }

    pub(crate) fn document_mut(&self) -> RefMut<'_, Document> {
        self.inner.document.borrow_mut()
    }

    /// Outcome history of the navigation that produced this page.
    #[must_use]
    pub fn result(&self) -> &HttpResult {
        &self.inner.result
    }

    /// Final location after redirects.
    #[must_use]
    pub fn location(&self) -> &Url {
        self.inner.result.final_location()
    }

    /// Final status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.inner.result.status()
    }

    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.inner.content_type.as_deref()
    }

    /// Text of the `<title>` element.
    #[must_use]
    pub fn title(&self) -> Option<String> {
        html::title(&self.document())
    }

    /// Element type registry used for lookups on this page.
    #[must_use]
    pub fn registry(&self) -> &TypeRegistry {
        &self.inner.registry
    }

    /// The browser that loaded this page.
    ///
    /// # Errors
    /// [`BrowserError::InvalidOperation`] for pages built with
    /// [`Page::parse`].
    pub fn browser(&self) -> Result<Browser> {
        self.inner
            .browser
            .as_ref()
            .map(BrowserLink::browser)
            .ok_or_else(|| {
                BrowserError::InvalidOperation(format!(
                    "page {} is not attached to a browser",
                    self.location()
                ))
            })
    }

    /// Finder over the whole document.
    #[must_use]
    pub fn find(&self) -> ElementFinder {
        ElementFinder::new(self.clone(), self.document().root(), Axis::Descendant)
    }

    /// Element handle for a node of this page.
    #[must_use]
    pub fn element(&self, node: NodeId) -> Element {
        Element::new(self.clone(), node)
    }

    /// Late-bound view of this page.
    #[must_use]
    pub fn dynamic(&self) -> DynamicPage {
        DynamicPage::new(self.clone())
    }

    /// Resolve a link target against this page's location.
    pub fn resolve(&self, location: &str) -> Result<Url> {
        self.location()
            .join(location)
            .map_err(|source| BrowserError::InvalidUrl {
                location: location.to_string(),
                source,
            })
    }

    /// Whether two handles refer to the same loaded page.
    #[must_use]
    pub fn same_page(&self, other: &Page) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub(crate) fn upload(&self, node: NodeId) -> Option<FileUpload> {
        self.inner.uploads.borrow().get(&node).cloned()
    }

    pub(crate) fn set_upload(&self, node: NodeId, upload: Option<FileUpload>) {
        let mut uploads = self.inner.uploads.borrow_mut();
        match upload {
            Some(upload) => uploads.insert(node, upload),
            None => uploads.remove(&node),
        };
    }
}

impl PageModel for Page {
    fn location_validation() -> LocationValidation {
        LocationValidation::none()
    }

    fn from_page(page: Page) -> Result<Self> {
        Ok(page)
    }
}

impl fmt::Debug for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("location", &self.location().as_str())
            .field("status", &self.status())
            .field("hops", &self.result().outcomes().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_detached_page() {
        let page = Page::parse("http://localhost/app/", "<h1>x</h1>").unwrap();
        assert_eq!(page.location().as_str(), "http://localhost/app/");
        assert_eq!(page.content_type(), Some("text/html"));
        assert_eq!(page.result().outcomes().len(), 1);
        assert!(matches!(page.browser(), Err(BrowserError::InvalidOperation(_))));
    }

    #[test]
    fn test_parse_requires_absolute_location() {
        assert!(matches!(
            Page::parse("/app/", "<h1>x</h1>"),
            Err(BrowserError::RelativeLocation(_))
        ));
    }

    #[test]
    fn test_resolve_against_location() {
        let page = Page::parse("http://localhost/app/list", "").unwrap();
        assert_eq!(page.resolve("edit?id=1").unwrap().as_str(), "http://localhost/app/edit?id=1");
        assert_eq!(page.resolve("").unwrap().as_str(), "http://localhost/app/list");
    }

    #[test]
    fn test_clones_share_document() {
        let page = Page::parse("http://localhost/", "<input name=q>").unwrap();
        let clone = page.clone();
        assert!(page.same_page(&clone));
        let input = html::find_by_tag(&page.document(), page.document().root(), "input").unwrap();
        clone.document_mut().set_attribute(input, "value", "x");
        assert_eq!(page.document().attribute(input, "value"), Some("x"));
    }
}
