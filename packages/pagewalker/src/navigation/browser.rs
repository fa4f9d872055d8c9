//! The navigation engine.

use std::any::type_name;
use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use std::time::Instant;

use url::Url;

use super::http::{HttpRequest, HttpResponse, PostValue, ReqwestTransport, RequestBody, Transport};
use super::page::{Page, PageModel};
use super::result::{HttpOutcome, HttpResult, Method};
use crate::config::{is_redirect_status, resolve_location, BrowserConfig};
use crate::dynamic::DynamicPage;
use crate::error::{BrowserError, Result};
use crate::registry::TypeRegistry;

/// Configuration and transport shared by a browser and every page it loads.
struct Session {
    config: BrowserConfig,
    transport: Box<dyn Transport>,
}

type LastPage = RefCell<Option<Page>>;

/// A page's handle back to the browser that loaded it.
///
/// The session is held strongly so a page can keep navigating after the
/// caller drops its browser; the last-page slot is held weakly because it
/// points back at pages.
#[derive(Clone)]
pub(crate) struct BrowserLink {
    session: Rc<Session>,
    last_page: Weak<LastPage>,
}

impl BrowserLink {
    pub(crate) fn browser(&self) -> Browser {
        Browser {
            session: Rc::clone(&self.session),
            last_page: self.last_page.upgrade().unwrap_or_default(),
        }
    }
}

/// Issues requests, follows redirects and builds pages.
///
/// A browser is single-threaded: its cookie jar and last page are not
/// synchronized. Use one instance per thread.
///
/// # Examples
/// ```no_run
/// use pagewalker::{Browser, BrowserConfig, Page};
///
/// let config = BrowserConfig::builder()
///     .base_url("http://localhost:8080/")
///     .cookies(true)
///     .build()?;
/// let browser = Browser::new(config)?;
/// let page: Page = browser.navigate_to("/home/index")?;
/// println!("{} after {} hop(s)", page.location(), page.result().outcomes().len());
/// # Ok::<(), pagewalker::BrowserError>(())
/// ```
#[derive(Clone)]
pub struct Browser {
    session: Rc<Session>,
    last_page: Rc<LastPage>,
}

impl Browser {
    /// Create a browser backed by a `reqwest` client.
    pub fn new(config: BrowserConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(&config)?;
        Ok(Self::with_transport(config, transport))
    }

    /// Create a browser with a custom transport.
    #[must_use]
    pub fn with_transport(config: BrowserConfig, transport: impl Transport + 'static) -> Self {
        Self {
            session: Rc::new(Session {
                config,
                transport: Box::new(transport),
            }),
            last_page: Rc::default(),
        }
    }

    fn link(&self) -> BrowserLink {
        BrowserLink {
            session: Rc::clone(&self.session),
            last_page: Rc::downgrade(&self.last_page),
        }
    }

    #[must_use]
    pub fn config(&self) -> &BrowserConfig {
        &self.session.config
    }

    /// Element type registry shared by every page of this browser.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        self.session.config.registry()
    }

    /// The page produced by the most recent navigation, including one that
    /// failed its status or location check.
    #[must_use]
    pub fn last_page(&self) -> Option<Page> {
        self.last_page.borrow().clone()
    }

    /// Forget every stored cookie. Works before any request was made.
    pub fn clear_cookies(&self) -> Result<()> {
        self.session
            .transport
            .clear_cookies()
            .map_err(|source| BrowserError::Transport {
                location: String::new(),
                history: Vec::new(),
                source,
            })
    }

    /// GET `location` and expect the configured status.
    pub fn navigate_to<P: PageModel>(&self, location: &str) -> Result<P> {
        self.navigate_to_with_status(location, self.config().expected_status())
    }

    /// GET `location` and expect `expected_status`.
    pub fn navigate_to_with_status<P: PageModel>(&self, location: &str, expected_status: u16) -> Result<P> {
        let url = self.start_location::<P>(Some(location))?;
        self.request(HttpRequest::get(url), expected_status)
    }

    /// GET the page model's declared location.
    pub fn open<P: PageModel>(&self) -> Result<P> {
        self.open_with_status(self.config().expected_status())
    }

    /// GET the page model's declared location and expect `expected_status`.
    pub fn open_with_status<P: PageModel>(&self, expected_status: u16) -> Result<P> {
        let url = self.start_location::<P>(None)?;
        self.request(HttpRequest::get(url), expected_status)
    }

    /// GET `location` without a static page model.
    pub fn navigate_dynamic(&self, location: &str) -> Result<DynamicPage> {
        self.navigate_to(location)
    }

    /// POST fields to `location`.
    ///
    /// Fields are sent urlencoded unless one of them is a file, in which case
    /// the body is `multipart/form-data`.
    pub fn post<P, K, V>(&self, location: &str, fields: impl IntoIterator<Item = (K, V)>) -> Result<P>
    where
        P: PageModel,
        K: Into<String>,
        V: Into<PostValue>,
    {
        let url = self.start_location::<P>(Some(location))?;
        let fields = fields
            .into_iter()
            .map(|(name, value)| (name.into(), value.into()))
            .collect();
        let body = RequestBody::from_fields(fields, false);
        self.request(HttpRequest::post(url, body), self.config().expected_status())
    }

    /// Send a request, follow redirects and build the page model.
    ///
    /// The raw page is stored as [`last_page`](Self::last_page) before the
    /// status and location checks run, so it stays inspectable when either
    /// check fails.
    ///
    /// # Errors
    /// - [`BrowserError::Transport`] when no response was obtained.
    /// - [`BrowserError::UnexpectedStatus`] when the final status differs.
    /// - [`BrowserError::UnexpectedLocation`] when the final location is not
    ///   acceptable for `P`.
    pub fn request<P: PageModel>(&self, request: HttpRequest, expected_status: u16) -> Result<P> {
        let (result, response) = self.follow(request)?;
        let page = Page::new(
            Some(self.link()),
            Arc::clone(self.registry()),
            result,
            &response,
        );
        *self.last_page.borrow_mut() = Some(page.clone());

        let actual = page.status();
        if actual != expected_status {
            tracing::warn!(
                expected = expected_status,
                actual,
                location = %page.location(),
                "Unexpected status code"
            );
            return Err(BrowserError::UnexpectedStatus {
                expected: expected_status,
                actual,
                result: page.result().clone(),
            });
        }

        let model = P::from_page(page.clone())?;
        self.check_location::<P>(&page)?;

        tracing::info!(
            location = %page.location(),
            status = actual,
            hops = page.result().outcomes().len(),
            "Navigation complete"
        );
        Ok(model)
    }

    fn start_location<P: PageModel>(&self, location: Option<&str>) -> Result<Url> {
        let location = match location {
            Some(location) => location,
            None => P::declared_location()
                .ok_or_else(|| BrowserError::MissingLocation(type_name::<P>().to_string()))?,
        };
        self.config().resolve(location)
    }

    fn check_location<P: PageModel>(&self, page: &Page) -> Result<()> {
        let validation = P::location_validation();
        let expected = P::declared_location()
            .map(|location| self.config().resolve(location))
            .transpose()?;
        let expected = expected.as_ref().map(Url::as_str);
        let actual = page.location().as_str();

        if validation.validate(actual, expected)? {
            return Ok(());
        }

        tracing::warn!(
            expected = ?expected,
            actual,
            "Unexpected final location"
        );
        Err(BrowserError::UnexpectedLocation {
            expected: validation.describe(expected),
            actual: actual.to_string(),
            result: page.result().clone(),
        })
    }

    /// Send `request` and every redirect it leads to.
    fn follow(&self, mut request: HttpRequest) -> Result<(HttpResult, HttpResponse)> {
        let mut outcomes: Vec<HttpOutcome> = Vec::new();

        loop {
            let started = Instant::now();
            let response = match self.session.transport.send(&request) {
                Ok(response) => response,
                Err(source) => {
                    tracing::warn!(location = %request.url, error = %source, "Request failed");
                    return Err(BrowserError::Transport {
                        location: request.url.to_string(),
                        history: outcomes,
                        source,
                    });
                }
            };
            let elapsed = started.elapsed();

            tracing::debug!(
                method = %request.method,
                location = %request.url,
                status = response.status,
                ?elapsed,
                "Received response"
            );
            outcomes.push(HttpOutcome::from_url(
                request.url.clone(),
                request.method,
                response.status,
                response.reason.clone(),
                elapsed,
            ));

            let target = response
                .location()
                .filter(|_| is_redirect_status(response.status))
                .map(str::to_string);
            let Some(target) = target else {
                return Ok((HttpResult::new(outcomes)?, response));
            };
            let next = resolve_location(Some(&request.url), &target)?;
            request = redirect(request, response.status, next);
        }
    }
}

/// Request to send after a redirect: 307 and 308 repeat the request,
/// everything else continues as a body-less GET.
fn redirect(request: HttpRequest, status: u16, url: Url) -> HttpRequest {
    match status {
        307 | 308 => HttpRequest { url, ..request },
        _ => HttpRequest::get(url),
    }
}

impl std::fmt::Debug for Browser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Browser")
            .field("config", &self.session.config)
            .field("last_page", &self.last_page.borrow())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::elements::Anchor;
    use crate::testing::scripted_browser as browser;

    #[derive(Debug)]
    struct Account;

    impl PageModel for Account {
        fn declared_location() -> Option<&'static str> {
            Some("/account")
        }

        fn from_page(_page: Page) -> Result<Self> {
            Ok(Account)
        }
    }

    #[test]
    fn test_follows_redirect_chain() {
        let (browser, requests) = browser(vec![
            HttpResponse::new(302, "").with_header("Location", "/step"),
            HttpResponse::new(301, "").with_header("Location", "http://app.test/account/"),
            HttpResponse::new(200, "<title>Account</title>"),
        ]);

        let page: Page = browser.navigate_to("/start").unwrap();

        let statuses: Vec<u16> = page.result().outcomes().iter().map(HttpOutcome::status).collect();
        assert_eq!(statuses, vec![302, 301, 200]);
        assert_eq!(page.location().as_str(), "http://app.test/account/");
        assert_eq!(page.title().as_deref(), Some("Account"));
        let sum: Duration = page.result().outcomes().iter().map(HttpOutcome::elapsed).sum();
        assert_eq!(page.result().total_elapsed(), sum);
        assert_eq!(requests.borrow()[1].url.as_str(), "http://app.test/step");
    }

    #[test]
    fn test_three_redirects_reach_declared_location() {
        let (browser, requests) = browser(vec![
            HttpResponse::new(302, "").with_header("Location", "/one"),
            HttpResponse::new(301, "").with_header("Location", "/two"),
            HttpResponse::new(307, "").with_header("Location", "/ACCOUNT/"),
            HttpResponse::new(200, "<title>Account</title>"),
        ]);

        let account = browser.navigate_to::<Account>("/start");

        assert!(account.is_ok(), "{account:?}");
        let last = browser.last_page().unwrap();
        let outcomes = last.result().outcomes();
        assert_eq!(outcomes.len(), 4);
        assert_eq!(outcomes.last().map(HttpOutcome::status), Some(200));
        assert_eq!(requests.borrow()[3].method, Method::Get);
    }

    fn page_from_dropped_browser() -> Page {
        let (browser, _) = browser(vec![
            HttpResponse::new(200, r#"<a href="/next">Next</a>"#),
            HttpResponse::new(200, "<title>Next</title>"),
        ]);
        browser.navigate_to("/").unwrap()
    }

    #[test]
    fn test_page_outlives_browser_handle() {
        let page = page_from_dropped_browser();

        let next: Anchor = page.find().by_text("Next").unwrap();
        let target: Page = next.click().unwrap();

        assert_eq!(target.title().as_deref(), Some("Next"));
        assert_eq!(target.location().as_str(), "http://app.test/next");
    }

    #[test]
    fn test_page_navigation_updates_last_page() {
        let (browser, _) = browser(vec![
            HttpResponse::new(200, r#"<a href="/next">Next</a>"#),
            HttpResponse::new(200, "<title>Next</title>"),
        ]);
        let page: Page = browser.navigate_to("/").unwrap();

        let next: Anchor = page.find().by_text("Next").unwrap();
        let target: Page = next.click().unwrap();

        assert!(browser.last_page().unwrap().same_page(&target));
    }

    #[test]
    fn test_status_mismatch_keeps_last_page() {
        let (browser, _) = browser(vec![HttpResponse::new(404, "<title>Missing</title>")]);

        let err = browser.navigate_to::<Page>("/nope").unwrap_err();

        match &err {
            BrowserError::UnexpectedStatus { expected, actual, .. } => {
                assert_eq!((*expected, *actual), (200, 404));
            }
            other => panic!("expected status mismatch, got {other:?}"),
        }
        assert_eq!(err.history().map(<[HttpOutcome]>::len), Some(1));
        let last = browser.last_page().unwrap();
        assert_eq!(last.title().as_deref(), Some("Missing"));
    }

    #[test]
    fn test_expected_non_ok_status() {
        let (browser, _) = browser(vec![HttpResponse::new(404, "")]);
        let page: Page = browser.navigate_to_with_status("/nope", 404).unwrap();
        assert_eq!(page.status(), 404);
    }

    #[test]
    fn test_location_mismatch_is_distinct() {
        let (browser, _) = browser(vec![
            HttpResponse::new(302, "").with_header("Location", "/login"),
            HttpResponse::new(200, "<title>Login</title>"),
        ]);

        let err = browser.open::<Account>().unwrap_err();

        match err {
            BrowserError::UnexpectedLocation { expected, actual, result } => {
                assert_eq!(expected, "http://app.test/account");
                assert_eq!(actual, "http://app.test/login");
                assert_eq!(result.outcomes().len(), 2);
            }
            other => panic!("expected location mismatch, got {other:?}"),
        }
        assert!(browser.last_page().is_some());
    }

    #[test]
    fn test_open_uses_declared_location() {
        let (browser, requests) = browser(vec![HttpResponse::new(200, "")]);
        browser.open::<Account>().unwrap();
        assert_eq!(requests.borrow()[0].url.as_str(), "http://app.test/account");
    }

    #[test]
    fn test_open_without_location_fails() {
        let (browser, requests) = browser(vec![]);
        assert!(matches!(
            browser.open::<Page>(),
            Err(BrowserError::MissingLocation(_))
        ));
        assert!(requests.borrow().is_empty());
    }

    #[test]
    fn test_post_redirect_becomes_get() {
        let (browser, requests) = browser(vec![
            HttpResponse::new(303, "").with_header("Location", "/done"),
            HttpResponse::new(200, ""),
        ]);
        let _: Page = browser.post("/submit", [("q", "rust")]).unwrap();

        let requests = requests.borrow();
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(
            requests[0].body,
            RequestBody::Form(vec![("q".to_string(), "rust".to_string())])
        );
        assert_eq!(requests[1].method, Method::Get);
        assert!(requests[1].body.is_empty());
    }

    #[test]
    fn test_temporary_redirect_keeps_method() {
        let (browser, requests) = browser(vec![
            HttpResponse::new(307, "").with_header("Location", "/again"),
            HttpResponse::new(200, ""),
        ]);
        let _: Page = browser.post("/submit", [("q", "rust")]).unwrap();
        let requests = requests.borrow();
        assert_eq!(requests[1].method, Method::Post);
        assert_eq!(requests[1].body, requests[0].body);
    }

    #[test]
    fn test_redirect_without_location_is_final() {
        let (browser, _) = browser(vec![HttpResponse::new(302, "")]);
        let page: Page = browser.navigate_to_with_status("/", 302).unwrap();
        assert_eq!(page.result().outcomes().len(), 1);
    }

    #[test]
    fn test_transport_failure_carries_history() {
        let (browser, _) = browser(vec![HttpResponse::new(302, "").with_header("Location", "/gone")]);
        let err = browser.navigate_to::<Page>("/").unwrap_err();
        match err {
            BrowserError::Transport { location, history, .. } => {
                assert_eq!(location, "http://app.test/gone");
                assert_eq!(history.len(), 1);
            }
            other => panic!("expected transport failure, got {other:?}"),
        }
        assert!(browser.last_page().is_none());
    }
}
