//! Configuration constants, browser settings and location helpers.

use std::sync::{Arc, LazyLock};
use std::time::Duration;

use regex::Regex;
use url::Url;

use crate::error::{BrowserError, Result};
use crate::registry::TypeRegistry;

/// HTTP timeout in seconds.
pub const HTTP_TIMEOUT_SECS: u64 = 30;

/// User agent string identifying this browser.
pub const USER_AGENT: &str = concat!("pagewalker/", env!("CARGO_PKG_VERSION"));

/// Status codes that are followed as redirects when a `Location` header is present.
pub const REDIRECT_STATUS_CODES: [u16; 6] = [300, 301, 302, 303, 307, 308];

/// Status code a navigation expects unless told otherwise.
pub const DEFAULT_EXPECTED_STATUS: u16 = 200;

/// Tag and attribute names accepted in structural queries.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_.:\-]*$").expect("valid regex"));

/// Check whether a status code is one of the followed redirect codes.
///
/// # Examples
/// ```
/// use pagewalker::config::is_redirect_status;
///
/// assert!(is_redirect_status(302));
/// assert!(is_redirect_status(308));
/// assert!(!is_redirect_status(200));
/// assert!(!is_redirect_status(304));
/// ```
#[must_use]
pub fn is_redirect_status(status: u16) -> bool {
    REDIRECT_STATUS_CODES.contains(&status)
}

/// Validate a tag or attribute name before it is embedded in a query.
///
/// # Examples
/// ```
/// use pagewalker::config::validate_name;
///
/// assert!(validate_name("data-role").is_ok());
/// assert!(validate_name("li.nr").is_ok());
/// assert!(validate_name("a'] or [").is_err());
/// ```
pub fn validate_name(name: &str) -> Result<()> {
    if NAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(BrowserError::InvalidQuery {
            query: name.to_string(),
            message: "not a valid tag or attribute name".to_string(),
        })
    }
}

/// Parse a location that must be absolute.
///
/// Relative locations are rejected with [`BrowserError::RelativeLocation`]
/// instead of being resolved against anything.
pub fn parse_absolute(location: &str) -> Result<Url> {
    match Url::parse(location) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Err(BrowserError::RelativeLocation(location.to_string()))
        }
        Err(source) => Err(BrowserError::InvalidUrl {
            location: location.to_string(),
            source,
        }),
    }
}

/// Resolve a location against an optional base.
///
/// Absolute locations are returned as-is; relative ones need a base.
///
/// # Examples
/// ```
/// use pagewalker::config::resolve_location;
/// use url::Url;
///
/// let base = Url::parse("http://localhost:8080/app/").unwrap();
/// let url = resolve_location(Some(&base), "login").unwrap();
/// assert_eq!(url.as_str(), "http://localhost:8080/app/login");
///
/// assert!(resolve_location(None, "/login").is_err());
/// ```
pub fn resolve_location(base: Option<&Url>, location: &str) -> Result<Url> {
    match parse_absolute(location) {
        Err(BrowserError::RelativeLocation(relative)) => match base {
            Some(base) => base.join(&relative).map_err(|source| BrowserError::InvalidUrl {
                location: relative,
                source,
            }),
            None => Err(BrowserError::RelativeLocation(relative)),
        },
        other => other,
    }
}

/// Settings shared by every navigation of one [`Browser`](crate::Browser).
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    base_url: Option<Url>,
    timeout: Duration,
    cookies: bool,
    user_agent: String,
    expected_status: u16,
    registry: Arc<TypeRegistry>,
}

impl BrowserConfig {
    /// Start building a configuration.
    #[must_use]
    pub fn builder() -> BrowserConfigBuilder {
        BrowserConfigBuilder::default()
    }

    /// Base URL relative locations are resolved against.
    #[must_use]
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// How long a single request may take.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Whether cookies persist across navigations.
    #[must_use]
    pub fn cookies(&self) -> bool {
        self.cookies
    }

    /// User agent sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Status code expected at the end of a navigation.
    #[must_use]
    pub fn expected_status(&self) -> u16 {
        self.expected_status
    }

    /// Element type registry used for lookups.
    #[must_use]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// Resolve a location against the configured base URL.
    pub fn resolve(&self, location: &str) -> Result<Url> {
        resolve_location(self.base_url.as_ref(), location)
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: Duration::from_secs(HTTP_TIMEOUT_SECS),
            cookies: false,
            user_agent: USER_AGENT.to_string(),
            expected_status: DEFAULT_EXPECTED_STATUS,
            registry: TypeRegistry::standard(),
        }
    }
}

/// Builder for [`BrowserConfig`].
#[derive(Debug, Default)]
pub struct BrowserConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    cookies: bool,
    user_agent: Option<String>,
    expected_status: Option<u16>,
    registry: Option<Arc<TypeRegistry>>,
}

impl BrowserConfigBuilder {
    /// Base URL for relative locations; must be absolute.
    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Keep a cookie jar across navigations.
    #[must_use]
    pub fn cookies(mut self, enabled: bool) -> Self {
        self.cookies = enabled;
        self
    }

    /// Override the user agent.
    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Status code expected when a navigation does not specify one.
    #[must_use]
    pub fn expected_status(mut self, status: u16) -> Self {
        self.expected_status = Some(status);
        self
    }

    /// Use a custom element type registry.
    #[must_use]
    pub fn registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Validate and build the configuration.
    pub fn build(self) -> Result<BrowserConfig> {
        let base_url = self.base_url.as_deref().map(parse_absolute).transpose()?;

        if let Some(base) = &base_url {
            if base.cannot_be_a_base() {
                return Err(BrowserError::InvalidConfig(format!(
                    "base URL '{base}' cannot be used to resolve relative locations"
                )));
            }
        }

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(HTTP_TIMEOUT_SECS));
        if timeout.is_zero() {
            return Err(BrowserError::InvalidConfig(
                "timeout must be greater than zero".to_string(),
            ));
        }

        Ok(BrowserConfig {
            base_url,
            timeout,
            cookies: self.cookies,
            user_agent: self.user_agent.unwrap_or_else(|| USER_AGENT.to_string()),
            expected_status: self.expected_status.unwrap_or(DEFAULT_EXPECTED_STATUS),
            registry: self.registry.unwrap_or_else(TypeRegistry::standard),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_codes() {
        for code in [300, 301, 302, 303, 307, 308] {
            assert!(is_redirect_status(code), "{code} should redirect");
        }
        for code in [200, 204, 304, 404, 500] {
            assert!(!is_redirect_status(code), "{code} should not redirect");
        }
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("input").is_ok());
        assert!(validate_name("xml:lang").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("1abc").is_err());
        assert!(validate_name("name='x'").is_err());
    }

    #[test]
    fn test_parse_absolute_rejects_relative() {
        assert!(matches!(
            parse_absolute("/home/index"),
            Err(BrowserError::RelativeLocation(_))
        ));
        assert!(parse_absolute("http://example.com/").is_ok());
    }

    #[test]
    fn test_resolve_location() {
        let base = Url::parse("http://localhost/app/").unwrap();
        assert_eq!(
            resolve_location(Some(&base), "/other").unwrap().as_str(),
            "http://localhost/other"
        );
        assert_eq!(
            resolve_location(Some(&base), "https://example.com/x")
                .unwrap()
                .as_str(),
            "https://example.com/x"
        );
    }

    #[test]
    fn test_builder_defaults() {
        let config = BrowserConfig::builder().build().unwrap();
        assert!(config.base_url().is_none());
        assert_eq!(config.timeout(), Duration::from_secs(HTTP_TIMEOUT_SECS));
        assert_eq!(config.expected_status(), 200);
        assert!(!config.cookies());
    }

    #[test]
    fn test_builder_rejects_relative_base() {
        let result = BrowserConfig::builder().base_url("/relative").build();
        assert!(matches!(result, Err(BrowserError::RelativeLocation(_))));
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let result = BrowserConfig::builder().timeout(Duration::ZERO).build();
        assert!(matches!(result, Err(BrowserError::InvalidConfig(_))));
    }
}
