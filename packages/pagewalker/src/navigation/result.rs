//! Outcome history of a navigation.

use std::fmt;
use std::time::Duration;

use url::Url;

use crate::config::parse_absolute;
use crate::error::{BrowserError, Result};

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    /// Method name as sent on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One request/response hop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpOutcome {
    location: Url,
    method: Method,
    status: u16,
    reason: String,
    elapsed: Duration,
}

impl HttpOutcome {
    /// Record a hop.
    ///
    /// # Errors
    /// [`BrowserError::RelativeLocation`] if `location` is not absolute.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use pagewalker::navigation::{HttpOutcome, Method};
    ///
    /// let hop = HttpOutcome::new("http://localhost/", Method::Get, 302, "Found", Duration::ZERO).unwrap();
    /// assert_eq!(hop.status(), 302);
    /// assert!(HttpOutcome::new("/relative", Method::Get, 200, "OK", Duration::ZERO).is_err());
    /// ```
    pub fn new(
        location: &str,
        method: Method,
        status: u16,
        reason: impl Into<String>,
        elapsed: Duration,
    ) -> Result<Self> {
        Ok(Self::from_url(
            parse_absolute(location)?,
            method,
            status,
            reason,
            elapsed,
        ))
    }

    pub(crate) fn from_url(
        location: Url,
        method: Method,
        status: u16,
        reason: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            location,
            method,
            status,
            reason: reason.into(),
            elapsed,
        }
    }

    #[must_use]
    pub fn location(&self) -> &Url {
        &self.location
    }

    #[must_use]
    pub fn method(&self) -> Method {
        self.method
    }

    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reason phrase, e.g. `Found`.
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Time between sending the request and receiving the full response.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl fmt::Display for HttpOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} -> {} {} ({} ms)",
            self.method,
            self.location,
            self.status,
            self.reason,
            self.elapsed.as_millis()
        )
    }
}

/// Ordered, non-empty history of one navigation: the initial request plus
/// every followed redirect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResult {
    outcomes: Vec<HttpOutcome>,
    total_elapsed: Duration,
}

impl HttpResult {
    /// Build a result from recorded hops.
    ///
    /// # Errors
    /// [`BrowserError::EmptyResult`] if `outcomes` is empty.
    pub fn new(outcomes: Vec<HttpOutcome>) -> Result<Self> {
        if outcomes.is_empty() {
            return Err(BrowserError::EmptyResult);
        }
        let total_elapsed = outcomes.iter().map(HttpOutcome::elapsed).sum();
        Ok(Self {
            outcomes,
            total_elapsed,
        })
    }

    /// Every hop in request order.
    #[must_use]
    pub fn outcomes(&self) -> &[HttpOutcome] {
        &self.outcomes
    }

    /// The last hop.
    #[must_use]
    pub fn final_outcome(&self) -> &HttpOutcome {
        // Non-empty by construction.
        &self.outcomes[self.outcomes.len() - 1]
    }

    /// Location of the last hop.
    #[must_use]
    pub fn final_location(&self) -> &Url {
        self.final_outcome().location()
    }

    /// Status code of the last hop.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.final_outcome().status()
    }

    /// Number of redirects followed.
    #[must_use]
    pub fn redirect_count(&self) -> usize {
        self.outcomes.len() - 1
    }

    /// Sum of the elapsed time of every hop.
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hop(location: &str, status: u16, millis: u64) -> HttpOutcome {
        HttpOutcome::new(location, Method::Get, status, "", Duration::from_millis(millis)).unwrap()
    }

    #[test]
    fn test_total_elapsed_is_sum() {
        let result = HttpResult::new(vec![
            hop("http://h/a", 302, 10),
            hop("http://h/b", 301, 20),
            hop("http://h/c", 200, 30),
        ])
        .unwrap();
        assert_eq!(result.total_elapsed(), Duration::from_millis(60));
        assert_eq!(result.status(), 200);
        assert_eq!(result.final_location().as_str(), "http://h/c");
        assert_eq!(result.redirect_count(), 2);
    }

    #[test]
    fn test_empty_result_is_error() {
        assert!(matches!(HttpResult::new(Vec::new()), Err(BrowserError::EmptyResult)));
    }

    #[test]
    fn test_relative_outcome_is_error() {
        let result = HttpOutcome::new("home/index", Method::Post, 200, "OK", Duration::ZERO);
        assert!(matches!(result, Err(BrowserError::RelativeLocation(_))));
    }

    #[test]
    fn test_display() {
        let outcome = HttpOutcome::new(
            "http://h/login",
            Method::Post,
            303,
            "See Other",
            Duration::from_millis(12),
        )
        .unwrap();
        assert_eq!(outcome.to_string(), "POST http://h/login -> 303 See Other (12 ms)");
    }
}
