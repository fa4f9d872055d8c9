//! Component-wise location comparison.

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use url::Url;

use super::LocationValidator;
use crate::config::parse_absolute;
use crate::error::Result;

/// Which parts of a location take part in a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UriParts {
    /// Scheme, host and port.
    pub authority: bool,
    pub path: bool,
    pub query: bool,
}

impl UriParts {
    /// Scheme, host, port, path and query.
    pub const ALL: UriParts = UriParts {
        authority: true,
        path: true,
        query: true,
    };

    /// Scheme, host, port and path.
    pub const WITHOUT_QUERY: UriParts = UriParts {
        authority: true,
        path: true,
        query: false,
    };
}

/// Whether percent-escapes are compared as-is or decoded first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComparisonFormat {
    #[default]
    Escaped,
    Unescaped,
}

/// Configurable comparison of selected location components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentValidator {
    parts: UriParts,
    case_sensitive: bool,
    format: ComparisonFormat,
    folder_equivalence: bool,
}

impl ComponentValidator {
    /// Case-sensitive, escaped comparison of the given parts.
    #[must_use]
    pub fn new(parts: UriParts) -> Self {
        Self {
            parts,
            case_sensitive: true,
            format: ComparisonFormat::Escaped,
            folder_equivalence: false,
        }
    }

    /// Every component, exact.
    #[must_use]
    pub fn strict() -> Self {
        Self::new(UriParts::ALL)
    }

    /// Query ignored, case-insensitive, folder-equivalent paths.
    #[must_use]
    pub fn relaxed() -> Self {
        Self::new(UriParts::WITHOUT_QUERY)
            .with_case_sensitive(false)
            .with_format(ComparisonFormat::Unescaped)
            .with_folder_equivalence(true)
    }

    #[must_use]
    pub fn with_case_sensitive(mut self, case_sensitive: bool) -> Self {
        self.case_sensitive = case_sensitive;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: ComparisonFormat) -> Self {
        self.format = format;
        self
    }

    /// Treat `/a/b` and `/a/b/` as the same folder unless the last segment
    /// looks like a file name.
    #[must_use]
    pub fn with_folder_equivalence(mut self, enabled: bool) -> Self {
        self.folder_equivalence = enabled;
        self
    }

    /// Comparison key of a location under this configuration.
    fn key(&self, url: &Url) -> String {
        let mut key = String::new();

        if self.parts.authority {
            key.push_str(url.scheme());
            key.push_str("://");
            key.push_str(url.host_str().unwrap_or_default());
            if let Some(port) = url.port_or_known_default() {
                key.push_str(&format!(":{port}"));
            }
        }

        if self.parts.path {
            let mut path = self.format(url.path()).into_owned();
            if self.folder_equivalence && !path.ends_with('/') {
                let last_segment = path.rsplit('/').next().unwrap_or_default();
                if !last_segment.contains('.') {
                    path.push('/');
                }
            }
            key.push_str(&path);
        }

        if self.parts.query {
            if let Some(query) = url.query() {
                key.push('?');
                key.push_str(&self.format(query));
            }
        }

        if self.case_sensitive {
            key
        } else {
            key.to_lowercase()
        }
    }

    fn format<'a>(&self, component: &'a str) -> Cow<'a, str> {
        match self.format {
            ComparisonFormat::Escaped => Cow::Borrowed(component),
            ComparisonFormat::Unescaped => percent_decode_str(component).decode_utf8_lossy(),
        }
    }
}

impl LocationValidator for ComponentValidator {
    fn matches(&self, candidate: &str, expected: &str) -> Result<bool> {
        let candidate = parse_absolute(candidate)?;
        let expected = parse_absolute(expected)?;
        Ok(self.key(&candidate) == self.key(&expected))
    }
}

/// Exact match on scheme, host, port, path and query.
#[derive(Debug, Clone, Copy, Default)]
pub struct StrictLocationValidator;

impl LocationValidator for StrictLocationValidator {
    fn matches(&self, candidate: &str, expected: &str) -> Result<bool> {
        ComponentValidator::strict().matches(candidate, expected)
    }
}

/// Case-insensitive match ignoring the query, with folder equivalence.
///
/// # Examples
/// ```
/// use pagewalker::location::{LocationValidator, RelaxedLocationValidator};
///
/// let validator = RelaxedLocationValidator;
/// assert!(validator.matches("http://h/a/b", "http://H/a/b/?x=1").unwrap());
/// assert!(!validator.matches("http://h/a/b", "http://h/a/b/c.txt").unwrap());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct RelaxedLocationValidator;

impl LocationValidator for RelaxedLocationValidator {
    fn matches(&self, candidate: &str, expected: &str) -> Result<bool> {
        ComponentValidator::relaxed().matches(candidate, expected)
    }
}
