//! Location validation strategies.
//!
//! Decide whether a page is "on" a location. Every validator rejects
//! relative locations with [`BrowserError::RelativeLocation`](crate::BrowserError::RelativeLocation)
//! instead of comparing relative strings.

mod component;
mod pattern;

pub use component::{
    ComparisonFormat, ComponentValidator, RelaxedLocationValidator, StrictLocationValidator,
    UriParts,
};
pub use pattern::{CompositeLocationValidator, RegexLocationValidator};

use crate::error::Result;

/// Compares a candidate location with one expected location.
pub trait LocationValidator {
    fn matches(&self, candidate: &str, expected: &str) -> Result<bool>;
}

/// Compares a candidate location with a list of patterns.
pub trait PatternValidator {
    /// True if any pattern matches.
    fn matches_any<S: AsRef<str>>(&self, candidate: &str, patterns: &[S]) -> Result<bool>;
}

/// What a page model checks its final location against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// No check.
    None,
    /// Relaxed match against the declared location.
    #[default]
    UriOnly,
    /// Match against the declared patterns.
    RegexOnly,
    /// Either of the above.
    All,
}

/// Location check requested by a page model.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LocationValidation {
    mode: ValidationMode,
    patterns: Vec<String>,
}

impl LocationValidation {
    /// Skip location validation.
    #[must_use]
    pub fn none() -> Self {
        Self {
            mode: ValidationMode::None,
            patterns: Vec::new(),
        }
    }

    /// Relaxed match against the declared location.
    #[must_use]
    pub fn uri_only() -> Self {
        Self::default()
    }

    /// Match against patterns only.
    #[must_use]
    pub fn regex_only<S: Into<String>>(patterns: impl IntoIterator<Item = S>) -> Self {
        Self {
            mode: ValidationMode::RegexOnly,
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    /// Accept either the declared location or any pattern.
    #[must_use]
    pub fn all<S: Into<String>>(patterns: impl IntoIterator<Item = S>) -> Self {
        Self {
            mode: ValidationMode::All,
            patterns: patterns.into_iter().map(Into::into).collect(),
        }
    }

    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    #[must_use]
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Check an absolute location.
    pub fn validate(&self, candidate: &str, expected: Option<&str>) -> Result<bool> {
        CompositeLocationValidator::new(self.mode).validate(candidate, expected, self.patterns.as_slice())
    }

    /// Human-readable description of what is accepted.
    #[must_use]
    pub fn describe(&self, expected: Option<&str>) -> String {
        let mut accepted: Vec<String> = Vec::new();
        if matches!(self.mode, ValidationMode::UriOnly | ValidationMode::All) {
            accepted.extend(expected.map(str::to_string));
        }
        if matches!(self.mode, ValidationMode::RegexOnly | ValidationMode::All) {
            accepted.extend(self.patterns.iter().map(|p| format!("/{p}/")));
        }
        if accepted.is_empty() {
            "any location".to_string()
        } else {
            accepted.join(" or ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_uri_only() {
        let validation = LocationValidation::default();
        assert_eq!(validation.mode(), ValidationMode::UriOnly);
        assert!(validation.validate("http://h/a/", Some("http://h/a")).unwrap());
        assert!(!validation.validate("http://h/b", Some("http://h/a")).unwrap());
        assert!(validation.validate("http://h/b", None).unwrap());
    }

    #[test]
    fn test_describe() {
        let validation = LocationValidation::all(["^http://h/$"]);
        assert_eq!(
            validation.describe(Some("http://h/home/index")),
            "http://h/home/index or /^http://h/$/"
        );
        assert_eq!(LocationValidation::none().describe(None), "any location");
    }
}
