//! Pattern-based and composite location validators.

use std::collections::HashMap;
use std::sync::{LazyLock, Mutex, PoisonError};

use regex::Regex;

use super::component::RelaxedLocationValidator;
use super::{LocationValidator, PatternValidator, ValidationMode};
use crate::config::parse_absolute;
use crate::error::Result;

/// Compiled location patterns, keyed by source.
static COMPILED: LazyLock<Mutex<HashMap<String, Regex>>> = LazyLock::new(Mutex::default);

/// Compile `pattern` once per process.
fn compiled(pattern: &str) -> Result<Regex> {
    let mut cache = COMPILED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(regex) = cache.get(pattern) {
        return Ok(regex.clone());
    }
    let regex = Regex::new(pattern)?;
    cache.insert(pattern.to_string(), regex.clone());
    Ok(regex)
}

/// Matches the full location string against regular expressions.
///
/// Used when one page can legitimately live at several locations, such as
/// `/` and `/home/index`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexLocationValidator;

impl PatternValidator for RegexLocationValidator {
    fn matches_any<S: AsRef<str>>(&self, candidate: &str, patterns: &[S]) -> Result<bool> {
        let candidate = parse_absolute(candidate)?;
        for pattern in patterns {
            if compiled(pattern.as_ref())?.is_match(candidate.as_str()) {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl LocationValidator for RegexLocationValidator {
    /// `expected` is a single pattern here, not a location.
    fn matches(&self, candidate: &str, expected: &str) -> Result<bool> {
        self.matches_any(candidate, &[expected])
    }
}

/// Relaxed folder matching combined with pattern matching.
///
/// # Examples
/// ```
/// use pagewalker::location::{CompositeLocationValidator, ValidationMode};
///
/// let validator = CompositeLocationValidator::new(ValidationMode::All);
/// let patterns = [r"^http://h/(home/index)?$"];
/// assert!(validator.validate("http://h/", Some("http://h/home/index"), &patterns).unwrap());
/// assert!(validator.validate("http://h/home/index/", Some("http://h/home/index"), &patterns).unwrap());
/// assert!(!validator.validate("http://h/about", Some("http://h/home/index"), &patterns).unwrap());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct CompositeLocationValidator {
    mode: ValidationMode,
}

impl CompositeLocationValidator {
    #[must_use]
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }

    #[must_use]
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Validate `candidate` under the configured mode.
    ///
    /// A missing expected location or an empty pattern list places no
    /// constraint on its half. Under [`ValidationMode::All`] either half
    /// accepting is enough.
    pub fn validate<S: AsRef<str>>(
        &self,
        candidate: &str,
        expected: Option<&str>,
        patterns: &[S],
    ) -> Result<bool> {
        let by_location = || -> Result<Option<bool>> {
            expected
                .map(|expected| self.matches(candidate, expected))
                .transpose()
        };
        let by_pattern = || -> Result<Option<bool>> {
            if patterns.is_empty() {
                Ok(None)
            } else {
                self.matches_any(candidate, patterns).map(Some)
            }
        };

        let accepted = match self.mode {
            ValidationMode::None => return Ok(true),
            ValidationMode::UriOnly => by_location()?,
            ValidationMode::RegexOnly => by_pattern()?,
            ValidationMode::All => match (by_location()?, by_pattern()?) {
                (Some(location), Some(pattern)) => Some(location || pattern),
                (location, pattern) => location.or(pattern),
            },
        };
        Ok(accepted.unwrap_or(true))
    }
}

impl LocationValidator for CompositeLocationValidator {
    fn matches(&self, candidate: &str, expected: &str) -> Result<bool> {
        RelaxedLocationValidator.matches(candidate, expected)
    }
}

impl PatternValidator for CompositeLocationValidator {
    fn matches_any<S: AsRef<str>>(&self, candidate: &str, patterns: &[S]) -> Result<bool> {
        RegexLocationValidator.matches_any(candidate, patterns)
    }
}
