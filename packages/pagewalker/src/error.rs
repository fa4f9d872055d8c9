//! Error types for the browser.
//!
//! Every failure kind has its own variant so test code can match on exactly
//! the condition it cares about (a status mismatch is never reported as a
//! location mismatch and vice versa).

use thiserror::Error;

use crate::navigation::{HttpOutcome, HttpResult};
use crate::registry::{ElementKind, ElementType, TagDescriptor};

/// Boxed error returned by a [`Transport`](crate::navigation::Transport).
pub type TransportError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Main error type for the browser library.
#[derive(Debug, Error)]
pub enum BrowserError {
    /// No response was obtained for a request.
    #[error("Request to {location} failed after {} hop(s): {source}", .history.len())]
    Transport {
        location: String,
        history: Vec<HttpOutcome>,
        #[source]
        source: TransportError,
    },

    /// The final response carried a different status code than expected.
    #[error("Expected status {expected} but {} returned {actual}", .result.final_location())]
    UnexpectedStatus {
        expected: u16,
        actual: u16,
        result: HttpResult,
    },

    /// The final location is not acceptable for the requested page.
    #[error("Expected to end up at {expected} but ended up at {actual}")]
    UnexpectedLocation {
        expected: String,
        actual: String,
        result: HttpResult,
    },

    /// A node does not match any descriptor of the wrapper it was built for.
    #[error(
        "Element {element} cannot be represented as {target}; supported tags: {}",
        format_descriptors(.descriptors)
    )]
    InvalidElement {
        element: String,
        target: ElementType,
        descriptors: Vec<TagDescriptor>,
    },

    /// A singular lookup found nothing.
    #[error("No {target} found matching {criterion}")]
    ElementNotFound {
        target: ElementType,
        criterion: String,
    },

    /// A singular lookup found more than one element.
    #[error("Expected one {target} matching {criterion} but found {count}")]
    MultipleElements {
        target: ElementType,
        criterion: String,
        count: usize,
    },

    /// More than one concrete wrapper kind claims the same node.
    #[error(
        "Element {element} matches several element kinds: {}",
        .candidates.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    )]
    AmbiguousType {
        element: String,
        candidates: Vec<ElementKind>,
    },

    /// A wrapper type has no tag descriptors registered.
    #[error("No tag descriptors registered for {0}")]
    NoDescriptors(ElementType),

    /// A dynamic lookup did not find a member with this key.
    #[error("No element with id, name or text '{0}'")]
    MissingMember(String),

    /// The scenario is recognised but deliberately unsupported.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// A location had to be absolute but was relative.
    #[error("Location must be absolute: '{0}'")]
    RelativeLocation(String),

    /// Neither an explicit location nor a declared page location was given.
    #[error("No location given and {0} declares none")]
    MissingLocation(String),

    /// A location could not be parsed.
    #[error("Invalid location '{location}': {source}")]
    InvalidUrl {
        location: String,
        #[source]
        source: url::ParseError,
    },

    /// A structural query could not be parsed.
    #[error("Invalid query '{query}': {message}")]
    InvalidQuery { query: String, message: String },

    /// A location pattern is not a valid regular expression.
    #[error("Invalid location pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The element cannot perform the requested action.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Invalid browser configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A result was built without any outcome.
    #[error("An HTTP result needs at least one outcome")]
    EmptyResult,

    /// The HTTP client could not be created.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// YAML serialization error (CLI reports).
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    /// IO error (file uploads).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BrowserError {
    /// Outcome history attached to a navigation failure, if any.
    #[must_use]
    pub fn history(&self) -> Option<&[HttpOutcome]> {
        match self {
            Self::Transport { history, .. } => Some(history),
            Self::UnexpectedStatus { result, .. } | Self::UnexpectedLocation { result, .. } => {
                Some(result.outcomes())
            }
            _ => None,
        }
    }
}

fn format_descriptors(descriptors: &[TagDescriptor]) -> String {
    descriptors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result type alias for browser operations.
pub type Result<T> = std::result::Result<T, BrowserError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_element_lists_descriptors() {
        let err = BrowserError::InvalidElement {
            element: "<div>".to_string(),
            target: ElementType::Kind(ElementKind::CheckBox),
            descriptors: vec![TagDescriptor::with_attribute("input", "type", "checkbox")],
        };
        assert_eq!(
            err.to_string(),
            "Element <div> cannot be represented as CheckBox; supported tags: input[@type='checkbox']"
        );
    }

    #[test]
    fn test_ambiguous_type_names_candidates() {
        let err = BrowserError::AmbiguousType {
            element: "<input>".to_string(),
            candidates: vec![ElementKind::TextInput, ElementKind::HiddenInput],
        };
        let message = err.to_string();
        assert!(message.contains("TextInput"));
        assert!(message.contains("HiddenInput"));
    }

    #[test]
    fn test_not_found_names_criterion() {
        let err = BrowserError::ElementNotFound {
            target: ElementType::Kind(ElementKind::TextInput),
            criterion: "name='user'".to_string(),
        };
        assert_eq!(err.to_string(), "No TextInput found matching name='user'");
        assert!(err.history().is_none());
    }
}
