//! Pagewalker - A page-object browser for testing HTTP applications.
//!
//! This crate issues requests, follows redirects while recording every hop,
//! parses the final response and exposes typed wrappers over the document's
//! elements, so test code can drive a web application without touching HTTP
//! or markup directly.
//!
//! # Example
//!
//! ```
//! use pagewalker::elements::{Form, TextInput};
//! use pagewalker::Page;
//!
//! let page = Page::parse(
//!     "http://localhost/login",
//!     r#"<form method="post"><input name="user"></form>"#,
//! )?;
//! let user: TextInput = page.find().by_name("user")?;
//! user.set_value("alice")?;
//!
//! let form: Form = page.find().single()?;
//! let request = form.request(None)?;
//! assert_eq!(request.url.as_str(), "http://localhost/login");
//! # Ok::<(), pagewalker::BrowserError>(())
//! ```
//!
//! # Architecture
//!
//! - [`html`]: Owned document tree built from the HTML parser
//! - [`registry`]: Tag descriptors, element kinds and kind resolution
//! - [`query`]: Structural query language and query builder
//! - [`finder`]: Element lookup on a page or below/above an element
//! - [`elements`]: Element wrappers, form controls and forms
//! - [`navigation`]: Browser, transport, outcome history and pages
//! - [`location`]: Final location validators
//! - [`dynamic`]: Late-bound lookup by id, name or text
//! - [`config`]: Configuration constants and browser configuration
//! - [`error`]: Error types and Result alias
//! - [`cli`]: Command-line page inspector

pub mod cli;
pub mod config;
pub mod dynamic;
pub mod elements;
pub mod error;
pub mod finder;
pub mod html;
pub mod location;
pub mod navigation;
pub mod query;
pub mod registry;

#[cfg(test)]
mod testing;

// Re-export commonly used items
pub use config::BrowserConfig;
pub use dynamic::DynamicPage;
pub use error::{BrowserError, Result};
pub use finder::{By, ElementFinder};
pub use location::{LocationValidation, ValidationMode};
pub use navigation::{Browser, FileUpload, HttpOutcome, HttpResult, Page, PageModel};
pub use registry::TypeRegistry;
