//! Element type registry.
//!
//! Every wrapper kind declares the tags it can represent as
//! [`TagDescriptor`]s. The registry is an explicit table built at startup;
//! queries and type resolution read descriptor sets from it.

mod config;
mod core;
mod descriptor;
mod resolver;
mod types;

pub use config::{create_standard_registry, BUTTON_INPUT_TYPES, TEXT_INPUT_TYPES};
pub use core::{Registration, TypeRegistry};
pub use descriptor::{TagDescriptor, WILDCARD_TAG};
pub use resolver::TypeResolver;
pub use types::{ElementGroup, ElementKind, ElementType};
