//! HTML parsing and tree navigation.

mod document;
mod utils;

pub use document::{Descendants, Document, ElementData, NodeData, NodeId};
pub use utils::{find_by_tag, has_tag, normalize_whitespace, title};
