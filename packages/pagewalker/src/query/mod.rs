//! Structural queries.
//!
//! A narrow XPath-like language that is just expressive enough for form and
//! element lookup: one axis step, a name test, and equality predicates with
//! `lower-case()` folding built into the query itself.

mod ast;
mod builder;
mod eval;
mod parser;

pub use ast::{quote, Axis, Expr, NodeTest, Operand, Query};
pub use builder::{Case, QueryBuilder};
pub use eval::evaluate;
pub use parser::parse_query;
