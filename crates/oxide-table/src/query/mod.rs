//! Filters and WHERE clause construction.

mod filter;
mod predicate;

pub use filter::{CompareOp, FilterCondition, Filters};
pub use predicate::{build_where, WhereClause};
