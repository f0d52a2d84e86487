//! # oxide-table
//!
//! A schema-driven table layer: declare a table once, then insert, update,
//! delete and query it through a small filter DSL without writing SQL.
//!
//! This crate provides:
//! - `Schema` and `ColumnDef` for declaring tables (in code or from JSON)
//! - Dialect-aware `CREATE TABLE IF NOT EXISTS` synthesis
//! - `Filters` for loosely structured, injection-safe WHERE clauses
//! - A value codec storing composite values as JSON text
//! - `Table` for CRUD against any `Store`, with `SqliteStore` bundled
//!
//! ## Quick Start
//!
//! ```ignore
//! use oxide_table::{ColumnDef, Data, Filters, LogicalType, Schema, SqliteStore, Table};
//!
//! async fn example() -> oxide_table::Result<()> {
//!     let store = SqliteStore::connect("sqlite:app.db").await?.with_prefix("wp_");
//!     let schema = Schema::define(
//!         "tokens",
//!         vec![
//!             ColumnDef::new("id", LogicalType::Int).primary_key().auto_increment(),
//!             ColumnDef::new("token", LogicalType::String).unique(),
//!             ColumnDef::new("ts", LogicalType::DateTime),
//!         ],
//!     )?;
//!
//!     // Creates `wp_tokens` if it does not exist yet
//!     let tokens = Table::new(store, schema).await?;
//!
//!     let id = tokens.insert(&Data::new().set("token", "abc")).await?;
//!     let row = tokens.get_row(&Filters::new().eq("token", "abc")).await?;
//!     tokens.delete(&Filters::new().eq("id", id)).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Filters
//!
//! Filters map column names to either a bare value (equality) or a
//! `{value, compare}` pair. They can be built in code or deserialized:
//!
//! ```ignore
//! let filters: Filters = serde_json::from_str(
//!     r#"{"user_id": "alice", "datetime": {"value": "2024-01-01 00:00:00", "compare": ">"}}"#,
//! )?;
//! let recent = tokens.query(&filters, 0, 0).await?;
//! ```
//!
//! Unknown columns are ignored and unknown operators fall back to `=`.
//! `delete` refuses to run without at least one recognized filter.

pub mod codec;
pub mod ddl;
pub mod error;
pub mod query;
pub mod schema;
pub mod store;
pub mod table;
pub mod types;
pub mod value;

pub use codec::DecodePolicy;
pub use error::{Result, TableError};
pub use query::{CompareOp, FilterCondition, Filters};
pub use schema::{ColumnDef, Schema};
pub use store::{SqliteStore, Store};
pub use table::Table;
pub use types::{BindKind, LogicalType};
pub use value::{Data, Row, Value};
