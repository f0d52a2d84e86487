//! Store abstraction.
//!
//! A [`Store`] owns the connection and knows its [`Dialect`]. The table layer
//! renders statements against that dialect and hands bind values over as
//! [`Param`]s; it never formats a value into SQL text.

mod sqlite;

pub use sqlite::SqliteStore;

use crate::ddl::Dialect;
use crate::error::Result;
use crate::types::BindKind;
use crate::value::{Row, Value};

/// A bind value together with its binding kind.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// How the value is bound.
    pub kind: BindKind,
    /// The value, already coerced to `kind`.
    pub value: Value,
}

impl Param {
    /// Creates a parameter, coercing `value` to `kind`.
    #[must_use]
    pub fn bind(kind: BindKind, value: Value) -> Self {
        Self {
            kind,
            value: kind.coerce(value),
        }
    }
}

/// Persistence primitives consumed by the table layer.
#[allow(async_fn_in_trait)]
pub trait Store: Send + Sync {
    /// SQL dialect spoken by this store.
    type Dialect: Dialect;

    /// Returns the dialect.
    fn dialect(&self) -> &Self::Dialect;

    /// Returns the prefix prepended to every table name.
    fn prefix(&self) -> &str;

    /// Returns the physical name for a base table name.
    fn table_name(&self, base: &str) -> String {
        format!("{}{base}", self.prefix())
    }

    /// Executes a schema statement.
    async fn execute_ddl(&self, sql: &str) -> Result<()>;

    /// Inserts one row and returns the generated key.
    ///
    /// An empty `values` slice inserts a row made only of defaults.
    async fn insert(&self, table: &str, values: &[(&str, Param)]) -> Result<i64>;

    /// Updates rows matching every `filter` entry by equality and returns the
    /// affected row count.
    async fn update(
        &self,
        table: &str,
        set: &[(&str, Param)],
        filter: &[(&str, Param)],
    ) -> Result<u64>;

    /// Runs a parameterized query and returns its rows.
    async fn fetch_rows(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>>;

    /// Runs a parameterized query and returns the first column of the first
    /// row, or NULL when there is none.
    async fn fetch_scalar(&self, sql: &str, params: &[Param]) -> Result<Value>;

    /// Runs a parameterized statement and returns the affected row count.
    async fn execute(&self, sql: &str, params: &[Param]) -> Result<u64>;
}
