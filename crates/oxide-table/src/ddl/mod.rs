//! Schema synchronization statements.
//!
//! Each dialect knows how to render a [`Schema`] as idempotent
//! `CREATE ... IF NOT EXISTS` statements and how placeholders look in its
//! parameterized SQL.

mod mysql;
mod sqlite;

pub use mysql::MySqlDialect;
pub use sqlite::SqliteDialect;

use crate::error::{Result, TableError};
use crate::schema::{ColumnDef, Schema};
use crate::types::{BindKind, LogicalType};

/// Trait for engine-specific SQL rendering.
pub trait Dialect: Send + Sync {
    /// Returns the dialect name.
    fn name(&self) -> &'static str;

    /// Returns the storage type for a logical type.
    fn type_name(&self, logical_type: LogicalType) -> &'static str;

    /// Returns the parameter placeholder for a binding kind.
    fn placeholder(&self, kind: BindKind) -> &'static str;

    /// Returns the auto-increment keyword for this dialect.
    fn auto_increment_keyword(&self) -> &'static str;

    /// Quotes an identifier (table name, column name, ...).
    fn quote_identifier(&self, name: &str) -> String;

    /// Generates a column definition in canonical order: type, `NOT NULL`,
    /// `DEFAULT`, `ON UPDATE`, `UNIQUE`, auto-increment.
    fn column_definition(&self, column: &ColumnDef) -> String {
        let mut parts = vec![
            self.quote_identifier(&column.name),
            self.type_name(column.logical_type).to_string(),
            "NOT NULL".to_string(),
        ];

        if let Some(ref default) = column.default {
            parts.push(format!("DEFAULT {default}"));
        }

        if let Some(ref on_update) = column.on_update {
            parts.push(format!("ON UPDATE {on_update}"));
        }

        if column.unique {
            parts.push("UNIQUE".to_string());
        }

        if column.auto_increment {
            parts.push(self.auto_increment_keyword().to_string());
        }

        parts.join(" ")
    }

    /// Generates every statement needed to create `table` from `schema`.
    ///
    /// The first statement is always the `CREATE TABLE IF NOT EXISTS`; any
    /// further statements are supporting objects (e.g. triggers). All of them
    /// are safe to run repeatedly.
    fn create_table(&self, table: &str, schema: &Schema) -> Result<Vec<String>>;
}

/// Returns the `CREATE TABLE IF NOT EXISTS` statement for `schema`.
///
/// ```rust
/// use oxide_table::ddl::{synthesize_create_statement, MySqlDialect};
/// use oxide_table::{ColumnDef, LogicalType, Schema};
///
/// let schema = Schema::define(
///     "tokens",
///     vec![ColumnDef::new("id", LogicalType::Int).primary_key().auto_increment()],
/// )
/// .unwrap();
///
/// let sql = synthesize_create_statement(&MySqlDialect::new(), "wp_tokens", &schema).unwrap();
/// assert_eq!(
///     sql,
///     "CREATE TABLE IF NOT EXISTS `wp_tokens` (`id` bigint(20) NOT NULL AUTO_INCREMENT, PRIMARY KEY (`id`))"
/// );
/// ```
pub fn synthesize_create_statement<D: Dialect + ?Sized>(
    dialect: &D,
    table: &str,
    schema: &Schema,
) -> Result<String> {
    dialect
        .create_table(table, schema)?
        .into_iter()
        .next()
        .ok_or_else(|| {
            TableError::Configuration(format!("no statements generated for '{table}'"))
        })
}
