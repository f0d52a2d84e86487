//! SQLite dialect.
//!
//! SQLite differs from the canonical rendering in three ways:
//! - `AUTOINCREMENT` is only accepted inline on a sole `INTEGER PRIMARY KEY`,
//!   so an auto-increment column carries its key inline and the table-level
//!   key clause is dropped.
//! - There is no `ON UPDATE`; each such column gets an `AFTER UPDATE`
//!   trigger that refreshes it unless the update set it explicitly.
//! - Inserting a row that omits a `NOT NULL` column without a default fails,
//!   so those columns get an implicit default for their type.

use crate::error::{Result, TableError};
use crate::schema::{ColumnDef, Schema};
use crate::types::{BindKind, LogicalType};

use super::Dialect;

/// SQLite dialect.
#[derive(Debug, Clone, Default)]
pub struct SqliteDialect;

impl SqliteDialect {
    /// Creates a new SQLite dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Default used for `NOT NULL` columns that declare none.
    fn implicit_default(logical_type: LogicalType) -> &'static str {
        match logical_type {
            LogicalType::Int | LogicalType::Float => "0",
            LogicalType::String | LogicalType::OpaqueBlob => "''",
            LogicalType::DateTime | LogicalType::Timestamp => "CURRENT_TIMESTAMP",
        }
    }

    /// Generates the trigger emulating `ON UPDATE` for one column.
    fn on_update_trigger_sql(&self, table: &str, column: &str, expr: &str) -> String {
        let table_q = self.quote_identifier(table);
        let column_q = self.quote_identifier(column);
        format!(
            "CREATE TRIGGER IF NOT EXISTS {} AFTER UPDATE ON {table_q} FOR EACH ROW \
             WHEN NEW.{column_q} IS OLD.{column_q} \
             BEGIN UPDATE {table_q} SET {column_q} = {expr} WHERE rowid = NEW.rowid; END",
            self.quote_identifier(&format!("{table}_{column}_on_update"))
        )
    }
}

impl Dialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn type_name(&self, logical_type: LogicalType) -> &'static str {
        logical_type.sqlite_name()
    }

    fn placeholder(&self, _kind: BindKind) -> &'static str {
        "?"
    }

    fn auto_increment_keyword(&self) -> &'static str {
        "AUTOINCREMENT"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("\"{name}\"")
    }

    fn column_definition(&self, column: &ColumnDef) -> String {
        let mut parts = vec![
            self.quote_identifier(&column.name),
            self.type_name(column.logical_type).to_string(),
            "NOT NULL".to_string(),
        ];

        if column.auto_increment {
            parts.push("PRIMARY KEY".to_string());
            parts.push(self.auto_increment_keyword().to_string());
            return parts.join(" ");
        }

        match column.default {
            Some(ref default) => parts.push(format!("DEFAULT {default}")),
            None if !column.primary_key => parts.push(format!(
                "DEFAULT {}",
                Self::implicit_default(column.logical_type)
            )),
            None => {}
        }

        if column.unique {
            parts.push("UNIQUE".to_string());
        }

        parts.join(" ")
    }

    fn create_table(&self, table: &str, schema: &Schema) -> Result<Vec<String>> {
        let primary_key = schema.primary_key();

        if let Some(auto) = schema.auto_increment_column() {
            if primary_key.len() > 1 {
                return Err(TableError::Configuration(format!(
                    "SQLite cannot auto-increment '{}' inside a composite primary key",
                    auto.name
                )));
            }
        }

        let mut sql = String::from("CREATE TABLE IF NOT EXISTS ");
        sql.push_str(&self.quote_identifier(table));
        sql.push_str(" (\n");

        let col_defs: Vec<String> = schema
            .all_columns()
            .iter()
            .map(|c| self.column_definition(c))
            .collect();
        sql.push_str("  ");
        sql.push_str(&col_defs.join(",\n  "));

        // An auto-increment column already declared the key inline.
        if schema.auto_increment_column().is_none() {
            let quoted: Vec<String> = primary_key
                .iter()
                .map(|c| self.quote_identifier(c))
                .collect();
            sql.push_str(",\n  PRIMARY KEY (");
            sql.push_str(&quoted.join(", "));
            sql.push(')');
        }

        sql.push_str("\n)");

        let mut statements = vec![sql];
        for column in schema.all_columns() {
            if let Some(ref expr) = column.on_update {
                statements.push(self.on_update_trigger_sql(table, &column.name, expr));
            }
        }

        Ok(statements)
    }
}
