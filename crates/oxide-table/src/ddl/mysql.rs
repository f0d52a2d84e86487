//! MySQL/MariaDB dialect.
//!
//! This is the canonical rendering: every column carries `NOT NULL`, the
//! `ON UPDATE` and `AUTO_INCREMENT` markers are emitted inline, and a single
//! table-level `PRIMARY KEY` clause lists every primary column.

use crate::error::Result;
use crate::schema::Schema;
use crate::types::{BindKind, LogicalType};

use super::Dialect;

/// MySQL-family dialect.
#[derive(Debug, Clone, Default)]
pub struct MySqlDialect {
    table_options: Option<String>,
}

impl MySqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends table options such as
    /// `DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci` to created tables.
    #[must_use]
    pub fn with_table_options(mut self, options: impl Into<String>) -> Self {
        self.table_options = Some(options.into());
        self
    }
}

impl Dialect for MySqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn type_name(&self, logical_type: LogicalType) -> &'static str {
        logical_type.mysql_name()
    }

    fn placeholder(&self, kind: BindKind) -> &'static str {
        kind.format_token()
    }

    fn auto_increment_keyword(&self) -> &'static str {
        "AUTO_INCREMENT"
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{name}`")
    }

    fn create_table(&self, table: &str, schema: &Schema) -> Result<Vec<String>> {
        let mut definitions: Vec<String> = schema
            .all_columns()
            .iter()
            .map(|c| self.column_definition(c))
            .collect();

        let primary: Vec<String> = schema
            .primary_key()
            .into_iter()
            .map(|c| self.quote_identifier(c))
            .collect();
        definitions.push(format!("PRIMARY KEY ({})", primary.join(",")));

        let mut sql = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            self.quote_identifier(table),
            definitions.join(", ")
        );

        if let Some(ref options) = self.table_options {
            sql.push(' ');
            sql.push_str(options);
        }

        Ok(vec![sql])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ColumnDef;

    fn reset_schema() -> Schema {
        Schema::define(
            "reset_password",
            vec![
                ColumnDef::new("id", LogicalType::Int)
                    .primary_key()
                    .auto_increment(),
                ColumnDef::new("user_id", LogicalType::String),
                ColumnDef::new("token", LogicalType::String).unique(),
                ColumnDef::new("datetime", LogicalType::DateTime)
                    .default_expr("CURRENT_TIMESTAMP")
                    .on_update("CURRENT_TIMESTAMP"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_create_table() {
        let sql = MySqlDialect::new()
            .create_table("wp_reset_password", &reset_schema())
            .unwrap();

        assert_eq!(sql.len(), 1);
        assert_eq!(
            sql[0],
            "CREATE TABLE IF NOT EXISTS `wp_reset_password` (\
             `id` bigint(20) NOT NULL AUTO_INCREMENT, \
             `user_id` varchar(255) NOT NULL, \
             `token` varchar(255) NOT NULL UNIQUE, \
             `datetime` datetime NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP, \
             PRIMARY KEY (`id`))"
        );
    }

    #[test]
    fn test_composite_primary_key() {
        let schema = Schema::define(
            "memberships",
            vec![
                ColumnDef::new("user_id", LogicalType::Int).primary_key(),
                ColumnDef::new("group_id", LogicalType::Int).primary_key(),
                ColumnDef::new("meta", LogicalType::OpaqueBlob),
            ],
        )
        .unwrap();

        let sql = MySqlDialect::new().create_table("memberships", &schema).unwrap();
        assert!(sql[0].contains("`meta` MEDIUMTEXT NOT NULL"));
        assert!(sql[0].ends_with("PRIMARY KEY (`user_id`,`group_id`))"));
    }

    #[test]
    fn test_table_options() {
        let dialect =
            MySqlDialect::new().with_table_options("DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci");
        let sql = dialect.create_table("t", &reset_schema()).unwrap();
        assert!(sql[0].ends_with(") DEFAULT CHARSET=utf8mb4 COLLATE=utf8mb4_unicode_ci"));
    }

    #[test]
    fn test_placeholders() {
        let dialect = MySqlDialect::new();
        assert_eq!(dialect.placeholder(BindKind::Integer), "%d");
        assert_eq!(dialect.placeholder(BindKind::Float), "%f");
        assert_eq!(dialect.placeholder(BindKind::Text), "%s");
    }
}
