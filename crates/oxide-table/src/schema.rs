//! Table schema definitions.
//!
//! A [`Schema`] is declared once by the component that owns the table and is
//! immutable afterwards. Every identifier that ever reaches SQL text comes
//! from here, so definition validates them.

use std::str::FromStr;

use serde::Deserialize;

use crate::error::{Result, TableError};
use crate::types::LogicalType;
use crate::value::deserialize_entries;

/// Definition of one column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Logical column type.
    pub logical_type: LogicalType,
    /// Whether this column is part of the primary key.
    pub primary_key: bool,
    /// Whether this column auto-increments.
    pub auto_increment: bool,
    /// Whether this column has a UNIQUE constraint.
    pub unique: bool,
    /// Raw SQL default expression (e.g. `CURRENT_TIMESTAMP`).
    pub default: Option<String>,
    /// Raw SQL expression applied on update (date/time columns only).
    pub on_update: Option<String>,
}

impl ColumnDef {
    /// Creates a new column definition.
    #[must_use]
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            logical_type,
            primary_key: false,
            auto_increment: false,
            unique: false,
            default: None,
            on_update: None,
        }
    }

    /// Creates a column from a textual type name such as `"int"`.
    pub fn parse(name: impl Into<String>, type_name: &str) -> Result<Self> {
        Ok(Self::new(name, LogicalType::from_str(type_name)?))
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    /// Adds a UNIQUE constraint.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Sets the raw SQL default expression.
    #[must_use]
    pub fn default_expr(mut self, expr: impl Into<String>) -> Self {
        self.default = Some(expr.into());
        self
    }

    /// Sets the raw SQL expression applied on update.
    #[must_use]
    pub fn on_update(mut self, expr: impl Into<String>) -> Self {
        self.on_update = Some(expr.into());
        self
    }
}

/// Declarative column form, as read from JSON.
#[derive(Debug, Deserialize)]
struct RawColumn {
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    auto: bool,
    #[serde(default)]
    unique: bool,
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    on_update: Option<String>,
}

#[derive(Debug)]
struct RawColumns(Vec<(String, RawColumn)>);

impl<'de> Deserialize<'de> for RawColumns {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        deserialize_entries(deserializer).map(Self)
    }
}

/// A validated, immutable table schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    name: String,
    columns: Vec<ColumnDef>,
}

impl Schema {
    /// Defines a schema from its base table name and ordered columns.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Configuration`] when no column is primary, an
    /// auto-increment column is not a primary `int`, more than one column
    /// auto-increments, an `on_update` expression is set on a non date/time
    /// column, a column is declared twice, or an identifier is not a plain
    /// `[A-Za-z_][A-Za-z0-9_]*` name.
    pub fn define(name: impl Into<String>, columns: Vec<ColumnDef>) -> Result<Self> {
        let name = name.into();
        validate_identifier("table", &name)?;

        for (index, column) in columns.iter().enumerate() {
            validate_identifier("column", &column.name)?;

            if columns[..index].iter().any(|c| c.name == column.name) {
                return Err(TableError::Configuration(format!(
                    "column '{}' is declared more than once in '{name}'",
                    column.name
                )));
            }

            if column.auto_increment
                && !(column.primary_key && column.logical_type == LogicalType::Int)
            {
                return Err(TableError::Configuration(format!(
                    "auto-increment column '{}' must be a primary int column",
                    column.name
                )));
            }

            if column.on_update.is_some() && !column.logical_type.is_temporal() {
                return Err(TableError::Configuration(format!(
                    "column '{}' has an ON UPDATE expression but type {}",
                    column.name, column.logical_type
                )));
            }
        }

        if !columns.iter().any(|c| c.primary_key) {
            return Err(TableError::Configuration(format!(
                "table '{name}' has no primary key column"
            )));
        }

        if columns.iter().filter(|c| c.auto_increment).count() > 1 {
            return Err(TableError::Configuration(format!(
                "table '{name}' has more than one auto-increment column"
            )));
        }

        Ok(Self { name, columns })
    }

    /// Defines a schema from the declarative JSON column map.
    ///
    /// ```rust
    /// use oxide_table::Schema;
    ///
    /// let schema = Schema::from_json(
    ///     "reset_password",
    ///     r#"{
    ///         "id": {"type": "int", "auto": true, "primary": true},
    ///         "token": {"type": "string", "unique": true}
    ///     }"#,
    /// )
    /// .unwrap();
    /// assert_eq!(schema.primary_key(), vec!["id"]);
    /// ```
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self> {
        let RawColumns(raw) = serde_json::from_str(json)?;

        let mut columns = Vec::with_capacity(raw.len());
        for (column_name, spec) in raw {
            let mut column = ColumnDef::parse(column_name, &spec.type_name)?;
            column.primary_key = spec.primary;
            column.auto_increment = spec.auto;
            column.unique = spec.unique;
            column.default = spec.default;
            column.on_update = spec.on_update;
            columns.push(column);
        }

        Self::define(name, columns)
    }

    /// Returns the base table name (before any store prefix).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up a column by name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Returns all columns in declared order.
    #[must_use]
    pub fn all_columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Returns the primary key column names in declared order.
    #[must_use]
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Returns the auto-increment column, if any.
    #[must_use]
    pub fn auto_increment_column(&self) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.auto_increment)
    }
}

/// Checks that `name` is a plain SQL identifier.
pub(crate) fn validate_identifier(kind: &str, name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(TableError::Configuration(format!(
            "invalid {kind} name '{name}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reset_columns() -> Vec<ColumnDef> {
        vec![
            ColumnDef::new("id", LogicalType::Int)
                .primary_key()
                .auto_increment(),
            ColumnDef::new("user_id", LogicalType::String),
            ColumnDef::new("token", LogicalType::String).unique(),
            ColumnDef::new("datetime", LogicalType::DateTime)
                .default_expr("CURRENT_TIMESTAMP")
                .on_update("CURRENT_TIMESTAMP"),
        ]
    }

    #[test]
    fn test_define_and_lookup() {
        let schema = Schema::define("reset_password", reset_columns()).unwrap();

        assert_eq!(schema.name(), "reset_password");
        assert_eq!(schema.all_columns().len(), 4);
        assert_eq!(schema.primary_key(), vec!["id"]);
        assert_eq!(
            schema.column("token").map(|c| c.logical_type),
            Some(LogicalType::String)
        );
        assert!(schema.column("missing").is_none());
        assert_eq!(schema.auto_increment_column().unwrap().name, "id");
    }

    #[test]
    fn test_no_primary_key_rejected() {
        let err = Schema::define(
            "t",
            vec![ColumnDef::new("a", LogicalType::String)],
        )
        .unwrap_err();
        assert!(matches!(err, TableError::Configuration(_)));
    }

    #[test]
    fn test_auto_increment_requires_primary_int() {
        let not_primary = vec![
            ColumnDef::new("id", LogicalType::Int).primary_key(),
            ColumnDef::new("seq", LogicalType::Int).auto_increment(),
        ];
        assert!(matches!(
            Schema::define("t", not_primary),
            Err(TableError::Configuration(_))
        ));

        let not_int = vec![ColumnDef::new("id", LogicalType::String)
            .primary_key()
            .auto_increment()];
        assert!(matches!(
            Schema::define("t", not_int),
            Err(TableError::Configuration(_))
        ));
    }

    #[test]
    fn test_composite_primary_key() {
        let schema = Schema::define(
            "memberships",
            vec![
                ColumnDef::new("user_id", LogicalType::Int).primary_key(),
                ColumnDef::new("group_id", LogicalType::Int).primary_key(),
            ],
        )
        .unwrap();
        assert_eq!(schema.primary_key(), vec!["user_id", "group_id"]);
    }

    #[test]
    fn test_invalid_identifiers() {
        let columns = vec![ColumnDef::new("id", LogicalType::Int).primary_key()];
        assert!(Schema::define("users; DROP TABLE x", columns.clone()).is_err());
        assert!(Schema::define("1users", columns).is_err());

        let bad_column = vec![
            ColumnDef::new("id", LogicalType::Int).primary_key(),
            ColumnDef::new("na`me", LogicalType::String),
        ];
        assert!(Schema::define("users", bad_column).is_err());
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let columns = vec![
            ColumnDef::new("id", LogicalType::Int).primary_key(),
            ColumnDef::new("id", LogicalType::String),
        ];
        assert!(matches!(
            Schema::define("t", columns),
            Err(TableError::Configuration(_))
        ));
    }

    #[test]
    fn test_on_update_requires_temporal_type() {
        let columns = vec![
            ColumnDef::new("id", LogicalType::Int).primary_key(),
            ColumnDef::new("name", LogicalType::String).on_update("CURRENT_TIMESTAMP"),
        ];
        assert!(matches!(
            Schema::define("t", columns),
            Err(TableError::Configuration(_))
        ));
    }

    #[test]
    fn test_from_json_keeps_declared_order() {
        let schema = Schema::from_json(
            "reset_password",
            r#"{
                "id": {"type": "int", "auto": true, "primary": true},
                "user_id": {"type": "string"},
                "token": {"type": "string", "unique": true},
                "datetime": {"type": "datetime", "default": "CURRENT_TIMESTAMP",
                             "on_update": "CURRENT_TIMESTAMP"}
            }"#,
        )
        .unwrap();

        assert_eq!(schema, Schema::define("reset_password", reset_columns()).unwrap());
    }

    #[test]
    fn test_from_json_unknown_type() {
        let err = Schema::from_json(
            "t",
            r#"{"id": {"type": "int", "primary": true}, "x": {"type": "money"}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, TableError::UnknownType(name) if name == "money"));
    }
}
