//! SQLite store backed by an `sqlx` pool.

use std::str::FromStr;

use sqlx::sqlite::{SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Column, Row as _, Sqlite, TypeInfo, ValueRef};
use tracing::debug;

use crate::ddl::{Dialect, SqliteDialect};
use crate::error::{Result, TableError};
use crate::value::{Row, Value};

use super::{Param, Store};

type SqliteQuery<'q> = sqlx::query::Query<'q, Sqlite, SqliteArguments<'q>>;

/// [`Store`] implementation for SQLite.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    prefix: String,
    dialect: SqliteDialect,
}

impl SqliteStore {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            prefix: String::new(),
            dialect: SqliteDialect::new(),
        }
    }

    /// Connects to `url`, creating the database file if it does not exist.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Sets the table name prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Returns the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    fn assignments(&self, entries: &[(&str, Param)], separator: &str) -> String {
        entries
            .iter()
            .map(|(column, param)| {
                format!(
                    "{} = {}",
                    self.dialect.quote_identifier(column),
                    self.dialect.placeholder(param.kind)
                )
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

impl Store for SqliteStore {
    type Dialect = SqliteDialect;

    fn dialect(&self) -> &SqliteDialect {
        &self.dialect
    }

    fn prefix(&self) -> &str {
        &self.prefix
    }

    async fn execute_ddl(&self, sql: &str) -> Result<()> {
        debug!(sql = %sql, "Executing DDL");
        sqlx::query(sql).execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, table: &str, values: &[(&str, Param)]) -> Result<i64> {
        let table_q = self.dialect.quote_identifier(table);
        let sql = if values.is_empty() {
            format!("INSERT INTO {table_q} DEFAULT VALUES")
        } else {
            let columns: Vec<String> = values
                .iter()
                .map(|(column, _)| self.dialect.quote_identifier(column))
                .collect();
            let placeholders: Vec<&str> = values
                .iter()
                .map(|(_, param)| self.dialect.placeholder(param.kind))
                .collect();
            format!(
                "INSERT INTO {table_q} ({}) VALUES ({})",
                columns.join(", "),
                placeholders.join(", ")
            )
        };

        debug!(sql = %sql, "Executing SQL");
        let mut query = sqlx::query(&sql);
        for (_, param) in values {
            query = bind_param(query, &param.value);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.last_insert_rowid())
    }

    async fn update(
        &self,
        table: &str,
        set: &[(&str, Param)],
        filter: &[(&str, Param)],
    ) -> Result<u64> {
        if filter.is_empty() {
            return Err(TableError::UnsafeOperation(format!(
                "refusing to update every row of '{table}'"
            )));
        }
        if set.is_empty() {
            return Ok(0);
        }

        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.dialect.quote_identifier(table),
            self.assignments(set, ", "),
            self.assignments(filter, " AND ")
        );

        debug!(sql = %sql, "Executing SQL");
        let mut query = sqlx::query(&sql);
        for (_, param) in set.iter().chain(filter) {
            query = bind_param(query, &param.value);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn fetch_rows(&self, sql: &str, params: &[Param]) -> Result<Vec<Row>> {
        debug!(sql = %sql, params = params.len(), "Executing SQL");
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, &param.value);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.iter().map(decode_row).collect()
    }

    async fn fetch_scalar(&self, sql: &str, params: &[Param]) -> Result<Value> {
        let rows = self.fetch_rows(sql, params).await?;
        Ok(rows
            .into_iter()
            .next()
            .and_then(|row| row.into_iter().next())
            .map_or(Value::Null, |(_, value)| value))
    }

    async fn execute(&self, sql: &str, params: &[Param]) -> Result<u64> {
        debug!(sql = %sql, params = params.len(), "Executing SQL");
        let mut query = sqlx::query(sql);
        for param in params {
            query = bind_param(query, &param.value);
        }

        let result = query.execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}

/// Binds a value to a raw query.
fn bind_param<'q>(query: SqliteQuery<'q>, value: &Value) -> SqliteQuery<'q> {
    match value {
        Value::Null => query.bind(Option::<i64>::None),
        Value::Bool(b) => query.bind(*b),
        Value::Int(i) => query.bind(*i),
        Value::Float(f) => query.bind(*f),
        Value::Text(s) => query.bind(s.clone()),
        Value::Blob(b) => query.bind(b.clone()),
        Value::Composite(v) => query.bind(v.to_string()),
    }
}

/// Decodes a row by the storage class of each field.
fn decode_row(row: &SqliteRow) -> Result<Row> {
    let mut fields = Vec::with_capacity(row.columns().len());

    for column in row.columns() {
        let index = column.ordinal();
        let raw = row.try_get_raw(index)?;

        let value = if raw.is_null() {
            Value::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => Value::Int(row.try_get_unchecked::<i64, _>(index)?),
                "REAL" => Value::Float(row.try_get_unchecked::<f64, _>(index)?),
                "BLOB" => Value::Blob(row.try_get_unchecked::<Vec<u8>, _>(index)?),
                _ => Value::Text(row.try_get_unchecked::<String, _>(index)?),
            }
        };

        fields.push((column.name().to_string(), value));
    }

    Ok(Row::from_fields(fields))
}
