//! Schema-bound CRUD operations.

use tracing::{debug, info};

use crate::codec::{self, DecodePolicy};
use crate::ddl::Dialect;
use crate::error::{Result, TableError};
use crate::query::{build_where, Filters};
use crate::schema::{validate_identifier, Schema};
use crate::store::{Param, Store};
use crate::types::LogicalType;
use crate::value::{Data, Row, Value};

/// Row cap applied when a query passes `limit = 0`.
pub const DEFAULT_LIMIT: u64 = 10;

/// Normalizes a caller-supplied limit: negative values count by magnitude and
/// `0` selects [`DEFAULT_LIMIT`]. The result never exceeds `i64::MAX`.
#[must_use]
pub fn effective_limit(limit: i64) -> u64 {
    match limit.saturating_abs() {
        0 => DEFAULT_LIMIT,
        n => n.unsigned_abs(),
    }
}

/// A table bound to a schema and a store.
///
/// Construction synchronizes the schema, so a `Table` always refers to an
/// existing physical table.
#[derive(Debug)]
pub struct Table<S: Store> {
    store: S,
    schema: Schema,
    table_name: String,
    decode_policy: DecodePolicy,
}

impl<S: Store> Table<S> {
    /// Binds `schema` to `store` and creates the table if it is absent.
    pub async fn new(store: S, schema: Schema) -> Result<Self> {
        let table_name = store.table_name(schema.name());
        validate_identifier("table", &table_name)?;

        let table = Self {
            store,
            schema,
            table_name,
            decode_policy: DecodePolicy::default(),
        };
        table.sync_schema().await?;
        Ok(table)
    }

    /// Sets how stored text is decoded on read.
    #[must_use]
    pub fn with_decode_policy(mut self, policy: DecodePolicy) -> Self {
        self.decode_policy = policy;
        self
    }

    /// Returns the statements [`Table::sync_schema`] runs.
    pub fn create_statements(&self) -> Result<Vec<String>> {
        self.store
            .dialect()
            .create_table(&self.table_name, &self.schema)
    }

    /// Runs the idempotent create statements for this table.
    pub async fn sync_schema(&self) -> Result<()> {
        info!(table = %self.table_name, "Synchronizing table schema");
        for statement in self.create_statements()? {
            self.store.execute_ddl(&statement).await?;
        }
        Ok(())
    }

    /// Returns the schema.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the base table name.
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    /// Returns the prefixed, physical table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Returns the store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Inserts a row and returns its generated key.
    ///
    /// Columns not in the schema are ignored; columns left out take their
    /// defaults.
    pub async fn insert(&self, data: &Data) -> Result<i64> {
        let values = self.bind_data(data)?;
        self.store.insert(&self.table_name, &values).await
    }

    /// Updates the rows whose columns equal every entry of `filter`.
    ///
    /// Returns the affected row count, or `0` when `data` names no known
    /// column.
    ///
    /// # Errors
    ///
    /// [`TableError::UnsafeOperation`] when `filter` names no known column.
    pub async fn update(&self, data: &Data, filter: &Data) -> Result<u64> {
        let filter = self.bind_data(filter)?;
        if filter.is_empty() {
            return Err(TableError::UnsafeOperation(format!(
                "update on '{}' requires at least one known filter column",
                self.table_name
            )));
        }

        let set = self.bind_data(data)?;
        if set.is_empty() {
            return Ok(0);
        }

        self.store.update(&self.table_name, &set, &filter).await
    }

    /// Deletes matching rows and returns how many were removed.
    ///
    /// # Errors
    ///
    /// [`TableError::UnsafeOperation`] when no filter applies to a known
    /// column. Nothing is executed in that case.
    pub async fn delete(&self, filters: &Filters) -> Result<u64> {
        let clause = build_where(self.store.dialect(), &self.schema, filters)?;
        if !clause.has_params() {
            return Err(TableError::UnsafeOperation(format!(
                "delete on '{}' requires at least one known filter column",
                self.table_name
            )));
        }

        let sql = format!("DELETE FROM {} WHERE {}", self.quoted_name(), clause.sql);
        self.store.execute(&sql, &clause.params).await
    }

    /// Counts matching rows.
    pub async fn count(&self, filters: &Filters) -> Result<i64> {
        let clause = build_where(self.store.dialect(), &self.schema, filters)?;
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE {}",
            self.quoted_name(),
            clause.sql
        );

        let count = self.store.fetch_scalar(&sql, &clause.params).await?;
        Ok(count.as_i64().unwrap_or(0))
    }

    /// Returns matching rows.
    ///
    /// `limit` is taken by magnitude and `0` means [`DEFAULT_LIMIT`]; there is
    /// no unlimited mode.
    pub async fn query(&self, filters: &Filters, limit: i64, offset: u64) -> Result<Vec<Row>> {
        let clause = build_where(self.store.dialect(), &self.schema, filters)?;
        let sql = format!(
            "SELECT * FROM {} WHERE {} LIMIT {} OFFSET {offset}",
            self.quoted_name(),
            clause.sql,
            effective_limit(limit)
        );

        let rows = self.store.fetch_rows(&sql, &clause.params).await?;
        Ok(rows.into_iter().map(|row| self.decode_row(row)).collect())
    }

    /// Returns the first matching row.
    pub async fn get_row(&self, filters: &Filters) -> Result<Option<Row>> {
        Ok(self.query(filters, 1, 0).await?.into_iter().next())
    }

    /// Returns one column of the first matching row. NULL reads as `None`.
    pub async fn get_column(&self, filters: &Filters, column: &str) -> Result<Option<Value>> {
        Ok(self
            .get_row(filters)
            .await?
            .and_then(|mut row| row.take(column))
            .filter(|value| !value.is_null()))
    }

    fn quoted_name(&self) -> String {
        self.store.dialect().quote_identifier(&self.table_name)
    }

    /// Keeps known columns, encodes composites and coerces to bind kinds.
    ///
    /// Composites only go into `opaque-blob` columns, the only ones decoded
    /// back on read.
    fn bind_data<'a>(&'a self, data: &Data) -> Result<Vec<(&'a str, Param)>> {
        let mut values = Vec::with_capacity(data.len());
        for (column, value) in data.iter() {
            let Some(def) = self.schema.column(column) else {
                debug!(table = %self.table_name, column = %column, "Ignoring unknown column");
                continue;
            };
            if matches!(value, Value::Composite(_)) && def.logical_type != LogicalType::OpaqueBlob
            {
                return Err(TableError::TypeMismatch(format!(
                    "column '{}' of '{}' is {}, composites need opaque-blob",
                    def.name, self.table_name, def.logical_type
                )));
            }
            let value = codec::encode(value.clone())?;
            values.push((
                def.name.as_str(),
                Param::bind(def.logical_type.bind_kind(), value),
            ));
        }
        Ok(values)
    }

    fn decode_row(&self, row: Row) -> Row {
        let policy = self.decode_policy;
        row.map_values(|column, value| {
            let logical_type = self.schema.column(column).map(|c| c.logical_type);
            policy.decode(logical_type, value)
        })
    }
}
