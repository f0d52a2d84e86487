//! WHERE clause builder.

use tracing::debug;

use crate::codec;
use crate::ddl::Dialect;
use crate::error::Result;
use crate::schema::Schema;
use crate::store::Param;

use super::Filters;

/// A rendered WHERE clause and its bind values, in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause {
    /// Clause text, always starting with `1=1`.
    pub sql: String,
    /// Values bound to the clause placeholders.
    pub params: Vec<Param>,
}

impl WhereClause {
    /// Returns whether at least one filter was recognized.
    #[must_use]
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}

/// Builds the WHERE clause for `filters` against `schema`.
///
/// Only columns declared in `schema` reach the SQL text; others are skipped.
/// Each recognized column adds one ` AND <column> <op> <placeholder>` segment.
pub fn build_where<D: Dialect + ?Sized>(
    dialect: &D,
    schema: &Schema,
    filters: &Filters,
) -> Result<WhereClause> {
    let mut sql = String::from("1=1");
    let mut params = Vec::new();

    for (column, condition) in filters.iter() {
        let Some(def) = schema.column(column) else {
            debug!(table = %schema.name(), column = %column, "Ignoring filter on unknown column");
            continue;
        };

        let kind = def.logical_type.bind_kind();
        sql.push_str(&format!(
            " AND {} {} {}",
            dialect.quote_identifier(&def.name),
            condition.compare().as_sql(),
            dialect.placeholder(kind)
        ));

        let value = codec::encode(condition.value().clone())?;
        params.push(Param::bind(kind, value));
    }

    Ok(WhereClause { sql, params })
}
