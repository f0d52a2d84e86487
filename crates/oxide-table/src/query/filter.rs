//! Filter conditions.
//!
//! The filter DSL is deliberately permissive: unknown operators fall back to
//! equality and unknown columns are dropped when the WHERE clause is built.

use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::value::{deserialize_entries, upsert_entry, Value};

/// Comparison operators accepted in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompareOp {
    /// Equal (=)
    #[default]
    Eq,
    /// Less than (<)
    Lt,
    /// Greater than (>)
    Gt,
    /// Less than or equal (<=)
    Lte,
    /// Greater than or equal (>=)
    Gte,
    /// Not equal (<>)
    Ne,
    /// Pattern match (LIKE)
    Like,
}

impl CompareOp {
    /// Every accepted operator, in its SQL spelling.
    pub const ALLOWED: [&'static str; 7] = ["=", "<", ">", "<=", ">=", "<>", "LIKE"];

    /// Parses an operator. Anything outside [`CompareOp::ALLOWED`] becomes
    /// [`CompareOp::Eq`].
    #[must_use]
    pub fn parse_lenient(op: &str) -> Self {
        match op {
            "<" => Self::Lt,
            ">" => Self::Gt,
            "<=" => Self::Lte,
            ">=" => Self::Gte,
            "<>" => Self::Ne,
            "LIKE" => Self::Like,
            _ => Self::Eq,
        }
    }

    /// Returns the SQL spelling.
    #[must_use]
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Lte => "<=",
            Self::Gte => ">=",
            Self::Ne => "<>",
            Self::Like => "LIKE",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

impl From<&str> for CompareOp {
    fn from(op: &str) -> Self {
        Self::parse_lenient(op)
    }
}

/// A per-column match specification.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterCondition {
    /// Bare value, matched with `=`.
    Equals(Value),
    /// Value matched with an explicit operator.
    Compare {
        /// Value to compare against.
        value: Value,
        /// Comparison operator.
        compare: CompareOp,
    },
}

impl FilterCondition {
    /// Returns the value to bind.
    #[must_use]
    pub fn value(&self) -> &Value {
        match self {
            Self::Equals(value) | Self::Compare { value, .. } => value,
        }
    }

    /// Returns the operator to apply.
    #[must_use]
    pub fn compare(&self) -> CompareOp {
        match self {
            Self::Equals(_) => CompareOp::Eq,
            Self::Compare { compare, .. } => *compare,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Equals(value) | Self::Compare { value, .. } => value,
        }
    }
}

impl<'de> Deserialize<'de> for FilterCondition {
    /// Objects are structured conditions (`{"value": .., "compare": ..}`);
    /// a missing `value` binds NULL and a missing or unknown `compare` means
    /// `=`. Anything else is a bare value.
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Ok(match raw {
            serde_json::Value::Object(mut map) => {
                let value = map.remove("value").map_or(Value::Null, Value::from);
                let compare = map
                    .get("compare")
                    .and_then(serde_json::Value::as_str)
                    .map_or(CompareOp::Eq, CompareOp::parse_lenient);
                Self::Compare { value, compare }
            }
            other => Self::Equals(Value::from(other)),
        })
    }
}

/// An ordered set of column filters.
///
/// # Example
///
/// ```rust
/// use oxide_table::Filters;
///
/// let filters = Filters::new()
///     .eq("user_id", "alice@example.com")
///     .compare("datetime", ">", "2024-01-01 00:00:00");
/// assert_eq!(filters.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filters {
    entries: Vec<(String, FilterCondition)>,
}

impl Filters {
    /// Creates an empty filter set (matches every row).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an equality filter.
    #[must_use]
    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, FilterCondition::Equals(value.into()));
        self
    }

    /// Adds a filter with an explicit operator.
    #[must_use]
    pub fn compare(
        mut self,
        column: impl Into<String>,
        compare: impl Into<CompareOp>,
        value: impl Into<Value>,
    ) -> Self {
        self.insert(
            column,
            FilterCondition::Compare {
                value: value.into(),
                compare: compare.into(),
            },
        );
        self
    }

    /// Sets the condition for a column, replacing an earlier one.
    pub fn insert(&mut self, column: impl Into<String>, condition: FilterCondition) {
        upsert_entry(&mut self.entries, column.into(), condition);
    }

    /// Iterates filters in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterCondition)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of filters (recognized or not).
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether there are no filters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts the filters into plain column values, dropping operators.
    #[must_use]
    pub fn into_values(self) -> Vec<(String, Value)> {
        self.entries
            .into_iter()
            .map(|(column, condition)| (column, condition.into_value()))
            .collect()
    }
}

impl<K: Into<String>> FromIterator<(K, FilterCondition)> for Filters {
    fn from_iter<I: IntoIterator<Item = (K, FilterCondition)>>(iter: I) -> Self {
        let mut filters = Self::new();
        for (column, condition) in iter {
            filters.insert(column, condition);
        }
        filters
    }
}

impl<'de> Deserialize<'de> for Filters {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_entries(deserializer).map(|entries| Self { entries })
    }
}
