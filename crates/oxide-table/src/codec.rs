//! Value codec: composite values to and from their stored text form.
//!
//! Composites are stored as JSON text in `opaque-blob` columns. Reading them
//! back is governed by a [`DecodePolicy`].

use crate::error::Result;
use crate::types::LogicalType;
use crate::value::Value;

/// Stored form of an encoded boolean `false`.
pub const SERIALIZED_FALSE: &str = "false";

/// Encodes a value for storage. Composites become JSON text; every other
/// value is returned unchanged.
pub fn encode(value: Value) -> Result<Value> {
    match value {
        Value::Composite(inner) => Ok(Value::Text(serde_json::to_string(&inner)?)),
        other => Ok(other),
    }
}

/// Returns whether `text` looks like an encoded value.
///
/// The sentinel for `false` counts, as does any text that parses to something
/// other than `false`.
#[must_use]
pub fn is_encoded(text: &str) -> bool {
    if text == SERIALIZED_FALSE {
        return true;
    }
    matches!(
        serde_json::from_str::<serde_json::Value>(text),
        Ok(parsed) if parsed != serde_json::Value::Bool(false)
    )
}

/// Heuristically decodes a stored value.
///
/// Any text that [`is_encoded`] is decoded. Numeric-looking strings such as
/// `"42"` therefore come back as numbers.
#[must_use]
pub fn decode(value: Value) -> Value {
    match value {
        Value::Text(text) if is_encoded(&text) => {
            serde_json::from_str::<serde_json::Value>(&text).map_or(Value::Text(text), Value::from)
        }
        other => other,
    }
}

/// How stored text is turned back into values on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecodePolicy {
    /// Decode only `opaque-blob` columns, and only into arrays or objects.
    #[default]
    ColumnType,
    /// Run every text field through [`decode`].
    Heuristic,
}

impl DecodePolicy {
    /// Decodes one field. `logical_type` is `None` for columns that are not
    /// part of the schema (e.g. computed expressions).
    #[must_use]
    pub fn decode(self, logical_type: Option<LogicalType>, value: Value) -> Value {
        match self {
            Self::Heuristic => decode(value),
            Self::ColumnType => match (logical_type, value) {
                (Some(LogicalType::OpaqueBlob), Value::Text(text)) => {
                    match serde_json::from_str::<serde_json::Value>(&text) {
                        Ok(parsed @ (serde_json::Value::Array(_) | serde_json::Value::Object(_))) => {
                            Value::Composite(parsed)
                        }
                        _ => Value::Text(text),
                    }
                }
                (_, other) => other,
            },
        }
    }
}
