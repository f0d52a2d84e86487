//! Logical column types and how they map onto storage types and bindings.

use std::fmt;
use std::str::FromStr;

use crate::error::TableError;
use crate::value::Value;

/// Abstract column type, independent of any engine's type spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalType {
    /// 64-bit integer.
    Int,
    /// Floating point.
    Float,
    /// Short string (up to 255 characters on the canonical engine).
    String,
    /// Structured value stored through the value codec.
    OpaqueBlob,
    /// Date and time.
    DateTime,
    /// Timestamp.
    Timestamp,
}

impl LogicalType {
    /// Returns the canonical (MySQL-family) storage type.
    #[must_use]
    pub fn mysql_name(self) -> &'static str {
        match self {
            Self::Int => "bigint(20)",
            Self::Float => "float",
            Self::String => "varchar(255)",
            Self::OpaqueBlob => "MEDIUMTEXT",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
        }
    }

    /// Returns the SQLite storage type.
    #[must_use]
    pub fn sqlite_name(self) -> &'static str {
        match self {
            Self::Int => "INTEGER",
            Self::Float => "REAL",
            Self::String | Self::OpaqueBlob | Self::DateTime | Self::Timestamp => "TEXT",
        }
    }

    /// Returns how values for this type are bound.
    #[must_use]
    pub fn bind_kind(self) -> BindKind {
        match self {
            Self::Int => BindKind::Integer,
            Self::Float => BindKind::Float,
            Self::String | Self::OpaqueBlob | Self::DateTime | Self::Timestamp => BindKind::Text,
        }
    }

    /// Returns whether this is a date/time type (the only ones that accept
    /// an `ON UPDATE` expression).
    #[must_use]
    pub fn is_temporal(self) -> bool {
        matches!(self, Self::DateTime | Self::Timestamp)
    }

    /// Returns whether values of this type go through the value codec.
    #[must_use]
    pub fn is_encoded(self) -> bool {
        matches!(self, Self::OpaqueBlob)
    }

    /// Returns the canonical name used in declarative schemas.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
            Self::OpaqueBlob => "opaque-blob",
            Self::DateTime => "datetime",
            Self::Timestamp => "timestamp",
        }
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogicalType {
    type Err = TableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "string" => Ok(Self::String),
            "opaque-blob" | "data" | "blob" => Ok(Self::OpaqueBlob),
            "datetime" => Ok(Self::DateTime),
            "timestamp" => Ok(Self::Timestamp),
            other => Err(TableError::UnknownType(other.to_string())),
        }
    }
}

/// How a value is handed to the store's parameter binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindKind {
    /// Integer binding (`%d`).
    Integer,
    /// Floating-point binding (`%f`).
    Float,
    /// String binding (`%s`).
    Text,
}

impl BindKind {
    /// Returns the printf-style format token for this kind.
    #[must_use]
    pub fn format_token(self) -> &'static str {
        match self {
            Self::Integer => "%d",
            Self::Float => "%f",
            Self::Text => "%s",
        }
    }

    /// Coerces a value to this binding kind.
    ///
    /// Text that does not parse as a number is bound unchanged.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    pub fn coerce(self, value: Value) -> Value {
        match (self, value) {
            (Self::Integer, Value::Float(f)) => Value::Int(f.trunc() as i64),
            (Self::Integer, Value::Bool(b)) => Value::Int(i64::from(b)),
            (Self::Integer, Value::Text(s)) => {
                let trimmed = s.trim();
                if let Ok(n) = trimmed.parse::<i64>() {
                    Value::Int(n)
                } else if let Ok(f) = trimmed.parse::<f64>() {
                    Value::Int(f.trunc() as i64)
                } else {
                    Value::Text(s)
                }
            }
            (Self::Float, Value::Int(n)) => Value::Float(n as f64),
            (Self::Float, Value::Bool(b)) => Value::Float(if b { 1.0 } else { 0.0 }),
            (Self::Float, Value::Text(s)) => match s.trim().parse::<f64>() {
                Ok(f) => Value::Float(f),
                Err(_) => Value::Text(s),
            },
            (Self::Text, Value::Int(n)) => Value::Text(n.to_string()),
            (Self::Text, Value::Float(f)) => Value::Text(f.to_string()),
            (Self::Text, Value::Bool(b)) => Value::Text(if b { "1" } else { "0" }.to_string()),
            (_, other) => other,
        }
    }
}

impl fmt::Display for BindKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_token())
    }
}
