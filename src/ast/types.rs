use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ast::Value;
use crate::error::PolyError;

/// Logical column type shared by every dialect.
///
/// The type travels with constants and parameters so a dialect can pick the
/// right literal form or placeholder binding; it is never inferred from schema
/// by the compiler itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    #[default]
    Unknown,
    String,
    Integer,
    Float,
    Money,
    Boolean,
    Date,
    Time,
    DateTime,
    Guid,
    Binary,
    Memo,
    Xml,
}

impl ColumnType {
    /// Every concrete type, `Unknown` excluded.
    pub const ALL: [ColumnType; 12] = [
        ColumnType::String,
        ColumnType::Integer,
        ColumnType::Float,
        ColumnType::Money,
        ColumnType::Boolean,
        ColumnType::Date,
        ColumnType::Time,
        ColumnType::DateTime,
        ColumnType::Guid,
        ColumnType::Binary,
        ColumnType::Memo,
        ColumnType::Xml,
    ];

    /// The value a NULL of this type stands for in null-as-default rendering.
    ///
    /// | type | default |
    /// |------|---------|
    /// | string, memo, xml | `""` |
    /// | integer, float, money | zero |
    /// | boolean | `false` |
    /// | date, date-time | 0001-01-01 |
    /// | time | 00:00:00 |
    /// | guid | nil GUID |
    /// | binary | empty blob |
    pub fn default_value(self) -> Value {
        match self {
            ColumnType::Unknown => Value::Null,
            ColumnType::String | ColumnType::Memo | ColumnType::Xml => Value::String(String::new()),
            ColumnType::Integer => Value::Int(0),
            ColumnType::Float => Value::Float(0.0),
            ColumnType::Money => Value::Money(Decimal::ZERO),
            ColumnType::Boolean => Value::Bool(false),
            ColumnType::Date => Value::Date(min_date()),
            ColumnType::DateTime => Value::DateTime(min_date().and_time(NaiveTime::MIN)),
            ColumnType::Time => Value::Time(NaiveTime::MIN),
            ColumnType::Guid => Value::Guid(Uuid::nil()),
            ColumnType::Binary => Value::Binary(Vec::new()),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ColumnType::Unknown => "unknown",
            ColumnType::String => "string",
            ColumnType::Integer => "integer",
            ColumnType::Float => "float",
            ColumnType::Money => "money",
            ColumnType::Boolean => "boolean",
            ColumnType::Date => "date",
            ColumnType::Time => "time",
            ColumnType::DateTime => "datetime",
            ColumnType::Guid => "guid",
            ColumnType::Binary => "binary",
            ColumnType::Memo => "memo",
            ColumnType::Xml => "xml",
        }
    }

    /// Types whose values are stored as text.
    pub fn is_text(self) -> bool {
        matches!(self, ColumnType::String | ColumnType::Memo | ColumnType::Xml)
    }

    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnType::Integer | ColumnType::Float | ColumnType::Money)
    }

    pub fn is_temporal(self) -> bool {
        matches!(self, ColumnType::Date | ColumnType::Time | ColumnType::DateTime)
    }
}

/// 0001-01-01, the smallest date every supported engine can round-trip as text.
pub fn min_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default()
}

/// Midnight at [`min_date`].
pub fn min_datetime() -> NaiveDateTime {
    min_date().and_time(NaiveTime::MIN)
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ColumnType {
    type Err = PolyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ty = match s.to_ascii_lowercase().as_str() {
            "unknown" => ColumnType::Unknown,
            "string" | "text" | "varchar" => ColumnType::String,
            "integer" | "int" => ColumnType::Integer,
            "float" | "double" | "real" => ColumnType::Float,
            "money" | "decimal" => ColumnType::Money,
            "boolean" | "bool" => ColumnType::Boolean,
            "date" => ColumnType::Date,
            "time" => ColumnType::Time,
            "datetime" | "timestamp" => ColumnType::DateTime,
            "guid" | "uuid" => ColumnType::Guid,
            "binary" | "blob" => ColumnType::Binary,
            "memo" => ColumnType::Memo,
            "xml" => ColumnType::Xml,
            other => return Err(PolyError::invalid("column type", format!("'{}' is not known", other))),
        };
        Ok(ty)
    }
}
