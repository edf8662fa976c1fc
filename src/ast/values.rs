use std::cmp::Ordering;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ast::ColumnType;
use crate::error::{PolyError, PolyResult};

/// A scalar value carried by a constant, a parameter or a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    /// NULL value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Fixed-point money
    Money(Decimal),
    /// String, memo or XML text
    String(String),
    /// Calendar date
    Date(NaiveDate),
    /// Time of day
    Time(NaiveTime),
    /// Date and time
    DateTime(NaiveDateTime),
    /// GUID
    Guid(Uuid),
    /// Binary blob
    Binary(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Infer the column type of a raw value.
    ///
    /// A date-time whose time of day is exactly midnight is reported as a date.
    pub fn column_type(&self) -> ColumnType {
        match self {
            Value::Null => ColumnType::Unknown,
            Value::Bool(_) => ColumnType::Boolean,
            Value::Int(_) => ColumnType::Integer,
            Value::Float(_) => ColumnType::Float,
            Value::Money(_) => ColumnType::Money,
            Value::String(_) => ColumnType::String,
            Value::Date(_) => ColumnType::Date,
            Value::Time(_) => ColumnType::Time,
            Value::DateTime(dt) => {
                if dt.time().num_seconds_from_midnight() == 0 && dt.time().nanosecond() == 0 {
                    ColumnType::Date
                } else {
                    ColumnType::DateTime
                }
            }
            Value::Guid(_) => ColumnType::Guid,
            Value::Binary(_) => ColumnType::Binary,
        }
    }

    /// Convert this value to the native representation of `ty`.
    ///
    /// NULL stays NULL. Conversions that would lose information fail.
    pub fn coerce(self, ty: ColumnType) -> PolyResult<Value> {
        let fail = |v: &Value| PolyError::invalid("value", format!("cannot convert {} to {}", v, ty));
        let out = match (ty, self) {
            (_, Value::Null) => Value::Null,
            (ColumnType::Unknown, v) => v,

            (t, Value::String(s)) if t.is_text() => Value::String(s),
            (t, v @ (Value::Int(_) | Value::Float(_) | Value::Money(_) | Value::Bool(_) | Value::Guid(_)))
                if t.is_text() =>
            {
                Value::String(v.to_plain_string())
            }

            (ColumnType::Integer, Value::Int(n)) => Value::Int(n),
            (ColumnType::Integer, Value::Bool(b)) => Value::Int(b as i64),
            (ColumnType::Integer, v @ Value::Float(f)) => {
                // i64::MIN is -2^63 exactly; 2^63 itself is already out of range.
                let in_range = (-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&f);
                if f.fract() == 0.0 && in_range { Value::Int(f as i64) } else { return Err(fail(&v)) }
            }
            (ColumnType::Integer, v @ Value::Money(d)) => match d.fract().is_zero().then(|| d.to_i64()).flatten() {
                Some(n) => Value::Int(n),
                None => return Err(fail(&v)),
            },
            (ColumnType::Integer, Value::String(s)) => match s.trim().parse::<i64>() {
                Ok(n) => Value::Int(n),
                Err(_) => return Err(fail(&Value::String(s))),
            },

            (ColumnType::Float, Value::Float(f)) => Value::Float(f),
            (ColumnType::Float, Value::Int(n)) => Value::Float(n as f64),
            (ColumnType::Float, v @ Value::Money(d)) => match d.to_f64() {
                Some(f) => Value::Float(f),
                None => return Err(fail(&v)),
            },
            (ColumnType::Float, Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(f) => Value::Float(f),
                Err(_) => return Err(fail(&Value::String(s))),
            },

            (ColumnType::Money, Value::Money(d)) => Value::Money(d),
            (ColumnType::Money, Value::Int(n)) => Value::Money(Decimal::from(n)),
            (ColumnType::Money, v @ Value::Float(f)) => match Decimal::from_f64(f) {
                Some(d) => Value::Money(d.normalize()),
                None => return Err(fail(&v)),
            },
            (ColumnType::Money, Value::String(s)) => match s.trim().parse::<Decimal>() {
                Ok(d) => Value::Money(d),
                Err(_) => return Err(fail(&Value::String(s))),
            },

            (ColumnType::Boolean, Value::Bool(b)) => Value::Bool(b),
            (ColumnType::Boolean, v @ Value::Int(n)) => match n {
                0 => Value::Bool(false),
                1 => Value::Bool(true),
                _ => return Err(fail(&v)),
            },
            (ColumnType::Boolean, Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "t" | "y" => Value::Bool(true),
                "0" | "false" | "f" | "n" => Value::Bool(false),
                _ => return Err(fail(&Value::String(s))),
            },

            (ColumnType::Date, Value::Date(d)) => Value::Date(d),
            (ColumnType::Date, Value::DateTime(dt)) => Value::Date(dt.date()),
            (ColumnType::Date, Value::String(s)) => match parse_date_text(&s) {
                Some(dt) => Value::Date(dt.date()),
                None => return Err(fail(&Value::String(s))),
            },

            (ColumnType::DateTime, Value::DateTime(dt)) => Value::DateTime(dt),
            (ColumnType::DateTime, Value::Date(d)) => Value::DateTime(d.and_time(NaiveTime::MIN)),
            (ColumnType::DateTime, Value::String(s)) => match parse_date_text(&s) {
                Some(dt) => Value::DateTime(dt),
                None => return Err(fail(&Value::String(s))),
            },

            (ColumnType::Time, Value::Time(t)) => Value::Time(t),
            (ColumnType::Time, Value::DateTime(dt)) => Value::Time(dt.time()),
            (ColumnType::Time, Value::String(s)) => match NaiveTime::parse_from_str(s.trim(), "%H:%M:%S%.f") {
                Ok(t) => Value::Time(t),
                Err(_) => return Err(fail(&Value::String(s))),
            },

            (ColumnType::Guid, Value::Guid(g)) => Value::Guid(g),
            (ColumnType::Guid, Value::String(s)) => match Uuid::parse_str(s.trim().trim_matches(['{', '}'])) {
                Ok(g) => Value::Guid(g),
                Err(_) => return Err(fail(&Value::String(s))),
            },
            (ColumnType::Guid, v @ Value::Binary(_)) => {
                let Value::Binary(bytes) = &v else { return Err(fail(&v)) };
                match guid_from_le_bytes(bytes) {
                    Some(g) => Value::Guid(g),
                    None => return Err(fail(&v)),
                }
            }

            (ColumnType::Binary, Value::Binary(b)) => Value::Binary(b),
            (ColumnType::Binary, Value::Guid(g)) => Value::Binary(guid_to_le_bytes(&g).to_vec()),

            (_, v) => return Err(fail(&v)),
        };
        Ok(out)
    }

    /// Order two values the way the in-memory engine does.
    ///
    /// Numbers compare across integer, float and money. NULL sorts before
    /// everything. Values of unrelated types are incomparable.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        use Value::*;
        match (self, other) {
            (Null, Null) => Some(Ordering::Equal),
            (Null, _) => Some(Ordering::Less),
            (_, Null) => Some(Ordering::Greater),
            (Bool(a), Bool(b)) => a.partial_cmp(b),
            (Int(a), Int(b)) => a.partial_cmp(b),
            (Money(a), Money(b)) => a.partial_cmp(b),
            (Int(_) | Float(_) | Money(_), Int(_) | Float(_) | Money(_)) => {
                self.as_f64()?.partial_cmp(&other.as_f64()?)
            }
            (String(a), String(b)) => a.partial_cmp(b),
            (Date(a), Date(b)) => a.partial_cmp(b),
            (DateTime(a), DateTime(b)) => a.partial_cmp(b),
            (Date(a), DateTime(b)) => a.and_time(NaiveTime::MIN).partial_cmp(b),
            (DateTime(a), Date(b)) => a.partial_cmp(&b.and_time(NaiveTime::MIN)),
            (Time(a), Time(b)) => a.partial_cmp(b),
            (Guid(a), Guid(b)) => a.partial_cmp(b),
            (Binary(a), Binary(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(n) => Some(*n as f64),
            Value::Float(f) => Some(*f),
            Value::Money(d) => d.to_f64(),
            _ => None,
        }
    }

    /// Text form without SQL quoting.
    pub fn to_plain_string(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Guid(g) => g.hyphenated().to_string(),
            other => other.to_string(),
        }
    }
}

/// Accepts `YYYY-MM-DD`, `YYYYMMDD` and either of those followed by a time.
fn parse_date_text(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    const DATETIME_FORMATS: [&str; 4] = [
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y%m%d %H:%M:%S%.f",
        "%m/%d/%Y %H:%M:%S",
    ];
    const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%m/%d/%Y"];
    DATETIME_FORMATS
        .iter()
        .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// GUID bytes in the mixed-endian layout used by embedded engines that store
/// GUIDs as 16-byte blobs (first three groups little-endian).
pub fn guid_to_le_bytes(g: &Uuid) -> [u8; 16] {
    g.to_bytes_le()
}

pub fn guid_from_le_bytes(bytes: &[u8]) -> Option<Uuid> {
    let arr: [u8; 16] = bytes.try_into().ok()?;
    Some(Uuid::from_bytes_le(arr))
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(n) => write!(f, "{}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Money(d) => write!(f, "{}", d),
            Value::String(s) => write!(f, "'{}'", s),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Value::Time(t) => write!(f, "{}", t.format("%H:%M:%S")),
            Value::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            Value::Guid(g) => write!(f, "{}", g),
            Value::Binary(b) => {
                write!(f, "0x")?;
                for byte in b {
                    write!(f, "{:02X}", byte)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Int(n as i64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<Decimal> for Value {
    fn from(d: Decimal) -> Self {
        Value::Money(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<NaiveDate> for Value {
    fn from(d: NaiveDate) -> Self {
        Value::Date(d)
    }
}

impl From<NaiveTime> for Value {
    fn from(t: NaiveTime) -> Self {
        Value::Time(t)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(dt: NaiveDateTime) -> Self {
        Value::DateTime(dt)
    }
}

impl From<Uuid> for Value {
    fn from(u: Uuid) -> Self {
        Value::Guid(u)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Binary(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_date_from_midnight() {
        let midnight = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let noon = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap().and_hms_opt(12, 0, 0).unwrap();
        assert_eq!(Value::from(midnight).column_type(), ColumnType::Date);
        assert_eq!(Value::from(noon).column_type(), ColumnType::DateTime);
    }

    #[test]
    fn test_coerce() {
        assert_eq!(Value::Int(1).coerce(ColumnType::Boolean).unwrap(), Value::Bool(true));
        assert_eq!(
            Value::from("2024-03-01").coerce(ColumnType::Date).unwrap(),
            Value::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert!(Value::Int(7).coerce(ColumnType::Boolean).is_err());
        assert_eq!(Value::Null.coerce(ColumnType::Guid).unwrap(), Value::Null);
    }

    #[test]
    fn test_float_to_integer_is_never_lossy() {
        assert_eq!(Value::Float(-3.0).coerce(ColumnType::Integer).unwrap(), Value::Int(-3));
        assert_eq!(Value::Float(-9.223372036854775808e18).coerce(ColumnType::Integer).unwrap(), Value::Int(i64::MIN));
        assert!(Value::Float(1e20).coerce(ColumnType::Integer).is_err());
        assert!(Value::Float(9.223372036854775808e18).coerce(ColumnType::Integer).is_err());
        assert!(Value::Float(2.5).coerce(ColumnType::Integer).is_err());
        assert!(Value::Float(f64::NAN).coerce(ColumnType::Integer).is_err());
    }

    #[test]
    fn test_guid_blob_roundtrip() {
        let g = Uuid::parse_str("00112233-4455-6677-8899-aabbccddeeff").unwrap();
        let bytes = guid_to_le_bytes(&g);
        assert_eq!(&bytes[..4], &[0x33, 0x22, 0x11, 0x00]);
        assert_eq!(Value::Binary(bytes.to_vec()).coerce(ColumnType::Guid).unwrap(), Value::Guid(g));
    }

    #[test]
    fn test_compare_numbers() {
        assert_eq!(Value::Int(2).compare(&Value::Float(2.5)), Some(Ordering::Less));
        assert_eq!(Value::Null.compare(&Value::Int(0)), Some(Ordering::Less));
        assert_eq!(Value::Int(1).compare(&Value::from("1")), None);
    }
}
