use chrono::{NaiveDate, NaiveDateTime};

use super::super::traits::{has_fraction, Features, Quoting, RowLimit, SqlDialect};
use crate::ast::{ColumnType, FuncKind, Value};
use crate::error::PolyResult;
use crate::schema::ColumnDef;

/// Mainframe-family engine reached through a generic driver.
///
/// Identifiers go unquoted and must be plain words. Booleans are stored as
/// `'1'`/`'0'` characters and the row cap is left to the driver.
pub struct Db2Dialect;

impl SqlDialect for Db2Dialect {
    fn name(&self) -> &'static str {
        "Db2"
    }

    fn quoting(&self) -> Quoting {
        Quoting::None
    }

    fn row_limit(&self) -> RowLimit {
        RowLimit::Driver
    }

    fn features(&self) -> Features {
        Features {
            bulk_load: true,
            max_parameters: 32767,
            max_statement_len: 2_097_152,
            ..Features::default()
        }
    }

    fn type_name(&self, col: &ColumnDef) -> PolyResult<String> {
        Ok(match col.ty {
            ColumnType::String => match col.max_len {
                Some(n) if n <= 32672 => format!("VARCHAR({})", n),
                _ => "CLOB".to_string(),
            },
            ColumnType::Integer => super::integer_type(col, ["SMALLINT", "SMALLINT", "INTEGER", "BIGINT"], false),
            ColumnType::Float => "DOUBLE".to_string(),
            ColumnType::Money => "DECIMAL(19, 4)".to_string(),
            ColumnType::Boolean => "CHAR(1)".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime => "TIMESTAMP".to_string(),
            ColumnType::Guid => "CHAR(36)".to_string(),
            ColumnType::Binary => "BLOB".to_string(),
            ColumnType::Memo => "CLOB".to_string(),
            ColumnType::Xml => "XML".to_string(),
            ColumnType::Unknown => return Err(super::unknown_type(self, col)),
        })
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "'1'".to_string() } else { "'0'".to_string() }
    }

    fn date_literal(&self, d: NaiveDate) -> String {
        format!("TO_DATE('{}', 'YYYY-MM-DD')", d.format("%Y-%m-%d"))
    }

    fn datetime_literal(&self, dt: NaiveDateTime) -> String {
        if has_fraction(&dt.time()) {
            format!(
                "TO_TIMESTAMP('{}', 'YYYY-MM-DD HH24:MI:SS.FF6')",
                dt.format("%Y-%m-%d %H:%M:%S%.6f")
            )
        } else {
            format!("TO_DATE('{}', 'YYYY-MM-DD HH24:MI:SS')", dt.format("%Y-%m-%d %H:%M:%S"))
        }
    }

    fn binary_literal(&self, bytes: &[u8]) -> PolyResult<String> {
        Ok(format!("BLOB(X'{}')", super::super::traits::hex(bytes)))
    }

    fn function_name(&self, func: FuncKind) -> PolyResult<&'static str> {
        Ok(match func {
            FuncKind::Substring => "SUBSTR",
            other => other.sql_name(),
        })
    }

    fn prepare_parameter(&self, value: &Value, ty: ColumnType) -> PolyResult<Value> {
        match value.clone().coerce(ty)? {
            Value::Bool(b) => Ok(Value::String(if b { "1" } else { "0" }.to_string())),
            other => Ok(other),
        }
    }
}
