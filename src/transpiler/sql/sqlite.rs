use uuid::Uuid;

use super::super::traits::{Features, Quoting, RowLimit, SqlDialect};
use crate::ast::{ColumnType, FuncKind, Value};
use crate::ast::values::guid_to_le_bytes;
use crate::error::PolyResult;
use crate::schema::ColumnDef;

/// File-embedded engine.
///
/// Storage is dynamically typed, so GUIDs travel as 16-byte little-endian
/// blobs and every value read back is converted to its declared type.
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "Sqlite"
    }

    fn quoting(&self) -> Quoting {
        Quoting::Quote
    }

    fn row_limit(&self) -> RowLimit {
        RowLimit::Limit
    }

    fn features(&self) -> Features {
        Features {
            type_correction: true,
            max_batch_rows: 500,
            max_parameters: 999,
            max_statement_len: 1_000_000,
            ..Features::default()
        }
    }

    /// Integer width follows the declared bounds.
    fn type_name(&self, col: &ColumnDef) -> PolyResult<String> {
        Ok(match col.ty {
            ColumnType::String | ColumnType::Memo | ColumnType::Xml => "TEXT".to_string(),
            ColumnType::Integer => super::integer_type(col, ["TINYINT", "SMALLINT", "INT", "BIGINT"], false),
            ColumnType::Float => "REAL".to_string(),
            ColumnType::Money => "NUMERIC".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Guid | ColumnType::Binary => "BLOB".to_string(),
            ColumnType::Unknown => return Err(super::unknown_type(self, col)),
        })
    }

    fn placeholder(&self, index: usize) -> String {
        format!(":P{}", index + 1)
    }

    fn guid_literal(&self, g: &Uuid) -> String {
        format!("X'{}'", super::super::traits::hex(&guid_to_le_bytes(g)))
    }

    fn function_name(&self, func: FuncKind) -> PolyResult<&'static str> {
        Ok(match func {
            FuncKind::Substring => "SUBSTR",
            other => other.sql_name(),
        })
    }

    fn prepare_parameter(&self, value: &Value, ty: ColumnType) -> PolyResult<Value> {
        match value.clone().coerce(ty)? {
            Value::Guid(g) => Ok(Value::Binary(guid_to_le_bytes(&g).to_vec())),
            other => Ok(other),
        }
    }

    fn correct_value(&self, value: Value, ty: ColumnType) -> PolyResult<Value> {
        value.coerce(ty)
    }
}
