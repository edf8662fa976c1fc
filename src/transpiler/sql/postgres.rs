use super::super::traits::{Features, Quoting, RowLimit, SqlDialect};
use crate::ast::ColumnType;
use crate::error::PolyResult;
use crate::schema::ColumnDef;

/// Open-source relational engine: `"name"`, `TRUE`, `'\x..'::bytea`, `LIMIT n`.
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "Postgres"
    }

    fn quoting(&self) -> Quoting {
        Quoting::Quote
    }

    fn row_limit(&self) -> RowLimit {
        RowLimit::Limit
    }

    fn features(&self) -> Features {
        Features {
            bulk_load: true,
            max_parameters: 65535,
            ..Features::default()
        }
    }

    fn type_name(&self, col: &ColumnDef) -> PolyResult<String> {
        Ok(match col.ty {
            ColumnType::String => match col.max_len {
                Some(n) => format!("VARCHAR({})", n),
                None => "TEXT".to_string(),
            },
            ColumnType::Integer => super::integer_type(col, ["SMALLINT", "SMALLINT", "INTEGER", "BIGINT"], false),
            ColumnType::Float => "DOUBLE PRECISION".to_string(),
            ColumnType::Money => "NUMERIC(19, 4)".to_string(),
            ColumnType::Boolean => "BOOLEAN".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime => "TIMESTAMP".to_string(),
            ColumnType::Guid => "UUID".to_string(),
            ColumnType::Binary => "BYTEA".to_string(),
            ColumnType::Memo => "TEXT".to_string(),
            ColumnType::Xml => "XML".to_string(),
            ColumnType::Unknown => return Err(super::unknown_type(self, col)),
        })
    }

    fn null_literal(&self, ty: ColumnType) -> PolyResult<String> {
        if ty == ColumnType::Unknown {
            return Ok("NULL".to_string());
        }
        Ok(format!("CAST(NULL AS {})", self.type_name(&ColumnDef::new("", ty))?))
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "TRUE".to_string() } else { "FALSE".to_string() }
    }

    fn binary_literal(&self, bytes: &[u8]) -> PolyResult<String> {
        Ok(format!("'\\x{}'::bytea", super::super::traits::hex(bytes).to_lowercase()))
    }
}
