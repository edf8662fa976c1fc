use chrono::{NaiveDate, NaiveDateTime};

use super::super::traits::{bracket_escape_like, Features, Quoting, RowLimit, SqlDialect};
use crate::ast::{ColumnType, FuncKind};
use crate::error::PolyResult;
use crate::schema::ColumnDef;
use crate::transpiler::expr::render_function;

/// Transactional server engine: `[name]`, `N'text'`, `ISNULL`, `@P1`, `TOP n`.
pub struct MsSqlDialect;

impl SqlDialect for MsSqlDialect {
    fn name(&self) -> &'static str {
        "MsSql"
    }

    fn quoting(&self) -> Quoting {
        Quoting::Bracket
    }

    fn row_limit(&self) -> RowLimit {
        RowLimit::Top
    }

    fn features(&self) -> Features {
        Features {
            bulk_load: true,
            max_in_list: 1000,
            max_batch_rows: 1000,
            max_parameters: 2100,
            ..Features::default()
        }
    }

    fn type_name(&self, col: &ColumnDef) -> PolyResult<String> {
        Ok(match col.ty {
            ColumnType::String => match col.max_len {
                Some(n) if n <= 4000 => format!("NVARCHAR({})", n),
                _ => "NVARCHAR(MAX)".to_string(),
            },
            ColumnType::Integer => super::integer_type(col, ["TINYINT", "SMALLINT", "INT", "BIGINT"], true),
            ColumnType::Float => "FLOAT".to_string(),
            ColumnType::Money => "DECIMAL(19, 4)".to_string(),
            ColumnType::Boolean => "BIT".to_string(),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime => "DATETIME2".to_string(),
            ColumnType::Guid => "UNIQUEIDENTIFIER".to_string(),
            ColumnType::Binary => "VARBINARY(MAX)".to_string(),
            ColumnType::Memo => "NVARCHAR(MAX)".to_string(),
            ColumnType::Xml => "XML".to_string(),
            ColumnType::Unknown => return Err(super::unknown_type(self, col)),
        })
    }

    fn string_literal(&self, s: &str) -> String {
        format!("N'{}'", s.replace('\'', "''"))
    }

    fn date_literal(&self, d: NaiveDate) -> String {
        format!("'{}'", d.format("%Y%m%d"))
    }

    fn datetime_literal(&self, dt: NaiveDateTime) -> String {
        format!("'{}'", dt.format("%Y%m%d %H:%M:%S%.f"))
    }

    fn binary_literal(&self, bytes: &[u8]) -> PolyResult<String> {
        Ok(format!("0x{}", super::super::traits::hex(bytes)))
    }

    fn function_name(&self, func: FuncKind) -> PolyResult<&'static str> {
        Ok(match func {
            FuncKind::Length => "LEN",
            other => other.sql_name(),
        })
    }

    fn coalesce(&self, expr: &str, fallback: &str) -> String {
        format!("ISNULL({}, {})", expr, fallback)
    }

    fn concat(&self, parts: &[String]) -> String {
        format!("({})", parts.join(" + "))
    }

    fn render_function(&self, func: FuncKind, args: &[String]) -> PolyResult<String> {
        match (func, args) {
            // SUBSTRING needs an explicit length here
            (FuncKind::Substring, [text, start]) => Ok(format!("SUBSTRING({}, {}, LEN({}))", text, start, text)),
            (FuncKind::Trim, [text]) => Ok(format!("LTRIM(RTRIM({}))", text)),
            _ => render_function(self, func, args),
        }
    }

    fn escape_like(&self, text: &str) -> String {
        bracket_escape_like(text, &['%', '_', '['])
    }

    fn like_escape_clause(&self) -> &'static str {
        ""
    }
}
