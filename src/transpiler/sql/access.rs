use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use super::super::traits::{bracket_escape_like, Features, Quoting, RowLimit, SqlDialect};
use crate::ast::{ColumnType, FuncKind};
use crate::error::{PolyError, PolyResult};
use crate::schema::ColumnDef;

/// Desktop file database.
///
/// Text can never be bound, filter leaves are parenthesized and a subquery
/// cannot appear inside `IN`. Inserts go one row per statement.
pub struct AccessDialect;

impl SqlDialect for AccessDialect {
    fn name(&self) -> &'static str {
        "Access"
    }

    fn quoting(&self) -> Quoting {
        Quoting::Bracket
    }

    fn row_limit(&self) -> RowLimit {
        RowLimit::Top
    }

    fn features(&self) -> Features {
        Features {
            in_subquery: false,
            parameterized_text: false,
            parenthesize_filters: true,
            multi_row_insert: false,
            max_batch_rows: 1,
            max_statement_len: 64_000,
            ..Features::default()
        }
    }

    fn type_name(&self, col: &ColumnDef) -> PolyResult<String> {
        Ok(match col.ty {
            ColumnType::String => match col.max_len {
                Some(n) if n <= 255 => format!("TEXT({})", n),
                _ => "MEMO".to_string(),
            },
            ColumnType::Integer => super::integer_type(col, ["BYTE", "SHORT", "LONG", "DECIMAL(19, 0)"], true),
            ColumnType::Float => "DOUBLE".to_string(),
            ColumnType::Money => "CURRENCY".to_string(),
            ColumnType::Boolean => "BIT".to_string(),
            ColumnType::Date | ColumnType::Time | ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Guid => "GUID".to_string(),
            ColumnType::Binary => "LONGBINARY".to_string(),
            ColumnType::Memo | ColumnType::Xml => "MEMO".to_string(),
            ColumnType::Unknown => return Err(super::unknown_type(self, col)),
        })
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "True".to_string() } else { "False".to_string() }
    }

    fn date_literal(&self, d: NaiveDate) -> String {
        format!("#{}#", d.format("%Y-%m-%d"))
    }

    fn time_literal(&self, t: NaiveTime) -> String {
        format!("#{}#", t.format("%H:%M:%S"))
    }

    fn datetime_literal(&self, dt: NaiveDateTime) -> String {
        format!("#{}#", dt.format("%Y-%m-%d %H:%M:%S"))
    }

    fn guid_literal(&self, g: &Uuid) -> String {
        format!("'{}'", g.braced())
    }

    fn binary_literal(&self, _bytes: &[u8]) -> PolyResult<String> {
        Err(PolyError::unsupported(self.name(), "binary literals"))
    }

    fn function_name(&self, func: FuncKind) -> PolyResult<&'static str> {
        Ok(match func {
            FuncKind::Upper => "UCASE",
            FuncKind::Lower => "LCASE",
            FuncKind::Length => "LEN",
            FuncKind::Substring => "MID",
            other => other.sql_name(),
        })
    }

    fn coalesce(&self, expr: &str, fallback: &str) -> String {
        format!("IIF({} IS NULL, {}, {})", expr, fallback, expr)
    }

    fn concat(&self, parts: &[String]) -> String {
        format!("({})", parts.join(" + "))
    }

    fn escape_like(&self, text: &str) -> String {
        bracket_escape_like(text, &['%', '_', '['])
    }

    fn like_escape_clause(&self) -> &'static str {
        ""
    }
}
