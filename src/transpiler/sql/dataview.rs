use chrono::{NaiveDate, NaiveDateTime};

use super::super::traits::{bracket_escape_like, Features, Quoting, RowLimit, SqlDialect};
use crate::ast::{ColumnRef, ColumnType, FuncKind, Select};
use crate::error::{PolyError, PolyResult};
use crate::schema::ColumnDef;
use crate::transpiler::buffer::SqlBuffer;
use crate::transpiler::expr::render_function;

/// Row-filter syntax of an in-memory tabular view.
///
/// There is no server behind it: only filter and order fragments can be
/// rendered, every value is inlined and anything the local evaluator cannot
/// run is rejected up front.
pub struct DataViewDialect;

impl SqlDialect for DataViewDialect {
    fn name(&self) -> &'static str {
        "DataView"
    }

    fn quoting(&self) -> Quoting {
        Quoting::Bracket
    }

    fn row_limit(&self) -> RowLimit {
        RowLimit::Driver
    }

    fn features(&self) -> Features {
        Features {
            between: false,
            in_subquery: false,
            parameters: false,
            parameterized_text: false,
            table_alias: false,
            aggregates: false,
            bulk_load: false,
            multi_row_insert: false,
            parenthesize_filters: false,
            type_correction: false,
            max_in_list: 0,
            max_batch_rows: 0,
            max_parameters: 0,
            max_statement_len: 0,
        }
    }

    fn type_name(&self, col: &ColumnDef) -> PolyResult<String> {
        match col.ty {
            ColumnType::Unknown => Err(super::unknown_type(self, col)),
            ty => Ok(ty.name().to_uppercase()),
        }
    }

    /// Brackets with `\` and `]` escaped by a backslash.
    fn quote_identifier(&self, name: &str) -> PolyResult<String> {
        if name.is_empty() {
            return Err(PolyError::invalid("identifier", "must not be empty"));
        }
        let mut out = String::with_capacity(name.len() + 2);
        out.push('[');
        for c in name.chars() {
            if matches!(c, '\\' | ']') {
                out.push('\\');
            }
            out.push(c);
        }
        out.push(']');
        Ok(out)
    }

    fn column(&self, col: &ColumnRef) -> PolyResult<String> {
        if col.is_qualified() {
            return Err(PolyError::unsupported(
                self.name(),
                format!("qualified column '{}'", col.full_name()),
            ));
        }
        self.quote_identifier(col.name())
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "true".to_string() } else { "false".to_string() }
    }

    fn date_literal(&self, d: NaiveDate) -> String {
        format!("#{}#", d.format("%m/%d/%Y"))
    }

    fn datetime_literal(&self, dt: NaiveDateTime) -> String {
        format!("#{}#", dt.format("%m/%d/%Y %H:%M:%S"))
    }

    fn binary_literal(&self, _bytes: &[u8]) -> PolyResult<String> {
        Err(PolyError::unsupported(self.name(), "binary literals"))
    }

    fn function_name(&self, func: FuncKind) -> PolyResult<&'static str> {
        match func {
            FuncKind::Length => Ok("LEN"),
            FuncKind::Upper | FuncKind::Lower | FuncKind::Abs => {
                Err(PolyError::unsupported(self.name(), format!("function {}", func)))
            }
            other => Ok(other.sql_name()),
        }
    }

    fn coalesce(&self, expr: &str, fallback: &str) -> String {
        format!("ISNULL({}, {})", expr, fallback)
    }

    fn concat(&self, parts: &[String]) -> String {
        format!("({})", parts.join(" + "))
    }

    fn render_function(&self, func: FuncKind, args: &[String]) -> PolyResult<String> {
        match (func, args) {
            (FuncKind::Substring, [text, start]) => Ok(format!("SUBSTRING({}, {}, LEN({}))", text, start, text)),
            _ => render_function(self, func, args),
        }
    }

    fn render_select(&self, _select: &Select, _buf: &mut SqlBuffer) -> PolyResult<()> {
        Err(PolyError::unsupported(self.name(), "SELECT statements"))
    }

    fn filter_constant(&self, val: bool) -> String {
        self.bool_literal(val)
    }

    fn escape_like(&self, text: &str) -> String {
        bracket_escape_like(text, &['*', '%', '[', ']'])
    }

    fn like_escape_clause(&self) -> &'static str {
        ""
    }
}
