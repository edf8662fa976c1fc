//! Dialect contract and shared rendering helpers.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use uuid::Uuid;

use crate::ast::{AggregateFunc, ColumnRef, ColumnType, Expr, Filter, FuncKind, Order, Select, Value};
use crate::error::{PolyError, PolyResult};
use crate::schema::ColumnDef;
use crate::transpiler::buffer::SqlBuffer;
use crate::transpiler::{dml, expr, filter, literal, order};

/// How a dialect quotes identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Quoting {
    /// Identifiers are emitted as-is and must be plain words.
    None,
    /// `[name]`
    Bracket,
    /// `"name"`
    Quote,
}

/// Where a row cap goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowLimit {
    /// `SELECT TOP n ...`
    Top,
    /// `... LIMIT n`
    Limit,
    /// No clause; the executor caps the row count.
    Driver,
}

/// Capabilities consulted before emitting a construct.
///
/// Size limits of 0 mean unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Features {
    pub between: bool,
    pub in_subquery: bool,
    pub parameters: bool,
    /// Text values may be bound; otherwise they are inlined as literals.
    pub parameterized_text: bool,
    pub table_alias: bool,
    pub aggregates: bool,
    /// The backend has a native bulk-load facility.
    pub bulk_load: bool,
    /// `INSERT ... VALUES (..), (..)` is accepted.
    pub multi_row_insert: bool,
    /// Every filter leaf is wrapped in parentheses.
    pub parenthesize_filters: bool,
    /// Result values need [`SqlDialect::correct_value`] after a SELECT.
    pub type_correction: bool,
    pub max_in_list: usize,
    pub max_batch_rows: usize,
    pub max_parameters: usize,
    pub max_statement_len: usize,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            between: true,
            in_subquery: true,
            parameters: true,
            parameterized_text: true,
            table_alias: true,
            aggregates: true,
            bulk_load: false,
            multi_row_insert: true,
            parenthesize_filters: false,
            type_correction: false,
            max_in_list: 0,
            max_batch_rows: 1000,
            max_parameters: 0,
            max_statement_len: 0,
        }
    }
}

impl Features {
    /// Rows per multi-row INSERT for `columns` columns, honoring both the row
    /// and the parameter limit. Never below 1.
    pub fn batch_rows(&self, columns: usize) -> usize {
        let mut rows = if self.max_batch_rows == 0 { 1000 } else { self.max_batch_rows };
        if !self.multi_row_insert {
            rows = 1;
        }
        if self.max_parameters > 0 && columns > 0 {
            rows = rows.min(self.max_parameters / columns);
        }
        rows.max(1)
    }
}

/// Expression rendering flags.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Wrap a bare column in `coalesce(column, default(wanted))`.
    pub null_as_default: bool,
    /// Type the surrounding context expects.
    pub wanted: ColumnType,
}

impl RenderOptions {
    pub fn null_as_default(wanted: ColumnType) -> Self {
        Self {
            null_as_default: true,
            wanted,
        }
    }
}

/// Trait for dialect-specific SQL generation.
///
/// One method per syntactic concern. Every method except the identity ones
/// has a default; a dialect overrides only what differs.
pub trait SqlDialect: Send + Sync {
    /// Display name, used in error messages.
    fn name(&self) -> &'static str;
    fn quoting(&self) -> Quoting;
    fn row_limit(&self) -> RowLimit;
    fn features(&self) -> Features;
    /// Native storage type for a column.
    fn type_name(&self, col: &ColumnDef) -> PolyResult<String>;

    /// Quote one identifier part.
    fn quote_identifier(&self, name: &str) -> PolyResult<String> {
        quote_with(self.quoting(), name)
    }

    /// Render a (possibly dotted) column reference.
    fn column(&self, col: &ColumnRef) -> PolyResult<String> {
        col.parts()
            .iter()
            .map(|p| self.quote_identifier(p))
            .collect::<PolyResult<Vec<_>>>()
            .map(|parts| parts.join("."))
    }

    /// Placeholder for a zero-based parameter index.
    fn placeholder(&self, index: usize) -> String {
        format!("@P{}", index + 1)
    }

    /// Literal text for a value of the given type.
    fn literal(&self, value: &Value, ty: ColumnType) -> PolyResult<String> {
        literal::render_literal(self, value, ty)
    }

    fn null_literal(&self, _ty: ColumnType) -> PolyResult<String> {
        Ok("NULL".to_string())
    }

    fn bool_literal(&self, val: bool) -> String {
        if val { "1".to_string() } else { "0".to_string() }
    }

    fn string_literal(&self, s: &str) -> String {
        quote_text(s)
    }

    fn date_literal(&self, d: NaiveDate) -> String {
        format!("'{}'", d.format("%Y-%m-%d"))
    }

    fn time_literal(&self, t: NaiveTime) -> String {
        format!("'{}'", t.format("%H:%M:%S%.f"))
    }

    fn datetime_literal(&self, dt: NaiveDateTime) -> String {
        format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f"))
    }

    fn guid_literal(&self, g: &Uuid) -> String {
        format!("'{}'", g.hyphenated())
    }

    fn binary_literal(&self, bytes: &[u8]) -> PolyResult<String> {
        Ok(format!("X'{}'", hex(bytes)))
    }

    /// The value a NULL of `ty` stands for.
    fn default_value(&self, ty: ColumnType) -> Value {
        ty.default_value()
    }

    fn default_literal(&self, ty: ColumnType) -> PolyResult<String> {
        if ty == ColumnType::Unknown {
            return Err(PolyError::invalid("default value", "column type is unknown"));
        }
        self.literal(&self.default_value(ty), ty)
    }

    fn function_name(&self, func: FuncKind) -> PolyResult<&'static str> {
        Ok(func.sql_name())
    }

    /// Two-argument coalesce form.
    fn coalesce(&self, expr: &str, fallback: &str) -> String {
        format!("COALESCE({}, {})", expr, fallback)
    }

    /// NULL-propagating string concatenation.
    fn concat(&self, parts: &[String]) -> String {
        format!("({})", parts.join(" || "))
    }

    fn render_function(&self, func: FuncKind, args: &[String]) -> PolyResult<String> {
        expr::render_function(self, func, args)
    }

    fn aggregate(&self, func: AggregateFunc, arg: Option<&str>) -> PolyResult<String> {
        if !self.features().aggregates {
            return Err(PolyError::unsupported(self.name(), "aggregate functions"));
        }
        Ok(format!("{}({})", func, arg.unwrap_or("*")))
    }

    fn render_expr(&self, expr: &Expr, opts: RenderOptions) -> PolyResult<String> {
        expr::render_expr(self, expr, opts)
    }

    fn render_filter(&self, filter: &Filter, buf: &mut SqlBuffer) -> PolyResult<()> {
        filter::render_filter(self, filter, buf)
    }

    fn render_order(&self, order: &Order) -> PolyResult<String> {
        order::render_order(self, order)
    }

    fn render_select(&self, select: &Select, buf: &mut SqlBuffer) -> PolyResult<()> {
        dml::select::render_select(self, select, buf)
    }

    /// Unconditional filter text.
    fn filter_constant(&self, val: bool) -> String {
        if val { "1=1".to_string() } else { "1=0".to_string() }
    }

    /// Escape LIKE wildcards in `text`.
    fn escape_like(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            if matches!(c, '\\' | '%' | '_') {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }

    /// Suffix after a LIKE pattern produced by [`SqlDialect::escape_like`].
    fn like_escape_clause(&self) -> &'static str {
        " ESCAPE '\\'"
    }

    /// Convert a value before it is bound as a parameter.
    fn prepare_parameter(&self, value: &Value, ty: ColumnType) -> PolyResult<Value> {
        value.clone().coerce(ty)
    }

    /// Fix up a value read back from the backend.
    fn correct_value(&self, value: Value, _ty: ColumnType) -> PolyResult<Value> {
        Ok(value)
    }

    /// Read a literal this dialect emitted back into a value.
    fn parse_literal(&self, text: &str, ty: ColumnType) -> PolyResult<Value> {
        literal::parse_literal(text, ty)
    }
}

/// Quote an identifier part according to a quoting mode.
pub fn quote_with(quoting: Quoting, name: &str) -> PolyResult<String> {
    if name.is_empty() {
        return Err(PolyError::invalid("identifier", "must not be empty"));
    }
    match quoting {
        Quoting::Bracket => Ok(format!("[{}]", name.replace(']', "]]"))),
        Quoting::Quote => Ok(format!("\"{}\"", name.replace('"', "\"\""))),
        Quoting::None => {
            let plain = name.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '$' | '#' | '@'))
                && !name.starts_with(|c: char| c.is_ascii_digit());
            if plain {
                Ok(name.to_string())
            } else {
                Err(PolyError::invalid(
                    "identifier",
                    format!("'{}' cannot be used without quoting", name),
                ))
            }
        }
    }
}

/// Quote a dotted table path (`schema.table`).
pub fn quote_table<D: SqlDialect + ?Sized>(dialect: &D, table: &str) -> PolyResult<String> {
    if table.trim().is_empty() {
        return Err(PolyError::invalid("table name", "must not be empty"));
    }
    table
        .split('.')
        .map(|p| dialect.quote_identifier(p.trim()))
        .collect::<PolyResult<Vec<_>>>()
        .map(|parts| parts.join("."))
}

/// `'text'` with embedded quotes doubled.
pub fn quote_text(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

/// Upper-case hex without separators.
pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}

/// Escape LIKE wildcards by wrapping each special character in brackets.
pub fn bracket_escape_like(text: &str, specials: &[char]) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if specials.contains(&c) {
            out.push('[');
            out.push(c);
            out.push(']');
        } else {
            out.push(c);
        }
    }
    out
}

/// Whether a date-time carries a sub-second part.
pub(crate) fn has_fraction(t: &NaiveTime) -> bool {
    t.nanosecond() != 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_with() {
        assert_eq!(quote_with(Quoting::Bracket, "a]b").unwrap(), "[a]]b]");
        assert_eq!(quote_with(Quoting::Quote, "a\"b").unwrap(), "\"a\"\"b\"");
        assert_eq!(quote_with(Quoting::None, "ORDERS").unwrap(), "ORDERS");
        assert!(quote_with(Quoting::None, "Order Lines").is_err());
        assert!(quote_with(Quoting::Quote, "").is_err());
    }

    #[test]
    fn test_batch_rows() {
        let f = Features {
            max_batch_rows: 500,
            max_parameters: 999,
            ..Features::default()
        };
        assert_eq!(f.batch_rows(4), 249);
        assert_eq!(f.batch_rows(2000), 1);
        let single = Features {
            multi_row_insert: false,
            ..Features::default()
        };
        assert_eq!(single.batch_rows(3), 1);
    }

    #[test]
    fn test_bracket_escape_like() {
        assert_eq!(bracket_escape_like("50%_off", &['%', '_']), "50[%][_]off");
    }
}
