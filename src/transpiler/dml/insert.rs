//! INSERT SQL generation.

use crate::ast::Value;
use crate::error::{PolyError, PolyResult};
use crate::schema::ColumnDef;
use crate::transpiler::buffer::{CompiledStatement, ParamMode, SqlBuffer};
use crate::transpiler::traits::{quote_table, SqlDialect};

/// Generate `INSERT INTO t (cols) VALUES (..)[, (..)]`.
///
/// More than one row needs a dialect with multi-row INSERT support.
pub fn build_insert<D: SqlDialect + ?Sized>(
    table: &str,
    columns: &[ColumnDef],
    rows: &[Vec<Value>],
    dialect: &D,
    mode: ParamMode,
) -> PolyResult<CompiledStatement> {
    if columns.is_empty() {
        return Err(PolyError::invalid("INSERT", format!("no columns given for '{}'", table)));
    }
    if rows.is_empty() {
        return Err(PolyError::invalid("INSERT", format!("no rows given for '{}'", table)));
    }
    if rows.len() > 1 && !dialect.features().multi_row_insert {
        return Err(PolyError::unsupported(dialect.name(), "multi-row INSERT"));
    }

    let mut buf = SqlBuffer::new(mode);
    buf.push_str("INSERT INTO ");
    buf.push_str(&quote_table(dialect, table)?);

    let cols = columns
        .iter()
        .map(|c| dialect.quote_identifier(&c.name))
        .collect::<PolyResult<Vec<_>>>()?;
    buf.push_str(" (");
    buf.push_str(&cols.join(", "));
    buf.push_str(") VALUES ");

    for (i, row) in rows.iter().enumerate() {
        if row.len() != columns.len() {
            return Err(PolyError::invalid(
                "INSERT row",
                format!("row {} has {} values for {} columns", i, row.len(), columns.len()),
            ));
        }
        if i > 0 {
            buf.push_str(", ");
        }
        buf.push('(');
        for (j, (value, col)) in row.iter().zip(columns).enumerate() {
            if j > 0 {
                buf.push_str(", ");
            }
            buf.push_value(dialect, value, col.ty)?;
        }
        buf.push(')');
    }

    buf.finish(dialect)
}
