//! DELETE SQL generation.

use crate::ast::Filter;
use crate::error::PolyResult;
use crate::transpiler::buffer::{CompiledStatement, ParamMode, SqlBuffer};
use crate::transpiler::traits::{quote_table, SqlDialect};

/// Generate DELETE SQL. Without a filter every row of the table is deleted.
pub fn build_delete<D: SqlDialect + ?Sized>(
    table: &str,
    filter: Option<&Filter>,
    dialect: &D,
    mode: ParamMode,
) -> PolyResult<CompiledStatement> {
    let mut buf = SqlBuffer::new(mode);
    buf.push_str("DELETE FROM ");
    buf.push_str(&quote_table(dialect, table)?);
    if let Some(f) = filter {
        buf.push_str(" WHERE ");
        dialect.render_filter(f, &mut buf)?;
    }
    buf.finish(dialect)
}
