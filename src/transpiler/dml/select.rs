//! SELECT SQL generation.

use crate::ast::Select;
use crate::error::{PolyError, PolyResult};
use crate::transpiler::buffer::{CompiledStatement, ParamMode, SqlBuffer};
use crate::transpiler::traits::{quote_table, RenderOptions, RowLimit, SqlDialect};

/// Generate a complete SELECT statement.
pub fn build_select<D: SqlDialect + ?Sized>(
    select: &Select,
    dialect: &D,
    mode: ParamMode,
) -> PolyResult<CompiledStatement> {
    let mut buf = SqlBuffer::new(mode);
    dialect.render_select(select, &mut buf)?;
    buf.finish(dialect)
}

/// Top-level SELECT; a driver-side row cap is recorded on the buffer.
pub fn render_select<D: SqlDialect + ?Sized>(
    dialect: &D,
    select: &Select,
    buf: &mut SqlBuffer,
) -> PolyResult<()> {
    render(dialect, select, buf, false)
}

/// SELECT nested inside another statement.
pub fn render_subquery<D: SqlDialect + ?Sized>(
    dialect: &D,
    select: &Select,
    buf: &mut SqlBuffer,
) -> PolyResult<()> {
    render(dialect, select, buf, true)
}

fn render<D: SqlDialect + ?Sized>(
    dialect: &D,
    select: &Select,
    buf: &mut SqlBuffer,
    nested: bool,
) -> PolyResult<()> {
    let features = dialect.features();
    let limit = dialect.row_limit();
    let max_rows = select.max_rows();

    buf.push_str("SELECT ");
    if select.is_distinct() {
        buf.push_str("DISTINCT ");
    }
    if max_rows > 0 && limit == RowLimit::Top {
        buf.push_str(&format!("TOP {} ", max_rows));
    }

    // Columns
    if select.columns().is_empty() {
        buf.push('*');
    } else {
        let mut cols = Vec::with_capacity(select.columns().len());
        for named in select.columns() {
            let mut sql = dialect.render_expr(named.expr(), RenderOptions::default())?;
            if named.alias_required() {
                sql.push_str(" AS ");
                sql.push_str(&dialect.quote_identifier(named.alias())?);
            }
            cols.push(sql);
        }
        buf.push_str(&cols.join(", "));
    }

    // FROM
    buf.push_str(" FROM ");
    buf.push_str(&quote_table(dialect, select.table())?);
    if let Some(alias) = select.alias() {
        if !features.table_alias {
            return Err(PolyError::unsupported(dialect.name(), "table aliases"));
        }
        buf.push_str(" AS ");
        buf.push_str(&dialect.quote_identifier(alias)?);
    }

    if let Some(filter) = select.filter() {
        buf.push_str(" WHERE ");
        dialect.render_filter(filter, buf)?;
    }

    if select.has_group_by() {
        let groups = select
            .group_by()
            .iter()
            .map(|e| dialect.render_expr(e, RenderOptions::default()))
            .collect::<PolyResult<Vec<_>>>()?;
        buf.push_str(" GROUP BY ");
        buf.push_str(&groups.join(", "));
    }

    if let Some(having) = select.having() {
        buf.push_str(" HAVING ");
        dialect.render_filter(having, buf)?;
    }

    if let Some(order) = select.order() {
        buf.push_str(" ORDER BY ");
        buf.push_str(&dialect.render_order(order)?);
    }

    if max_rows > 0 {
        match limit {
            RowLimit::Top => {}
            RowLimit::Limit => buf.push_str(&format!(" LIMIT {}", max_rows)),
            RowLimit::Driver if nested => {
                return Err(PolyError::unsupported(dialect.name(), "row limit in a subquery"));
            }
            RowLimit::Driver => buf.set_max_rows(max_rows),
        }
    }

    Ok(())
}
