//! Filter rendering.
//!
//! NULL handling follows two-valued equality: `= NULL` becomes `IS NULL`, and
//! `x <> v` also matches rows where `x` is NULL unless null-as-default is
//! requested, in which case `x` is coalesced to its type's default.

use crate::ast::{CompareOp, Constant, ColumnType, Expr, Filter, Value};
use crate::error::{PolyError, PolyResult};
use crate::transpiler::buffer::SqlBuffer;
use crate::transpiler::dml;
use crate::transpiler::traits::{RenderOptions, SqlDialect};

pub fn render_filter<D: SqlDialect + ?Sized>(
    dialect: &D,
    filter: &Filter,
    buf: &mut SqlBuffer,
) -> PolyResult<()> {
    match filter {
        Filter::And(parts) => render_junction(dialect, parts, " AND ", true, buf),
        Filter::Or(parts) => render_junction(dialect, parts, " OR ", false, buf),
        Filter::Not(inner) => {
            buf.push_str("NOT (");
            dialect.render_filter(inner, buf)?;
            buf.push(')');
            Ok(())
        }
        leaf => {
            let wrap = dialect.features().parenthesize_filters;
            if wrap {
                buf.push('(');
            }
            render_leaf(dialect, leaf, buf)?;
            if wrap {
                buf.push(')');
            }
            Ok(())
        }
    }
}

fn render_junction<D: SqlDialect + ?Sized>(
    dialect: &D,
    parts: &[Filter],
    sep: &str,
    empty: bool,
    buf: &mut SqlBuffer,
) -> PolyResult<()> {
    match parts {
        [] => {
            buf.push_str(&dialect.filter_constant(empty));
            Ok(())
        }
        [only] => dialect.render_filter(only, buf),
        _ => {
            buf.push('(');
            for (i, p) in parts.iter().enumerate() {
                if i > 0 {
                    buf.push_str(sep);
                }
                dialect.render_filter(p, buf)?;
            }
            buf.push(')');
            Ok(())
        }
    }
}

fn render_leaf<D: SqlDialect + ?Sized>(
    dialect: &D,
    filter: &Filter,
    buf: &mut SqlBuffer,
) -> PolyResult<()> {
    let features = dialect.features();
    match filter {
        Filter::Compare {
            expr,
            op,
            value,
            null_as_default,
        } => render_compare(dialect, expr, *op, value, *null_as_default, buf),
        Filter::CompareNull { expr, negated } => {
            let lhs = dialect.render_expr(expr, RenderOptions::default())?;
            buf.push_str(&lhs);
            buf.push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            Ok(())
        }
        Filter::In { expr, values } => render_in(dialect, expr, values, features.max_in_list, buf),
        Filter::StartsWith { expr, prefix } => {
            let pattern = format!("{}%", dialect.escape_like(prefix));
            render_like(dialect, expr, &pattern, buf)
        }
        Filter::Contains { expr, needle } => {
            let pattern = format!("%{}%", dialect.escape_like(needle));
            render_like(dialect, expr, &pattern, buf)
        }
        Filter::InSubquery { expr, subquery } => {
            if !features.in_subquery {
                return Err(PolyError::unsupported(dialect.name(), "IN (subquery)"));
            }
            if subquery.columns().len() != 1 {
                return Err(PolyError::invalid(
                    "subquery",
                    format!(
                        "IN subquery on '{}' must project exactly one column, got {}",
                        subquery.table(),
                        subquery.columns().len()
                    ),
                ));
            }
            let lhs = dialect.render_expr(expr, RenderOptions::default())?;
            buf.push_str(&lhs);
            buf.push_str(" IN (");
            dml::select::render_subquery(dialect, subquery, buf)?;
            buf.push(')');
            Ok(())
        }
        Filter::Between { expr, low, high } => {
            if low.is_null() || high.is_null() {
                return Err(PolyError::invalid("BETWEEN bounds", "must not be NULL"));
            }
            let lhs = dialect.render_expr(expr, RenderOptions::default())?;
            if features.between {
                buf.push_str(&lhs);
                buf.push_str(" BETWEEN ");
                buf.push_value(dialect, low.value(), low.ty())?;
                buf.push_str(" AND ");
                buf.push_value(dialect, high.value(), high.ty())?;
            } else {
                buf.push('(');
                buf.push_str(&lhs);
                buf.push_str(" >= ");
                buf.push_value(dialect, low.value(), low.ty())?;
                buf.push_str(" AND ");
                buf.push_str(&lhs);
                buf.push_str(" <= ");
                buf.push_value(dialect, high.value(), high.ty())?;
                buf.push(')');
            }
            Ok(())
        }
        Filter::Constant(b) => {
            buf.push_str(&dialect.filter_constant(*b));
            Ok(())
        }
        Filter::And(_) | Filter::Or(_) | Filter::Not(_) => dialect.render_filter(filter, buf),
    }
}

fn render_compare<D: SqlDialect + ?Sized>(
    dialect: &D,
    expr: &Expr,
    op: CompareOp,
    value: &Constant,
    null_as_default: bool,
    buf: &mut SqlBuffer,
) -> PolyResult<()> {
    if value.is_null() {
        let lhs = dialect.render_expr(expr, RenderOptions::default())?;
        match op {
            CompareOp::Eq => buf.push_str(&format!("{} IS NULL", lhs)),
            CompareOp::Ne => buf.push_str(&format!("{} IS NOT NULL", lhs)),
            // An ordering against NULL matches nothing.
            _ => buf.push_str(&dialect.filter_constant(false)),
        }
        return Ok(());
    }
    let opts = if null_as_default {
        RenderOptions::null_as_default(value.ty())
    } else {
        RenderOptions::default()
    };
    let lhs = dialect.render_expr(expr, opts)?;
    if op == CompareOp::Ne && !null_as_default {
        buf.push('(');
        buf.push_str(&lhs);
        buf.push_str(" <> ");
        buf.push_value(dialect, value.value(), value.ty())?;
        buf.push_str(" OR ");
        buf.push_str(&lhs);
        buf.push_str(" IS NULL)");
        return Ok(());
    }
    buf.push_str(&lhs);
    buf.push(' ');
    buf.push_str(op.sql());
    buf.push(' ');
    buf.push_value(dialect, value.value(), value.ty())
}

/// `x IN (..)`, split into OR-ed groups when the list exceeds the dialect's
/// limit. NULL entries add an `IS NULL` alternative.
fn render_in<D: SqlDialect + ?Sized>(
    dialect: &D,
    expr: &Expr,
    values: &[Constant],
    max_in_list: usize,
    buf: &mut SqlBuffer,
) -> PolyResult<()> {
    let has_null = values.iter().any(Constant::is_null);
    let non_null: Vec<&Constant> = values.iter().filter(|c| !c.is_null()).collect();
    if non_null.is_empty() && !has_null {
        buf.push_str(&dialect.filter_constant(false));
        return Ok(());
    }
    let lhs = dialect.render_expr(expr, RenderOptions::default())?;
    let chunk = if max_in_list == 0 { non_null.len().max(1) } else { max_in_list };
    let groups: Vec<&[&Constant]> = non_null.chunks(chunk).collect();
    let terms = groups.len() + usize::from(has_null);
    if terms > 1 {
        buf.push('(');
    }
    for (i, group) in groups.iter().enumerate() {
        if i > 0 {
            buf.push_str(" OR ");
        }
        buf.push_str(&lhs);
        buf.push_str(" IN (");
        for (j, c) in group.iter().enumerate() {
            if j > 0 {
                buf.push_str(", ");
            }
            buf.push_value(dialect, c.value(), c.ty())?;
        }
        buf.push(')');
    }
    if has_null {
        if !groups.is_empty() {
            buf.push_str(" OR ");
        }
        buf.push_str(&lhs);
        buf.push_str(" IS NULL");
    }
    if terms > 1 {
        buf.push(')');
    }
    Ok(())
}

fn render_like<D: SqlDialect + ?Sized>(
    dialect: &D,
    expr: &Expr,
    pattern: &str,
    buf: &mut SqlBuffer,
) -> PolyResult<()> {
    let lhs = dialect.render_expr(expr, RenderOptions::default())?;
    buf.push_str(&lhs);
    buf.push_str(" LIKE ");
    buf.push_value(dialect, &Value::String(pattern.to_string()), ColumnType::String)?;
    buf.push_str(dialect.like_escape_clause());
    Ok(())
}
