//! Expression rendering.
//!
//! Expressions never bind parameters: constants inside them go through the
//! dialect's literal formatter, so an expression renders to a plain string
//! that may be repeated safely (e.g. inside `IIF(x IS NULL, d, x)`).

use crate::ast::{AggregateFunc, ColumnType, Expr, FuncKind};
use crate::ast::expr::check_arity;
use crate::error::{PolyError, PolyResult};
use crate::transpiler::traits::{RenderOptions, SqlDialect};

/// Render one expression node, recursing through function arguments.
pub fn render_expr<D: SqlDialect + ?Sized>(
    dialect: &D,
    expr: &Expr,
    opts: RenderOptions,
) -> PolyResult<String> {
    match expr {
        Expr::Constant(c) => dialect.literal(c.value(), c.ty()),
        Expr::Column(col) => {
            let sql = dialect.column(col)?;
            if !opts.null_as_default {
                return Ok(sql);
            }
            if opts.wanted == ColumnType::Unknown {
                return Err(PolyError::invalid(
                    "null-as-default",
                    format!("no column type known for '{}'", col),
                ));
            }
            Ok(dialect.coalesce(&sql, &dialect.default_literal(opts.wanted)?))
        }
        Expr::Function { func, args } => {
            check_arity(*func, args.len())?;
            let rendered = args
                .iter()
                .map(|a| dialect.render_expr(a, RenderOptions::default()))
                .collect::<PolyResult<Vec<_>>>()?;
            dialect.render_function(*func, &rendered)
        }
        Expr::Aggregate { func, arg } => {
            let arg_sql = match arg {
                Some(a) => Some(dialect.render_expr(a, RenderOptions::default())?),
                None if *func == AggregateFunc::Count => None,
                None => {
                    return Err(PolyError::invalid(
                        format!("{} call", func),
                        "needs an argument",
                    ));
                }
            };
            dialect.aggregate(*func, arg_sql.as_deref())
        }
    }
}

/// Default function rendering: coalesce folds into the dialect's two-argument
/// form, concat uses the dialect operator, everything else is `NAME(args)`.
pub fn render_function<D: SqlDialect + ?Sized>(
    dialect: &D,
    func: FuncKind,
    args: &[String],
) -> PolyResult<String> {
    match func {
        FuncKind::Coalesce => {
            let mut iter = args.iter().rev();
            let mut acc = match iter.next() {
                Some(last) => last.clone(),
                None => return Err(PolyError::invalid("COALESCE call", "needs arguments")),
            };
            for a in iter {
                acc = dialect.coalesce(a, &acc);
            }
            Ok(acc)
        }
        FuncKind::Concat => Ok(dialect.concat(args)),
        other => Ok(format!("{}({})", dialect.function_name(other)?, args.join(", "))),
    }
}
