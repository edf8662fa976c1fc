//! ORDER BY rendering.

use crate::ast::Order;
use crate::error::PolyResult;
use crate::transpiler::traits::{RenderOptions, SqlDialect};

/// Render the terms of an ORDER BY clause, without the keyword.
///
/// A part with a NULL substitute sorts on `coalesce(expr, substitute)`; NULL
/// placement is otherwise left to the engine.
pub fn render_order<D: SqlDialect + ?Sized>(dialect: &D, order: &Order) -> PolyResult<String> {
    let mut terms = Vec::with_capacity(order.parts().len());
    for part in order.parts() {
        let mut sql = dialect.render_expr(&part.expr, RenderOptions::default())?;
        if let Some(sub) = &part.null_substitute {
            let sub_sql = dialect.render_expr(sub, RenderOptions::default())?;
            sql = dialect.coalesce(&sql, &sub_sql);
        }
        terms.push(format!("{} {}", sql, part.order));
    }
    Ok(terms.join(", "))
}
