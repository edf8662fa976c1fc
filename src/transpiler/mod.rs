//! SQL compiler for select, filter and order descriptors.
//!
//! Walks the descriptor tree once per request and asks the dialect for every
//! syntactic decision. Output goes into a [`SqlBuffer`] that collects bound
//! parameters in emission order.

pub mod buffer;
pub mod dialect;
pub mod dml;
pub mod expr;
pub mod filter;
pub mod literal;
pub mod order;
pub mod registry;
pub mod sql;
pub mod traits;

#[cfg(test)]
mod tests;

use crate::ast::{Filter, Order, Select};
use crate::error::PolyResult;
pub use buffer::{CompiledStatement, Param, ParamMode, SqlBuffer};
pub use dialect::Dialect;
pub use registry::DialectRegistry;
pub use traits::{Features, Quoting, RenderOptions, RowLimit, SqlDialect};

/// Trait for compiling descriptors to SQL.
pub trait ToSql {
    /// Compile with the default dialect.
    fn to_sql(&self) -> PolyResult<CompiledStatement> {
        self.to_sql_with_dialect(Dialect::default())
    }

    fn to_sql_with_dialect(&self, dialect: Dialect) -> PolyResult<CompiledStatement> {
        self.to_sql_with(dialect.generator().as_ref())
    }

    /// Compile with any dialect, e.g. one taken from a [`DialectRegistry`].
    fn to_sql_with(&self, dialect: &dyn SqlDialect) -> PolyResult<CompiledStatement>;
}

impl ToSql for Select {
    fn to_sql_with(&self, dialect: &dyn SqlDialect) -> PolyResult<CompiledStatement> {
        dml::select::build_select(self, dialect, ParamMode::preferred(dialect))
    }
}

/// Render a standalone WHERE fragment (without the keyword).
pub fn compile_filter(
    dialect: &dyn SqlDialect,
    filter: &Filter,
    mode: ParamMode,
) -> PolyResult<CompiledStatement> {
    let mut buf = SqlBuffer::new(mode);
    dialect.render_filter(filter, &mut buf)?;
    buf.finish(dialect)
}

/// Render a standalone ORDER BY fragment (without the keyword).
pub fn compile_order(dialect: &dyn SqlDialect, order: &Order) -> PolyResult<String> {
    dialect.render_order(order)
}
