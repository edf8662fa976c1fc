//! # polysql
//!
//! Describe a query once, run it on many databases.
//!
//! Queries are built as typed descriptors (expressions, filters, orders and
//! selects) and compiled to SQL text for one of several dialects. A row
//! writer stages, merges and bulk-loads rows in insert, update or
//! insert-or-update mode.
//!
//! ## Quick Example
//!
//! ```
//! use polysql::prelude::*;
//!
//! let select = Select::builder("Orders")?
//!     .column(col("Id"))?
//!     .filter(eq(col("Status"), "open").and(gt(col("Total"), 100)))
//!     .max_rows(10)?
//!     .build();
//!
//! let stmt = select.to_sql_with_dialect(Dialect::MsSql)?;
//! assert_eq!(
//!     stmt.sql,
//!     "SELECT TOP 10 [Id] FROM [Orders] WHERE ([Status] = @P1 AND [Total] > @P2)"
//! );
//! # Ok::<(), polysql::error::PolyError>(())
//! ```

pub mod ast;
pub mod config;
pub mod engine;
pub mod error;
pub mod memory;
pub mod schema;
pub mod transpiler;
pub mod writer;

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::*;
    pub use crate::engine::SqlxExecutor;
    pub use crate::error::*;
    pub use crate::memory::{MemoryTable, ResultSet};
    pub use crate::schema::ColumnDef;
    pub use crate::transpiler::{CompiledStatement, Dialect, DialectRegistry, ParamMode, SqlDialect, ToSql};
    pub use crate::writer::{Executor, RowWriter, WriteMode, WriteSummary};
}

/// Compile a select descriptor for a built-in dialect.
///
/// # Example
///
/// ```
/// use polysql::prelude::*;
///
/// let select = Select::builder("Users").unwrap().build();
/// let stmt = polysql::compile(&select, Dialect::Postgres).unwrap();
/// assert_eq!(stmt.sql, "SELECT * FROM \"Users\"");
/// ```
pub fn compile(select: &ast::Select, dialect: transpiler::Dialect) -> error::PolyResult<transpiler::CompiledStatement> {
    use transpiler::ToSql;
    select.to_sql_with_dialect(dialect)
}
