//! Contract between the row writer and whatever runs statements.

use crate::ast::Value;
use crate::error::PolyResult;
use crate::schema::ColumnDef;
use crate::transpiler::CompiledStatement;

/// One bulk-load request: rows laid out in `columns` order.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkLoad<'a> {
    pub table: &'a str,
    pub columns: &'a [ColumnDef],
    pub rows: &'a [Vec<Value>],
    /// Caller-supplied key values must be kept as given.
    pub keep_identity: bool,
}

/// Statement runner used by [`RowWriter`](super::RowWriter).
///
/// Calls are synchronous; waiting on the backend happens inside the
/// implementation.
pub trait Executor {
    /// Run a non-query statement and report the affected row count. `None`
    /// means the backend gave no count.
    fn execute(&mut self, stmt: &CompiledStatement) -> PolyResult<Option<u64>>;

    /// Write many rows at once through the backend's native facility.
    fn bulk_load(&mut self, load: &BulkLoad<'_>) -> PolyResult<u64>;
}
