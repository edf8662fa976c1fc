pub mod builders;
pub mod expr;
pub mod filter;
pub mod named;
pub mod operators;
pub mod order;
pub mod select;
pub mod types;
pub mod values;

pub use self::expr::{Aggregation, ColumnRef, Constant, Expr};
pub use self::filter::Filter;
pub use self::named::{NamedExpr, NamedExprList};
pub use self::operators::{AggregateFunc, CompareOp, FuncKind, SortOrder};
pub use self::order::{Order, OrderPart};
pub use self::select::{Select, SelectBuilder};
pub use self::types::ColumnType;
pub use self::values::Value;
