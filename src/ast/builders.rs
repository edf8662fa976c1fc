//! Ergonomic builder functions for expressions, filters and orders.
//!
//! Column names given here are checked when the expression is rendered; use
//! [`Expr::column`] to validate at construction time instead.
//!
//! # Example
//! ```
//! use polysql::ast::builders::*;
//!
//! let f = eq(col("Active"), true).and(starts_with(col("Name"), "Jo"));
//! let o = desc(col("CreatedAt")).then_asc(col("Id"));
//! # let _ = (f, o);
//! ```

use crate::ast::{AggregateFunc, ColumnRef, CompareOp, Constant, Expr, Filter, FuncKind, Order, Select};

/// Column reference.
pub fn col(path: &str) -> Expr {
    Expr::Column(ColumnRef::unchecked(path))
}

/// Constant expression. A NULL needs its type spelled out:
///
/// ```
/// use polysql::ast::builders::lit;
/// use polysql::ast::{ColumnType, Constant};
///
/// let n = lit(Constant::null(ColumnType::String).unwrap());
/// # let _ = n;
/// ```
///
/// ```compile_fail
/// use polysql::ast::builders::lit;
/// use polysql::ast::Value;
///
/// let n = lit(Value::Null);
/// ```
pub fn lit(value: impl Into<Constant>) -> Expr {
    Expr::Constant(value.into())
}

pub fn func(kind: FuncKind, args: impl IntoIterator<Item = Expr>) -> Expr {
    Expr::Function {
        func: kind,
        args: args.into_iter().collect(),
    }
}

pub fn coalesce(args: impl IntoIterator<Item = Expr>) -> Expr {
    func(FuncKind::Coalesce, args)
}

pub fn concat(args: impl IntoIterator<Item = Expr>) -> Expr {
    func(FuncKind::Concat, args)
}

pub fn substring(expr: Expr, start: i64, len: Option<i64>) -> Expr {
    let mut args = vec![expr, lit(start)];
    if let Some(l) = len {
        args.push(lit(l));
    }
    func(FuncKind::Substring, args)
}

pub fn upper(expr: Expr) -> Expr {
    func(FuncKind::Upper, [expr])
}

pub fn lower(expr: Expr) -> Expr {
    func(FuncKind::Lower, [expr])
}

pub fn length(expr: Expr) -> Expr {
    func(FuncKind::Length, [expr])
}

pub fn count_all() -> Expr {
    Expr::count_all()
}

pub fn count(expr: Expr) -> Expr {
    Expr::aggregate(AggregateFunc::Count, expr)
}

pub fn sum(expr: Expr) -> Expr {
    Expr::aggregate(AggregateFunc::Sum, expr)
}

pub fn min(expr: Expr) -> Expr {
    Expr::aggregate(AggregateFunc::Min, expr)
}

pub fn max(expr: Expr) -> Expr {
    Expr::aggregate(AggregateFunc::Max, expr)
}

pub fn avg(expr: Expr) -> Expr {
    Expr::aggregate(AggregateFunc::Avg, expr)
}

/// `expr op value`; a typed NULL with `=` or `<>` turns into an
/// IS [NOT] NULL test.
pub fn cmp(expr: Expr, op: CompareOp, value: impl Into<Constant>) -> Filter {
    let value = value.into();
    if value.is_null() && matches!(op, CompareOp::Eq | CompareOp::Ne) {
        return Filter::CompareNull {
            expr,
            negated: op == CompareOp::Ne,
        };
    }
    Filter::Compare {
        expr,
        op,
        value,
        null_as_default: false,
    }
}

pub fn eq(expr: Expr, value: impl Into<Constant>) -> Filter {
    cmp(expr, CompareOp::Eq, value)
}

pub fn ne(expr: Expr, value: impl Into<Constant>) -> Filter {
    cmp(expr, CompareOp::Ne, value)
}

pub fn lt(expr: Expr, value: impl Into<Constant>) -> Filter {
    cmp(expr, CompareOp::Lt, value)
}

pub fn le(expr: Expr, value: impl Into<Constant>) -> Filter {
    cmp(expr, CompareOp::Le, value)
}

pub fn gt(expr: Expr, value: impl Into<Constant>) -> Filter {
    cmp(expr, CompareOp::Gt, value)
}

pub fn ge(expr: Expr, value: impl Into<Constant>) -> Filter {
    cmp(expr, CompareOp::Ge, value)
}

/// Comparison where a NULL on the left counts as the type's default value.
pub fn cmp_default(expr: Expr, op: CompareOp, value: Constant) -> Filter {
    Filter::Compare {
        expr,
        op,
        value,
        null_as_default: true,
    }
}

pub fn is_null(expr: Expr) -> Filter {
    Filter::CompareNull { expr, negated: false }
}

pub fn is_not_null(expr: Expr) -> Filter {
    Filter::CompareNull { expr, negated: true }
}

/// `expr IN (values)`. NULL entries become an `IS NULL` alternative.
pub fn in_list<V: Into<Constant>>(expr: Expr, values: impl IntoIterator<Item = V>) -> Filter {
    let mut has_null = false;
    let mut constants = Vec::new();
    for v in values {
        let v = v.into();
        if v.is_null() {
            has_null = true;
        } else {
            constants.push(v);
        }
    }
    let filter = Filter::In {
        expr: expr.clone(),
        values: constants,
    };
    if has_null { filter.or(is_null(expr)) } else { filter }
}

pub fn in_subquery(expr: Expr, subquery: Select) -> Filter {
    Filter::InSubquery {
        expr,
        subquery: Box::new(subquery),
    }
}

pub fn between(expr: Expr, low: impl Into<Constant>, high: impl Into<Constant>) -> Filter {
    Filter::Between {
        expr,
        low: low.into(),
        high: high.into(),
    }
}

pub fn starts_with(expr: Expr, prefix: &str) -> Filter {
    Filter::StartsWith {
        expr,
        prefix: prefix.to_string(),
    }
}

pub fn contains(expr: Expr, needle: &str) -> Filter {
    Filter::Contains {
        expr,
        needle: needle.to_string(),
    }
}

pub fn asc(expr: Expr) -> Order {
    Order::new().then_asc(expr)
}

pub fn desc(expr: Expr) -> Order {
    Order::new().then_desc(expr)
}
