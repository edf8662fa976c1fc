use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ast::{CompareOp, Constant, Expr, Select};

/// A boolean predicate over expressions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Filter {
    /// `expr op value`. With `null_as_default`, a NULL on the left compares as
    /// the default value of the constant's type.
    Compare {
        expr: Expr,
        op: CompareOp,
        value: Constant,
        #[serde(default)]
        null_as_default: bool,
    },
    /// `expr IS NULL`, or `IS NOT NULL` when negated.
    CompareNull {
        expr: Expr,
        #[serde(default)]
        negated: bool,
    },
    /// `expr IN (values...)`
    In { expr: Expr, values: Vec<Constant> },
    /// Text prefix match.
    StartsWith { expr: Expr, prefix: String },
    /// Text substring match.
    Contains { expr: Expr, needle: String },
    /// `expr IN (SELECT ...)`; the subquery projects exactly one column.
    InSubquery { expr: Expr, subquery: Box<Select> },
    /// `low <= expr <= high`
    Between {
        expr: Expr,
        low: Constant,
        high: Constant,
    },
    /// Unconditional true or false.
    Constant(bool),
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn always() -> Filter {
        Filter::Constant(true)
    }

    pub fn never() -> Filter {
        Filter::Constant(false)
    }

    /// Combine with AND, flattening nested conjunctions.
    pub fn and(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::And(mut a), Filter::And(b)) => {
                a.extend(b);
                Filter::And(a)
            }
            (Filter::And(mut a), f) => {
                a.push(f);
                Filter::And(a)
            }
            (f, Filter::And(mut b)) => {
                b.insert(0, f);
                Filter::And(b)
            }
            (a, b) => Filter::And(vec![a, b]),
        }
    }

    /// Combine with OR, flattening nested disjunctions.
    pub fn or(self, other: Filter) -> Filter {
        match (self, other) {
            (Filter::Or(mut a), Filter::Or(b)) => {
                a.extend(b);
                Filter::Or(a)
            }
            (Filter::Or(mut a), f) => {
                a.push(f);
                Filter::Or(a)
            }
            (f, Filter::Or(mut b)) => {
                b.insert(0, f);
                Filter::Or(b)
            }
            (a, b) => Filter::Or(vec![a, b]),
        }
    }

    pub fn negate(self) -> Filter {
        match self {
            Filter::Not(inner) => *inner,
            Filter::Constant(b) => Filter::Constant(!b),
            other => Filter::Not(Box::new(other)),
        }
    }

    /// Add every column referenced by this filter to `out`.
    ///
    /// Columns inside an IN-subquery belong to the subquery's table and are not
    /// collected.
    pub fn collect_columns(&self, out: &mut BTreeSet<String>) {
        match self {
            Filter::Compare { expr, .. }
            | Filter::CompareNull { expr, .. }
            | Filter::In { expr, .. }
            | Filter::StartsWith { expr, .. }
            | Filter::Contains { expr, .. }
            | Filter::InSubquery { expr, .. }
            | Filter::Between { expr, .. } => expr.collect_columns(out),
            Filter::Constant(_) => {}
            Filter::And(parts) | Filter::Or(parts) => {
                for p in parts {
                    p.collect_columns(out);
                }
            }
            Filter::Not(inner) => inner.collect_columns(out),
        }
    }
}
