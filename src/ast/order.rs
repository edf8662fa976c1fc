use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ast::{Expr, SortOrder};

/// One ORDER BY term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPart {
    pub expr: Expr,
    #[serde(default)]
    pub order: SortOrder,
    /// Sorted as `coalesce(expr, null_substitute)` when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub null_substitute: Option<Expr>,
}

/// An ordered sequence of sort terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Order {
    parts: Vec<OrderPart>,
}

impl Order {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(mut self, part: OrderPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn then_asc(self, expr: Expr) -> Self {
        self.push(OrderPart {
            expr,
            order: SortOrder::Asc,
            null_substitute: None,
        })
    }

    pub fn then_desc(self, expr: Expr) -> Self {
        self.push(OrderPart {
            expr,
            order: SortOrder::Desc,
            null_substitute: None,
        })
    }

    /// Sort NULLs of `expr` as if they were `substitute`.
    pub fn then_with_null(self, expr: Expr, order: SortOrder, substitute: Expr) -> Self {
        self.push(OrderPart {
            expr,
            order,
            null_substitute: Some(substitute),
        })
    }

    pub fn parts(&self) -> &[OrderPart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn collect_columns(&self, out: &mut BTreeSet<String>) {
        for p in &self.parts {
            p.expr.collect_columns(out);
            if let Some(s) = &p.null_substitute {
                s.collect_columns(out);
            }
        }
    }
}
