//! In-memory evaluator for descriptors.
//!
//! Backs the no-server dialect: a [`MemoryTable`] evaluates expressions,
//! filters and orders directly over rows with the same NULL semantics the
//! SQL rendering produces. Filters use three-valued logic, so a comparison
//! with NULL is unknown and only rows whose filter is true are kept.

use std::cmp::Ordering;

use serde::Serialize;

use crate::ast::{CompareOp, ColumnType, Expr, Filter, FuncKind, Order, Select, Value};
use crate::error::{PolyError, PolyResult};
use crate::schema::ColumnDef;

const ENGINE: &str = "memory";

/// Column names and rows of a query result.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

#[derive(Debug, Clone)]
pub struct MemoryTable {
    name: String,
    columns: Vec<ColumnDef>,
    rows: Vec<Vec<Value>>,
}

impl MemoryTable {
    pub fn new(name: &str, columns: Vec<ColumnDef>) -> PolyResult<Self> {
        if name.trim().is_empty() {
            return Err(PolyError::invalid("table name", "must not be empty"));
        }
        for c in &columns {
            c.validate()?;
        }
        Ok(Self {
            name: name.to_string(),
            columns,
            rows: Vec::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append a row, converting every value to its column's type.
    pub fn push(&mut self, row: Vec<Value>) -> PolyResult<()> {
        if row.len() != self.columns.len() {
            return Err(PolyError::invalid(
                "row",
                format!("{} values for {} columns of '{}'", row.len(), self.columns.len(), self.name),
            ));
        }
        let row = row
            .into_iter()
            .zip(&self.columns)
            .map(|(v, c)| v.coerce(c.ty))
            .collect::<PolyResult<Vec<_>>>()?;
        self.rows.push(row);
        Ok(())
    }

    fn column_index(&self, expr_col: &crate::ast::ColumnRef) -> PolyResult<usize> {
        if expr_col.is_qualified() {
            return Err(PolyError::unsupported(
                "DataView",
                format!("qualified column '{}'", expr_col.full_name()),
            ));
        }
        self.columns
            .iter()
            .position(|c| c.name.eq_ignore_ascii_case(expr_col.name()))
            .ok_or_else(|| {
                PolyError::invalid(
                    "column",
                    format!("'{}' does not exist in '{}'", expr_col.name(), self.name),
                )
            })
    }

    /// Evaluate a scalar expression against one row.
    pub fn eval(&self, expr: &Expr, row: &[Value]) -> PolyResult<Value> {
        match expr {
            Expr::Constant(c) => Ok(c.value().clone()),
            Expr::Column(col) => {
                let i = self.column_index(col)?;
                Ok(row.get(i).cloned().unwrap_or(Value::Null))
            }
            Expr::Function { func, args } => {
                crate::ast::expr::check_arity(*func, args.len())?;
                let values = args
                    .iter()
                    .map(|a| self.eval(a, row))
                    .collect::<PolyResult<Vec<_>>>()?;
                eval_function(*func, values)
            }
            Expr::Aggregate { .. } => Err(PolyError::unsupported("DataView", "aggregate functions")),
        }
    }

    /// Evaluate with a NULL column read as the default value of `wanted`.
    pub fn eval_or_default(&self, expr: &Expr, row: &[Value], wanted: ColumnType) -> PolyResult<Value> {
        let value = self.eval(expr, row)?;
        match (expr, &value) {
            (Expr::Column(_), Value::Null) => Ok(wanted.default_value()),
            _ => Ok(value),
        }
    }

    /// Three-valued filter result: `None` is unknown.
    pub fn test(&self, filter: &Filter, row: &[Value]) -> PolyResult<Option<bool>> {
        match filter {
            Filter::Compare {
                expr,
                op,
                value,
                null_as_default,
            } => {
                let rhs = value.value();
                if rhs.is_null() {
                    let lhs = self.eval(expr, row)?;
                    return Ok(Some(match op {
                        CompareOp::Eq => lhs.is_null(),
                        CompareOp::Ne => !lhs.is_null(),
                        _ => false,
                    }));
                }
                let lhs = if *null_as_default {
                    self.eval_or_default(expr, row, value.ty())?
                } else {
                    self.eval(expr, row)?
                };
                if lhs.is_null() {
                    // `x <> v` also matches NULL rows
                    return Ok(if *op == CompareOp::Ne { Some(true) } else { None });
                }
                let ord = compare(&lhs, rhs)?;
                Ok(Some(match op {
                    CompareOp::Eq => ord == Ordering::Equal,
                    CompareOp::Ne => ord != Ordering::Equal,
                    CompareOp::Lt => ord == Ordering::Less,
                    CompareOp::Le => ord != Ordering::Greater,
                    CompareOp::Gt => ord == Ordering::Greater,
                    CompareOp::Ge => ord != Ordering::Less,
                }))
            }
            Filter::CompareNull { expr, negated } => Ok(Some(self.eval(expr, row)?.is_null() != *negated)),
            Filter::In { expr, values } => {
                let lhs = self.eval(expr, row)?;
                if lhs.is_null() {
                    // Rendered as `IS NULL` when a NULL is listed and as a
                    // constant false when nothing is.
                    return Ok(if values.iter().any(|c| c.is_null()) {
                        Some(true)
                    } else if values.is_empty() {
                        Some(false)
                    } else {
                        None
                    });
                }
                for c in values.iter().filter(|c| !c.is_null()) {
                    if compare(&lhs, c.value())? == Ordering::Equal {
                        return Ok(Some(true));
                    }
                }
                Ok(Some(false))
            }
            Filter::StartsWith { expr, prefix } => {
                let lhs = self.eval(expr, row)?;
                Ok((!lhs.is_null()).then(|| lhs.to_plain_string().starts_with(prefix.as_str())))
            }
            Filter::Contains { expr, needle } => {
                let lhs = self.eval(expr, row)?;
                Ok((!lhs.is_null()).then(|| lhs.to_plain_string().contains(needle.as_str())))
            }
            Filter::InSubquery { .. } => Err(PolyError::unsupported("DataView", "IN (subquery)")),
            Filter::Between { expr, low, high } => {
                if low.is_null() || high.is_null() {
                    return Err(PolyError::invalid("BETWEEN bounds", "must not be NULL"));
                }
                let lhs = self.eval(expr, row)?;
                if lhs.is_null() {
                    return Ok(None);
                }
                Ok(Some(
                    compare(&lhs, low.value())? != Ordering::Less
                        && compare(&lhs, high.value())? != Ordering::Greater,
                ))
            }
            Filter::Constant(b) => Ok(Some(*b)),
            Filter::And(parts) => {
                let mut result = Some(true);
                for p in parts {
                    match self.test(p, row)? {
                        Some(false) => return Ok(Some(false)),
                        None => result = None,
                        Some(true) => {}
                    }
                }
                Ok(result)
            }
            Filter::Or(parts) => {
                let mut result = Some(false);
                for p in parts {
                    match self.test(p, row)? {
                        Some(true) => return Ok(Some(true)),
                        None => result = None,
                        Some(false) => {}
                    }
                }
                Ok(result)
            }
            Filter::Not(inner) => Ok(self.test(inner, row)?.map(|b| !b)),
        }
    }

    /// Rows for which `filter` is true.
    pub fn filter(&self, filter: &Filter) -> PolyResult<Vec<&Vec<Value>>> {
        let mut out = Vec::new();
        for row in &self.rows {
            if self.test(filter, row)? == Some(true) {
                out.push(row);
            }
        }
        Ok(out)
    }

    fn sort_key(&self, order: &Order, row: &[Value]) -> PolyResult<Vec<Value>> {
        order
            .parts()
            .iter()
            .map(|part| {
                let v = self.eval(&part.expr, row)?;
                match (&part.null_substitute, v.is_null()) {
                    (Some(sub), true) => self.eval(sub, row),
                    _ => Ok(v),
                }
            })
            .collect()
    }

    /// Run a non-aggregate select over the table.
    pub fn select(&self, select: &Select) -> PolyResult<ResultSet> {
        if !select.table().eq_ignore_ascii_case(&self.name) {
            return Err(PolyError::invalid(
                "table",
                format!("select reads '{}', table is '{}'", select.table(), self.name),
            ));
        }
        if select.has_aggregates() || select.has_group_by() || select.having().is_some() {
            return Err(PolyError::unsupported("DataView", "aggregate functions"));
        }

        let mut matched = Vec::new();
        for row in &self.rows {
            let keep = match select.filter() {
                Some(f) => self.test(f, row)? == Some(true),
                None => true,
            };
            if keep {
                let key = match select.order() {
                    Some(o) => self.sort_key(o, row)?,
                    None => Vec::new(),
                };
                matched.push((key, row));
            }
        }
        if let Some(order) = select.order() {
            let parts = order.parts();
            matched.sort_by(|(a, _), (b, _)| {
                for ((x, y), part) in a.iter().zip(b).zip(parts) {
                    let ord = x.compare(y).unwrap_or(Ordering::Equal);
                    let ord = if part.order == crate::ast::SortOrder::Desc { ord.reverse() } else { ord };
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                Ordering::Equal
            });
        }

        let columns: Vec<String> = if select.columns().is_empty() {
            self.columns.iter().map(|c| c.name.clone()).collect()
        } else {
            select.columns().iter().map(|n| n.alias().to_string()).collect()
        };
        let mut rows: Vec<Vec<Value>> = Vec::with_capacity(matched.len());
        for (_, row) in matched {
            let projected = if select.columns().is_empty() {
                row.clone()
            } else {
                select
                    .columns()
                    .iter()
                    .map(|n| self.eval(n.expr(), row))
                    .collect::<PolyResult<Vec<_>>>()?
            };
            if select.is_distinct() && rows.contains(&projected) {
                continue;
            }
            rows.push(projected);
        }
        if select.max_rows() > 0 {
            rows.truncate(select.max_rows() as usize);
        }
        tracing::debug!("{} select on {} returned {} rows", ENGINE, self.name, rows.len());
        Ok(ResultSet { columns, rows })
    }
}

/// Compare two non-null values, converting the right side to the left's type
/// when they differ.
fn compare(lhs: &Value, rhs: &Value) -> PolyResult<Ordering> {
    if let Some(ord) = lhs.compare(rhs) {
        return Ok(ord);
    }
    let converted = rhs.clone().coerce(lhs.column_type())?;
    lhs.compare(&converted)
        .ok_or_else(|| PolyError::invalid("comparison", format!("cannot compare {} with {}", lhs, rhs)))
}

fn eval_function(func: FuncKind, args: Vec<Value>) -> PolyResult<Value> {
    if func == FuncKind::Coalesce {
        return Ok(args.into_iter().find(|v| !v.is_null()).unwrap_or(Value::Null));
    }
    if args.iter().any(Value::is_null) {
        return Ok(Value::Null);
    }
    let text = |v: &Value| v.to_plain_string();
    let int = |v: &Value| match v.clone().coerce(ColumnType::Integer)? {
        Value::Int(n) => Ok(n),
        other => Err(PolyError::invalid("argument", format!("{} is not an integer", other))),
    };
    Ok(match (func, args.as_slice()) {
        (FuncKind::Concat, parts) => Value::String(parts.iter().map(text).collect()),
        (FuncKind::Upper, [v]) => Value::String(text(v).to_uppercase()),
        (FuncKind::Lower, [v]) => Value::String(text(v).to_lowercase()),
        (FuncKind::Trim, [v]) => Value::String(text(v).trim().to_string()),
        (FuncKind::Length, [v]) => Value::Int(text(v).chars().count() as i64),
        (FuncKind::Abs, [Value::Int(n)]) => Value::Int(n.abs()),
        (FuncKind::Abs, [Value::Float(f)]) => Value::Float(f.abs()),
        (FuncKind::Abs, [Value::Money(d)]) => Value::Money(d.abs()),
        (FuncKind::Substring, [v, start, rest @ ..]) => {
            let chars: Vec<char> = text(v).chars().collect();
            let from = (int(start)?.max(1) - 1) as usize;
            let len = match rest.first() {
                Some(l) => int(l)?.max(0) as usize,
                None => chars.len(),
            };
            Value::String(chars.iter().skip(from).take(len).collect())
        }
        (f, args) => {
            return Err(PolyError::invalid(
                format!("{} call", f),
                format!("cannot evaluate with {} argument(s)", args.len()),
            ));
        }
    })
}
