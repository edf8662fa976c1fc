//! UPDATE SQL generation.

use crate::ast::{ColumnRef, CompareOp, Constant, Expr, Filter, Value};
use crate::error::{PolyError, PolyResult};
use crate::schema::ColumnDef;
use crate::transpiler::buffer::{CompiledStatement, Param, ParamMode, SqlBuffer};
use crate::transpiler::traits::{quote_table, SqlDialect};

/// Generate `UPDATE t SET a = .., b = .. [WHERE ..]`.
pub fn build_update<D: SqlDialect + ?Sized>(
    table: &str,
    set: &[(ColumnDef, Value)],
    filter: Option<&Filter>,
    dialect: &D,
    mode: ParamMode,
) -> PolyResult<CompiledStatement> {
    if set.is_empty() {
        return Err(PolyError::invalid("UPDATE", format!("nothing to set on '{}'", table)));
    }
    let mut buf = SqlBuffer::new(mode);
    buf.push_str("UPDATE ");
    buf.push_str(&quote_table(dialect, table)?);
    buf.push_str(" SET ");
    for (i, (col, value)) in set.iter().enumerate() {
        if i > 0 {
            buf.push_str(", ");
        }
        buf.push_str(&dialect.quote_identifier(&col.name)?);
        buf.push_str(" = ");
        buf.push_value(dialect, value, col.ty)?;
    }
    if let Some(f) = filter {
        buf.push_str(" WHERE ");
        dialect.render_filter(f, &mut buf)?;
    }
    buf.finish(dialect)
}

/// Equality filter over key columns; a NULL key value matches with `IS NULL`.
pub fn key_filter(keys: &[ColumnDef], values: &[Value]) -> PolyResult<Filter> {
    if keys.len() != values.len() {
        return Err(PolyError::invalid(
            "key values",
            format!("{} values for {} key columns", values.len(), keys.len()),
        ));
    }
    let mut parts = Vec::with_capacity(keys.len());
    for (key, value) in keys.iter().zip(values) {
        let expr = Expr::Column(ColumnRef::new(&key.name)?);
        if value.is_null() {
            parts.push(Filter::CompareNull { expr, negated: false });
        } else {
            parts.push(Filter::Compare {
                expr,
                op: CompareOp::Eq,
                value: Constant::typed(value.clone(), key.ty)?,
                null_as_default: false,
            });
        }
    }
    Ok(match parts.len() {
        1 => parts.remove(0),
        _ => Filter::And(parts),
    })
}

/// An UPDATE over fixed SET and key columns, rendered once and re-bound per row.
///
/// Falls back to rendering per row when a key value is NULL (the WHERE shape
/// changes) or when the dialect inlines some of the values.
#[derive(Debug, Clone)]
pub struct PreparedUpdate {
    table: String,
    set: Vec<ColumnDef>,
    keys: Vec<ColumnDef>,
    mode: ParamMode,
    template: Option<CompiledStatement>,
}

impl PreparedUpdate {
    pub fn prepare<D: SqlDialect + ?Sized>(
        dialect: &D,
        table: &str,
        set: Vec<ColumnDef>,
        keys: Vec<ColumnDef>,
    ) -> PolyResult<Self> {
        if keys.is_empty() {
            return Err(PolyError::invalid("UPDATE", format!("no key columns for '{}'", table)));
        }
        let features = dialect.features();
        let mode = ParamMode::preferred(dialect);
        let bindable = mode == ParamMode::Bind
            && (features.parameterized_text || !set.iter().chain(&keys).any(|c| c.ty.is_text()));

        let mut prepared = Self {
            table: table.to_string(),
            set,
            keys,
            mode,
            template: None,
        };
        if bindable {
            let set_values: Vec<Value> = prepared.set.iter().map(|c| dialect.default_value(c.ty)).collect();
            let key_values: Vec<Value> = prepared.keys.iter().map(|c| dialect.default_value(c.ty)).collect();
            let stmt = prepared.render(dialect, &set_values, &key_values)?;
            prepared.template = Some(stmt.with_params(Vec::new()));
        }
        tracing::debug!(
            "Prepared UPDATE on {} ({} set, {} key columns, template: {})",
            prepared.table,
            prepared.set.len(),
            prepared.keys.len(),
            prepared.template.is_some()
        );
        Ok(prepared)
    }

    pub fn is_templated(&self) -> bool {
        self.template.is_some()
    }

    /// Bind one row's values: SET values first, then key values.
    pub fn bind<D: SqlDialect + ?Sized>(
        &self,
        dialect: &D,
        set_values: &[Value],
        key_values: &[Value],
    ) -> PolyResult<CompiledStatement> {
        if set_values.len() != self.set.len() {
            return Err(PolyError::invalid(
                "UPDATE values",
                format!("{} values for {} columns", set_values.len(), self.set.len()),
            ));
        }
        match &self.template {
            Some(template) if !key_values.iter().any(Value::is_null) && key_values.len() == self.keys.len() => {
                let mut params = Vec::with_capacity(set_values.len() + key_values.len());
                let cols = self.set.iter().chain(&self.keys);
                for (value, col) in set_values.iter().chain(key_values).zip(cols) {
                    params.push(Param {
                        value: dialect.prepare_parameter(value, col.ty)?,
                        ty: col.ty,
                    });
                }
                Ok(template.with_params(params))
            }
            _ => self.render(dialect, set_values, key_values),
        }
    }

    fn render<D: SqlDialect + ?Sized>(
        &self,
        dialect: &D,
        set_values: &[Value],
        key_values: &[Value],
    ) -> PolyResult<CompiledStatement> {
        let set: Vec<(ColumnDef, Value)> = self.set.iter().cloned().zip(set_values.iter().cloned()).collect();
        let filter = key_filter(&self.keys, key_values)?;
        build_update(&self.table, &set, Some(&filter), dialect, self.mode)
    }
}
