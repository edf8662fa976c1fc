//! Output buffer shared by every rendering walk.

use serde::Serialize;

use crate::ast::{ColumnType, Value};
use crate::error::{PolyError, PolyResult};
use crate::transpiler::traits::SqlDialect;

/// How scalar values reach the statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamMode {
    /// Emit placeholders and collect values in emission order.
    Bind,
    /// Emit every value through the dialect's literal formatter.
    Inline,
}

impl ParamMode {
    /// `Bind` when the dialect takes parameters at all, `Inline` otherwise.
    pub fn preferred(dialect: &(impl SqlDialect + ?Sized)) -> Self {
        if dialect.features().parameters { ParamMode::Bind } else { ParamMode::Inline }
    }
}

/// A bound parameter: the prepared value and its declared column type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Param {
    pub value: Value,
    #[serde(rename = "type")]
    pub ty: ColumnType,
}

/// Accumulates SQL text and the parameters bound to it.
///
/// Placeholder indices are taken from the number of parameters already
/// collected, so rendering the same node twice from the same buffer state
/// yields the same text and the same parameter order.
#[derive(Debug, Clone)]
pub struct SqlBuffer {
    sql: String,
    params: Vec<Param>,
    /// Byte ranges of every emitted placeholder.
    spans: Vec<(usize, usize)>,
    mode: ParamMode,
    max_rows: Option<u64>,
}

impl Default for SqlBuffer {
    fn default() -> Self {
        Self::new(ParamMode::Bind)
    }
}

impl SqlBuffer {
    pub fn new(mode: ParamMode) -> Self {
        Self {
            sql: String::new(),
            params: Vec::new(),
            spans: Vec::new(),
            mode,
            max_rows: None,
        }
    }

    pub fn mode(&self) -> ParamMode {
        self.mode
    }

    pub fn push_str(&mut self, s: &str) {
        self.sql.push_str(s);
    }

    pub fn push(&mut self, c: char) {
        self.sql.push(c);
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.sql.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// Driver-level row cap for dialects without a row-limit clause.
    pub fn set_max_rows(&mut self, rows: u64) {
        self.max_rows = Some(rows);
    }

    /// Emit a scalar value, either as a placeholder or as a literal.
    ///
    /// Text values are inlined on dialects that cannot bind text parameters.
    /// A `Bind` buffer on a dialect without parameters fails.
    pub fn push_value<D: SqlDialect + ?Sized>(
        &mut self,
        dialect: &D,
        value: &Value,
        ty: ColumnType,
    ) -> PolyResult<()> {
        let features = dialect.features();
        let inline = match self.mode {
            ParamMode::Inline => true,
            ParamMode::Bind => {
                if !features.parameters {
                    return Err(PolyError::unsupported(dialect.name(), "query parameters"));
                }
                ty.is_text() && !features.parameterized_text
            }
        };
        if inline {
            let lit = dialect.literal(value, ty)?;
            self.sql.push_str(&lit);
            return Ok(());
        }
        let prepared = dialect.prepare_parameter(value, ty)?;
        let placeholder = dialect.placeholder(self.params.len());
        let start = self.sql.len();
        self.sql.push_str(&placeholder);
        self.spans.push((start, self.sql.len()));
        self.params.push(Param { value: prepared, ty });
        Ok(())
    }

    /// Close the statement, enforcing the dialect's statement length limit.
    pub fn finish<D: SqlDialect + ?Sized>(self, dialect: &D) -> PolyResult<CompiledStatement> {
        let max = dialect.features().max_statement_len;
        if max > 0 && self.sql.len() > max {
            return Err(PolyError::StatementTooLong {
                len: self.sql.len(),
                max,
            });
        }
        Ok(CompiledStatement {
            sql: self.sql,
            params: self.params,
            spans: self.spans,
            max_rows: self.max_rows,
        })
    }
}

/// Statement text plus its parameters, ready for an executor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    pub sql: String,
    pub params: Vec<Param>,
    #[serde(skip)]
    spans: Vec<(usize, usize)>,
    /// Row cap the executor must apply itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<u64>,
}

impl CompiledStatement {
    /// Rewrite placeholders into another syntax, e.g. a driver's native one.
    /// `native` receives the zero-based parameter index.
    pub fn rebind(&self, native: impl Fn(usize) -> String) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let mut last = 0;
        for (i, (start, end)) in self.spans.iter().enumerate() {
            out.push_str(&self.sql[last..*start]);
            out.push_str(&native(i));
            last = *end;
        }
        out.push_str(&self.sql[last..]);
        out
    }

    /// Same text with new parameter values, for statements prepared once.
    pub(crate) fn with_params(&self, params: Vec<Param>) -> CompiledStatement {
        CompiledStatement {
            sql: self.sql.clone(),
            params,
            spans: self.spans.clone(),
            max_rows: self.max_rows,
        }
    }

    pub fn placeholder_count(&self) -> usize {
        self.spans.len()
    }
}

impl std::fmt::Display for CompiledStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql)
    }
}
