use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ast::{AggregateFunc, ColumnType, FuncKind, Value};
use crate::error::{PolyError, PolyResult};

/// A typed scalar constant.
///
/// A null constant must carry an explicit type; there is no way to build an
/// untyped NULL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawConstant")]
pub struct Constant {
    value: Value,
    #[serde(rename = "type")]
    ty: ColumnType,
}

#[derive(Deserialize)]
struct RawConstant {
    value: Value,
    #[serde(default, rename = "type")]
    ty: ColumnType,
}

impl TryFrom<RawConstant> for Constant {
    type Error = PolyError;

    fn try_from(raw: RawConstant) -> Result<Self, Self::Error> {
        Constant::typed(raw.value, raw.ty)
    }
}

impl Constant {
    /// Constant whose type is inferred from the value.
    pub fn new(value: impl Into<Value>) -> PolyResult<Self> {
        Self::typed(value, ColumnType::Unknown)
    }

    /// Constant with an explicit type; the value is converted to that type.
    pub fn typed(value: impl Into<Value>, ty: ColumnType) -> PolyResult<Self> {
        let value = value.into();
        let ty = if ty == ColumnType::Unknown { value.column_type() } else { ty };
        if ty == ColumnType::Unknown {
            return Err(PolyError::NullConstant);
        }
        let value = value.coerce(ty)?;
        Ok(Self { value, ty })
    }

    /// A typed NULL.
    pub fn null(ty: ColumnType) -> PolyResult<Self> {
        Self::typed(Value::Null, ty)
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn ty(&self) -> ColumnType {
        self.ty
    }

    pub fn is_null(&self) -> bool {
        self.value.is_null()
    }
}

/// Infallible constants for plain Rust values; the type follows the value.
/// NULL has no Rust counterpart here, so an untyped NULL cannot be built this
/// way. Use [`Constant::null`].
macro_rules! constant_from {
    ($($t:ty => $ty:ident),* $(,)?) => {
        $(
            impl From<$t> for Constant {
                fn from(v: $t) -> Self {
                    Self {
                        value: Value::from(v),
                        ty: ColumnType::$ty,
                    }
                }
            }
        )*
    };
}

constant_from! {
    bool => Boolean,
    i32 => Integer,
    i64 => Integer,
    f64 => Float,
    rust_decimal::Decimal => Money,
    &str => String,
    String => String,
    chrono::NaiveDate => Date,
    chrono::NaiveTime => Time,
    chrono::NaiveDateTime => DateTime,
    uuid::Uuid => Guid,
    Vec<u8> => Binary,
}

/// A reference to a column, possibly through a chain of references (`A.B.C`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ColumnRef {
    path: Vec<String>,
}

impl ColumnRef {
    pub fn new(path: &str) -> PolyResult<Self> {
        if path.trim().is_empty() {
            return Err(PolyError::invalid("column name", "must not be empty"));
        }
        let parts: Vec<String> = path.split('.').map(|p| p.trim().to_string()).collect();
        if parts.iter().any(|p| p.is_empty()) {
            return Err(PolyError::invalid("column name", format!("'{}' has an empty path segment", path)));
        }
        Ok(Self { path: parts })
    }

    /// The last path segment.
    pub fn name(&self) -> &str {
        self.path.last().map(String::as_str).unwrap_or_default()
    }

    pub fn parts(&self) -> &[String] {
        &self.path
    }

    /// Split a dotted path without validation; empty segments are rejected
    /// when the reference is rendered.
    pub(crate) fn unchecked(path: &str) -> Self {
        Self {
            path: path.split('.').map(|p| p.trim().to_string()).collect(),
        }
    }

    pub fn is_qualified(&self) -> bool {
        self.path.len() > 1
    }

    pub fn full_name(&self) -> String {
        self.path.join(".")
    }
}

impl TryFrom<String> for ColumnRef {
    type Error = PolyError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        ColumnRef::new(&s)
    }
}

impl From<ColumnRef> for String {
    fn from(c: ColumnRef) -> Self {
        c.full_name()
    }
}

impl std::fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_name())
    }
}

/// A scalar expression node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Expr {
    /// A typed constant.
    Constant(Constant),
    /// A column reference.
    Column(ColumnRef),
    /// Scalar function call.
    Function { func: FuncKind, args: Vec<Expr> },
    /// Aggregate call; `None` argument means `*` (only meaningful for COUNT).
    Aggregate {
        func: AggregateFunc,
        arg: Option<Box<Expr>>,
    },
}

/// What an expression aggregates over, used for GROUP BY inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// No column and no aggregate (constants only).
    Constant,
    /// Plain columns, no aggregate.
    Columns,
    /// Aggregates, no bare column outside them.
    Aggregate,
    /// Both plain columns and aggregates.
    Mixed,
}

impl Aggregation {
    fn merge(self, other: Aggregation) -> Aggregation {
        match (self, other) {
            (Aggregation::Mixed, _) | (_, Aggregation::Mixed) => Aggregation::Mixed,
            (Aggregation::Constant, x) | (x, Aggregation::Constant) => x,
            (Aggregation::Columns, Aggregation::Columns) => Aggregation::Columns,
            (Aggregation::Aggregate, Aggregation::Aggregate) => Aggregation::Aggregate,
            _ => Aggregation::Mixed,
        }
    }
}

impl Expr {
    pub fn column(path: &str) -> PolyResult<Expr> {
        Ok(Expr::Column(ColumnRef::new(path)?))
    }

    pub fn constant(value: impl Into<Value>) -> PolyResult<Expr> {
        Ok(Expr::Constant(Constant::new(value)?))
    }

    /// Function call with argument count checked against the function kind.
    pub fn function(func: FuncKind, args: Vec<Expr>) -> PolyResult<Expr> {
        check_arity(func, args.len())?;
        Ok(Expr::Function { func, args })
    }

    pub fn aggregate(func: AggregateFunc, arg: Expr) -> Expr {
        Expr::Aggregate {
            func,
            arg: Some(Box::new(arg)),
        }
    }

    pub fn count_all() -> Expr {
        Expr::Aggregate {
            func: AggregateFunc::Count,
            arg: None,
        }
    }

    pub fn as_column(&self) -> Option<&ColumnRef> {
        match self {
            Expr::Column(c) => Some(c),
            _ => None,
        }
    }

    /// Classify the expression by walking function arguments recursively.
    /// Arguments of an aggregate call do not count as bare columns.
    pub fn aggregation(&self) -> Aggregation {
        match self {
            Expr::Constant(_) => Aggregation::Constant,
            Expr::Column(_) => Aggregation::Columns,
            Expr::Aggregate { .. } => Aggregation::Aggregate,
            Expr::Function { args, .. } => args
                .iter()
                .fold(Aggregation::Constant, |acc, a| acc.merge(a.aggregation())),
        }
    }

    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expr::Aggregate { .. } => true,
            Expr::Function { args, .. } => args.iter().any(Expr::contains_aggregate),
            _ => false,
        }
    }

    /// Add the full name of every referenced column to `out`.
    pub fn collect_columns(&self, out: &mut BTreeSet<String>) {
        match self {
            Expr::Constant(_) => {}
            Expr::Column(c) => {
                out.insert(c.full_name());
            }
            Expr::Function { args, .. } => {
                for a in args {
                    a.collect_columns(out);
                }
            }
            Expr::Aggregate { arg, .. } => {
                if let Some(a) = arg {
                    a.collect_columns(out);
                }
            }
        }
    }

    /// The type this expression is known to produce without schema lookup.
    pub fn type_hint(&self) -> ColumnType {
        match self {
            Expr::Constant(c) => c.ty(),
            Expr::Function { func: FuncKind::Length, .. } => ColumnType::Integer,
            Expr::Function {
                func: FuncKind::Upper | FuncKind::Lower | FuncKind::Trim | FuncKind::Concat | FuncKind::Substring,
                ..
            } => ColumnType::String,
            Expr::Function { args, .. } => args
                .iter()
                .map(Expr::type_hint)
                .find(|t| *t != ColumnType::Unknown)
                .unwrap_or_default(),
            Expr::Aggregate { func: AggregateFunc::Count, .. } => ColumnType::Integer,
            Expr::Aggregate { arg: Some(a), .. } => a.type_hint(),
            _ => ColumnType::Unknown,
        }
    }
}

pub(crate) fn check_arity(func: FuncKind, count: usize) -> PolyResult<()> {
    let (min, max) = func.arity();
    if count < min || count > max {
        return Err(PolyError::invalid(
            format!("{} call", func),
            format!("takes {}..{} arguments, got {}", min, max.min(99), count),
        ));
    }
    Ok(())
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Constant(c) => write!(f, "{}", c.value()),
            Expr::Column(c) => write!(f, "{}", c),
            Expr::Function { func, args } => {
                write!(f, "{}(", func)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
            Expr::Aggregate { func, arg } => match arg {
                Some(a) => write!(f, "{}({})", func, a),
                None => write!(f, "{}(*)", func),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_constant_requires_type() {
        assert!(matches!(Constant::new(Value::Null), Err(PolyError::NullConstant)));
        let c = Constant::null(ColumnType::Integer).unwrap();
        assert!(c.is_null());
        assert_eq!(c.ty(), ColumnType::Integer);
    }

    #[test]
    fn test_typed_constant_coerces() {
        let c = Constant::typed(1, ColumnType::Boolean).unwrap();
        assert_eq!(c.value(), &Value::Bool(true));
    }

    #[test]
    fn test_column_ref_path() {
        let c = ColumnRef::new("Order.Customer.Name").unwrap();
        assert_eq!(c.name(), "Name");
        assert!(c.is_qualified());
        assert!(ColumnRef::new("").is_err());
        assert!(ColumnRef::new("A..B").is_err());
    }

    #[test]
    fn test_aggregation_classification() {
        let a = Expr::column("A").unwrap();
        let sum_b = Expr::aggregate(AggregateFunc::Sum, Expr::column("B").unwrap());
        assert_eq!(a.aggregation(), Aggregation::Columns);
        assert_eq!(sum_b.aggregation(), Aggregation::Aggregate);

        let mixed = Expr::function(FuncKind::Coalesce, vec![a.clone(), sum_b.clone()]).unwrap();
        assert_eq!(mixed.aggregation(), Aggregation::Mixed);

        let nested = Expr::function(
            FuncKind::Upper,
            vec![Expr::function(FuncKind::Trim, vec![a]).unwrap()],
        )
        .unwrap();
        assert_eq!(nested.aggregation(), Aggregation::Columns);

        let constant_only = Expr::function(FuncKind::Abs, vec![Expr::constant(-1).unwrap()]).unwrap();
        assert_eq!(constant_only.aggregation(), Aggregation::Constant);
    }

    #[test]
    fn test_function_arity() {
        assert!(Expr::function(FuncKind::Upper, vec![]).is_err());
        assert!(Expr::function(FuncKind::Coalesce, vec![Expr::column("A").unwrap()]).is_err());
    }

    #[test]
    fn test_collect_columns() {
        let e = Expr::function(
            FuncKind::Concat,
            vec![Expr::column("B").unwrap(), Expr::column("A.X").unwrap()],
        )
        .unwrap();
        let mut cols = BTreeSet::new();
        e.collect_columns(&mut cols);
        assert_eq!(cols.into_iter().collect::<Vec<_>>(), vec!["A.X", "B"]);
    }
}
