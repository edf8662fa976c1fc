use serde::{Deserialize, Serialize};

/// Scalar function kinds understood by every dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuncKind {
    /// First non-null argument.
    Coalesce,
    /// SUBSTRING(text, start, length), 1-based start.
    Substring,
    /// String concatenation of all arguments.
    Concat,
    Upper,
    Lower,
    Length,
    Trim,
    Abs,
}

impl FuncKind {
    /// Standard SQL function name.
    pub fn sql_name(self) -> &'static str {
        match self {
            FuncKind::Coalesce => "COALESCE",
            FuncKind::Substring => "SUBSTRING",
            FuncKind::Concat => "CONCAT",
            FuncKind::Upper => "UPPER",
            FuncKind::Lower => "LOWER",
            FuncKind::Length => "LENGTH",
            FuncKind::Trim => "TRIM",
            FuncKind::Abs => "ABS",
        }
    }

    /// Accepted argument count range.
    pub fn arity(self) -> (usize, usize) {
        match self {
            FuncKind::Coalesce | FuncKind::Concat => (2, usize::MAX),
            FuncKind::Substring => (2, 3),
            FuncKind::Upper | FuncKind::Lower | FuncKind::Length | FuncKind::Trim | FuncKind::Abs => (1, 1),
        }
    }
}

impl std::fmt::Display for FuncKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_name())
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AggregateFunc {
    Count,
    Sum,
    Min,
    Max,
    Avg,
}

impl std::fmt::Display for AggregateFunc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregateFunc::Count => write!(f, "COUNT"),
            AggregateFunc::Sum => write!(f, "SUM"),
            AggregateFunc::Min => write!(f, "MIN"),
            AggregateFunc::Max => write!(f, "MAX"),
            AggregateFunc::Avg => write!(f, "AVG"),
        }
    }
}

/// Comparison operators for compare filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "<>")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
}

impl CompareOp {
    pub fn sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl std::fmt::Display for CompareOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql())
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SortOrder::Asc => write!(f, "ASC"),
            SortOrder::Desc => write!(f, "DESC"),
        }
    }
}
