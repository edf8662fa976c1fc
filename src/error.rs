//! Error types for polysql.

use thiserror::Error;

/// The main error type for descriptor construction, compilation and writing.
#[derive(Debug, Error)]
pub enum PolyError {
    /// A constructor or builder received an argument it cannot accept.
    #[error("Invalid {what}: {reason}")]
    InvalidArgument { what: String, reason: String },

    /// A null constant was built without an explicit column type.
    #[error("Null constant requires an explicit column type")]
    NullConstant,

    /// Two projected expressions share one alias.
    #[error("Duplicate alias '{0}' in projection list")]
    AliasCollision(String),

    /// GROUP BY inference already ran for this descriptor.
    #[error("GROUP BY already initialized for table '{0}'")]
    GroupByInitialized(String),

    /// GROUP BY inference needs at least one projected expression.
    #[error("GROUP BY inference on table '{0}' needs a non-empty projection list")]
    GroupByEmptyProjection(String),

    /// A projected expression mixes plain columns and aggregate calls.
    #[error("Expression '{alias}' mixes plain columns and aggregates")]
    MixedAggregation { alias: String },

    /// The dialect cannot express the requested construct.
    #[error("{feature} is not supported by the {dialect} dialect")]
    Unsupported {
        dialect: &'static str,
        feature: String,
    },

    /// Generated text exceeds the dialect's statement length limit.
    #[error("Statement length {len} exceeds the dialect limit of {max}")]
    StatementTooLong { len: usize, max: usize },

    /// The backend broke a contract the write engine depends on.
    #[error("Internal invariant violated: {0}")]
    Invariant(String),

    /// A dialect literal could not be read back.
    #[error("Literal parse error at position {position}: {message}")]
    LiteralParse { position: usize, message: String },

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// Connection error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PolyError {
    /// Create an invalid argument error.
    pub fn invalid(what: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            what: what.into(),
            reason: reason.into(),
        }
    }

    /// Create an unsupported feature error for a dialect.
    pub fn unsupported(dialect: &'static str, feature: impl Into<String>) -> Self {
        Self::Unsupported {
            dialect,
            feature: feature.into(),
        }
    }

    /// Create a literal parse error at the given position.
    pub fn literal(position: usize, message: impl Into<String>) -> Self {
        Self::LiteralParse {
            position,
            message: message.into(),
        }
    }

    /// Whether this error reports a construct the dialect cannot express.
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}

/// Result type alias for polysql operations.
pub type PolyResult<T> = Result<T, PolyError>;
