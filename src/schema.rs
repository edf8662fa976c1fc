//! Column definitions supplied by the caller.
//!
//! Neither the compiler nor the writer inspects a live database; every
//! operation that needs structure receives it as a list of [`ColumnDef`].
//!
//! # Example
//! ```
//! use polysql::schema::ColumnDef;
//! use polysql::ast::ColumnType;
//!
//! let json = r#"[
//!     { "name": "Id", "type": "integer", "min": 0, "max": 255 },
//!     { "name": "Name", "type": "string", "max_len": 40 }
//! ]"#;
//!
//! let cols: Vec<ColumnDef> = serde_json::from_str(json).unwrap();
//! assert_eq!(cols[0].ty, ColumnType::Integer);
//! ```

use serde::{Deserialize, Serialize};

use crate::ast::ColumnType;
use crate::error::{PolyError, PolyResult};

/// One column of a write or format operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    pub name: String,
    #[serde(rename = "type", alias = "ty")]
    pub ty: ColumnType,
    /// Declared lower bound for numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Declared upper bound for numeric columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    /// Declared maximum length for text columns.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
}

impl ColumnDef {
    pub fn new(name: &str, ty: ColumnType) -> Self {
        Self {
            name: name.to_string(),
            ty,
            min: None,
            max: None,
            max_len: None,
        }
    }

    /// Declare numeric bounds.
    pub fn bounds(mut self, min: i64, max: i64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    /// Reject empty names and unknown types.
    pub fn validate(&self) -> PolyResult<()> {
        if self.name.trim().is_empty() {
            return Err(PolyError::invalid("column name", "must not be empty"));
        }
        if self.ty == ColumnType::Unknown {
            return Err(PolyError::invalid(
                "column type",
                format!("column '{}' has no type", self.name),
            ));
        }
        if let (Some(lo), Some(hi)) = (self.min, self.max) {
            if lo > hi {
                return Err(PolyError::invalid(
                    "column bounds",
                    format!("'{}' has min {} above max {}", self.name, lo, hi),
                ));
            }
        }
        Ok(())
    }
}
