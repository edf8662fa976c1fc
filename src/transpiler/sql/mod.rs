//! Concrete dialects. Each overrides only what differs from the defaults on
//! [`SqlDialect`](super::traits::SqlDialect).

pub mod access;
pub mod dataview;
pub mod db2;
pub mod mssql;
pub mod postgres;
pub mod sqlite;

use crate::error::PolyError;
use crate::schema::ColumnDef;
use crate::transpiler::traits::SqlDialect;

/// Pick the narrowest integer storage type that holds the declared bounds.
///
/// `names` lists the 8, 16, 32 and 64-bit type names. A column without both
/// bounds gets the widest type.
pub(crate) fn integer_type(col: &ColumnDef, names: [&str; 4], unsigned_tiny: bool) -> String {
    let (Some(lo), Some(hi)) = (col.min, col.max) else {
        return names[3].to_string();
    };
    let tiny = if unsigned_tiny {
        lo >= 0 && hi <= 255
    } else {
        lo >= i8::MIN as i64 && hi <= i8::MAX as i64
    };
    let name = if tiny {
        names[0]
    } else if lo >= i16::MIN as i64 && hi <= i16::MAX as i64 {
        names[1]
    } else if lo >= i32::MIN as i64 && hi <= i32::MAX as i64 {
        names[2]
    } else {
        names[3]
    };
    name.to_string()
}

pub(crate) fn unknown_type<D: SqlDialect + ?Sized>(dialect: &D, col: &ColumnDef) -> PolyError {
    PolyError::invalid(
        "column type",
        format!("column '{}' has no known type for {}", col.name, dialect.name()),
    )
}
