//! Transpiler test modules.
//!
//! Tests are organized by category:
//! - `core`: SELECT, UPDATE, INSERT and DELETE shapes on the default dialect
//! - `dialects`: per-dialect syntax, capabilities and literal round trips
//! - `group_by`: aggregate projections and GROUP BY inference

mod core;
mod dialects;
mod group_by;
