//! Rows waiting for the next bulk flush, indexed by their search-column values.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use uuid::Uuid;

use crate::ast::Value;

/// Hashable image of one key value. Floats hash by bit pattern and money by
/// its normalized text, so `1.50` and `1.5` land on the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyPart {
    Null,
    Bool(bool),
    Int(i64),
    Float(u64),
    Money(String),
    Text(String),
    Date(NaiveDate),
    Time(NaiveTime),
    DateTime(NaiveDateTime),
    Guid(Uuid),
    Bytes(Vec<u8>),
}

impl From<&Value> for KeyPart {
    fn from(v: &Value) -> Self {
        match v {
            Value::Null => KeyPart::Null,
            Value::Bool(b) => KeyPart::Bool(*b),
            Value::Int(n) => KeyPart::Int(*n),
            Value::Float(f) => KeyPart::Float(if *f == 0.0 { 0 } else { f.to_bits() }),
            Value::Money(d) => KeyPart::Money(d.normalize().to_string()),
            Value::String(s) => KeyPart::Text(s.clone()),
            Value::Date(d) => KeyPart::Date(*d),
            Value::Time(t) => KeyPart::Time(*t),
            Value::DateTime(dt) => KeyPart::DateTime(*dt),
            Value::Guid(g) => KeyPart::Guid(*g),
            Value::Binary(b) => KeyPart::Bytes(b.clone()),
        }
    }
}

type RowKey = Vec<KeyPart>;

/// In-memory row accumulator.
///
/// With key columns, the latest staged row per key is reachable through
/// [`StagingBuffer::find`]. Without them it is a plain append-only batch.
#[derive(Debug, Default)]
pub struct StagingBuffer {
    key_columns: Vec<usize>,
    rows: Vec<Vec<Value>>,
    index: HashMap<RowKey, usize>,
}

impl StagingBuffer {
    pub fn new(key_columns: Vec<usize>) -> Self {
        Self {
            key_columns,
            rows: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn key_of(&self, row: &[Value]) -> Option<RowKey> {
        if self.key_columns.is_empty() {
            return None;
        }
        Some(
            self.key_columns
                .iter()
                .map(|&i| row.get(i).map(KeyPart::from).unwrap_or(KeyPart::Null))
                .collect(),
        )
    }

    /// Position of a staged row with the same key values as `row`.
    pub fn find(&self, row: &[Value]) -> Option<usize> {
        self.key_of(row).and_then(|k| self.index.get(&k).copied())
    }

    pub fn push(&mut self, row: Vec<Value>) -> usize {
        let pos = self.rows.len();
        if let Some(key) = self.key_of(&row) {
            self.index.insert(key, pos);
        }
        self.rows.push(row);
        pos
    }

    /// Overwrite the listed columns of a staged row in place.
    pub fn overwrite(&mut self, pos: usize, columns: &[usize], row: &[Value]) {
        if let Some(target) = self.rows.get_mut(pos) {
            for &i in columns {
                if let (Some(slot), Some(v)) = (target.get_mut(i), row.get(i)) {
                    *slot = v.clone();
                }
            }
        }
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Hand every staged row over and start empty.
    pub fn take(&mut self) -> Vec<Vec<Value>> {
        self.index.clear();
        std::mem::take(&mut self.rows)
    }
}
