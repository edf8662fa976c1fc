//! Name-to-dialect lookup.
//!
//! The registry is a plain value owned by the caller; nothing is registered
//! globally.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{PolyError, PolyResult};
use crate::transpiler::dialect::Dialect;
use crate::transpiler::traits::SqlDialect;

#[derive(Clone, Default)]
pub struct DialectRegistry {
    dialects: BTreeMap<String, Arc<dyn SqlDialect>>,
    aliases: BTreeMap<String, String>,
}

impl DialectRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in dialect under its key and aliases.
    pub fn builtin() -> Self {
        let mut reg = Self::new();
        for d in Dialect::ALL {
            reg.register(d.key(), Arc::from(d.generator()));
            for alias in d.aliases() {
                reg.aliases.insert((*alias).to_string(), d.key().to_string());
            }
        }
        reg
    }

    /// Add or replace a dialect under `name` (case-insensitive).
    pub fn register(&mut self, name: &str, dialect: Arc<dyn SqlDialect>) {
        let key = name.trim().to_ascii_lowercase();
        tracing::debug!("Registering dialect {} as '{}'", dialect.name(), key);
        self.aliases.remove(&key);
        self.dialects.insert(key, dialect);
    }

    /// Make `alias` resolve to an already registered dialect.
    pub fn alias(&mut self, alias: &str, target: &str) -> PolyResult<()> {
        let target = target.trim().to_ascii_lowercase();
        if !self.dialects.contains_key(&target) {
            return Err(PolyError::invalid("dialect alias", format!("'{}' is not registered", target)));
        }
        self.aliases.insert(alias.trim().to_ascii_lowercase(), target);
        Ok(())
    }

    pub fn get(&self, name: &str) -> PolyResult<Arc<dyn SqlDialect>> {
        let key = name.trim().to_ascii_lowercase();
        let key = self.aliases.get(&key).unwrap_or(&key);
        self.dialects
            .get(key)
            .cloned()
            .ok_or_else(|| PolyError::invalid("dialect", format!("unknown dialect '{}'", name)))
    }

    /// Registered keys, aliases excluded.
    pub fn names(&self) -> Vec<&str> {
        self.dialects.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn SqlDialect>)> {
        self.dialects.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl std::fmt::Debug for DialectRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialectRegistry")
            .field("dialects", &self.names())
            .field("aliases", &self.aliases)
            .finish()
    }
}
