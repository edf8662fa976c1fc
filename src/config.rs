//! Settings read from `polysql.toml`.
//!
//! ```toml
//! dialect = "sqlite"
//! database_url = "sqlite::memory:"
//! batch_size = 500
//! log_level = "debug"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PolyError, PolyResult};
use crate::transpiler::Dialect;

pub const CONFIG_FILE: &str = "polysql.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Dialect used when a command names none.
    pub dialect: Dialect,
    pub database_url: Option<String>,
    /// Overrides the dialect's INSERT batch size when smaller.
    pub batch_size: Option<usize>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            database_url: None,
            batch_size: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> PolyResult<Self> {
        let config: Config = toml::from_str(text).map_err(|e| PolyError::Config(e.to_string()))?;
        if config.batch_size == Some(0) {
            return Err(PolyError::Config("batch_size must be at least 1".to_string()));
        }
        Ok(config)
    }

    pub fn from_file(path: &Path) -> PolyResult<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text).map_err(|e| match e {
            PolyError::Config(msg) => PolyError::Config(format!("{}: {}", path.display(), msg)),
            other => other,
        })
    }

    /// Files consulted by [`Config::load`], most specific first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            paths.push(dir.join("polysql").join("config.toml"));
        }
        paths
    }

    /// Load an explicit file, else the first existing default location, else
    /// built-in defaults. An explicit path that does not exist is an error.
    pub fn load(explicit: Option<&Path>) -> PolyResult<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        for path in Self::search_paths() {
            if path.exists() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::from_file(&path);
            }
        }
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full() {
        let config = Config::from_toml(
            r#"
            dialect = "sqlite"
            database_url = "sqlite::memory:"
            batch_size = 50
            log_level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect, Dialect::Sqlite);
        assert_eq!(config.database_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(config.batch_size, Some(50));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.dialect, Dialect::Postgres);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(Config::from_toml("batch_size = 0"), Err(PolyError::Config(_))));
        assert!(matches!(Config::from_toml("dialect = \"oracle\""), Err(PolyError::Config(_))));
        assert!(matches!(Config::from_toml("colour = true"), Err(PolyError::Config(_))));
    }

    #[test]
    fn test_missing_explicit_file() {
        let err = Config::load(Some(Path::new("/nonexistent/polysql.toml"))).unwrap_err();
        assert!(matches!(err, PolyError::Io(_)));
    }
}
