use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PolyError;
use crate::transpiler::sql::access::AccessDialect;
use crate::transpiler::sql::dataview::DataViewDialect;
use crate::transpiler::sql::db2::Db2Dialect;
use crate::transpiler::sql::mssql::MsSqlDialect;
use crate::transpiler::sql::postgres::PostgresDialect;
use crate::transpiler::sql::sqlite::SqliteDialect;
use crate::transpiler::traits::SqlDialect;

/// Built-in SQL dialects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MsSql,
    #[default]
    Postgres,
    Sqlite,
    Access,
    Db2,
    DataView,
}

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Dialect::MsSql,
        Dialect::Postgres,
        Dialect::Sqlite,
        Dialect::Access,
        Dialect::Db2,
        Dialect::DataView,
    ];

    pub fn generator(&self) -> Box<dyn SqlDialect> {
        match self {
            Dialect::MsSql => Box::new(MsSqlDialect),
            Dialect::Postgres => Box::new(PostgresDialect),
            Dialect::Sqlite => Box::new(SqliteDialect),
            Dialect::Access => Box::new(AccessDialect),
            Dialect::Db2 => Box::new(Db2Dialect),
            Dialect::DataView => Box::new(DataViewDialect),
        }
    }

    /// Registry key.
    pub fn key(&self) -> &'static str {
        match self {
            Dialect::MsSql => "mssql",
            Dialect::Postgres => "postgres",
            Dialect::Sqlite => "sqlite",
            Dialect::Access => "access",
            Dialect::Db2 => "db2",
            Dialect::DataView => "dataview",
        }
    }

    /// Alternative names accepted by [`FromStr`] and the registry.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Dialect::MsSql => &["sqlserver"],
            Dialect::Postgres => &["pg", "postgresql"],
            Dialect::Sqlite => &["sqlite3"],
            Dialect::Access => &["jet"],
            Dialect::Db2 => &["ibm"],
            Dialect::DataView => &["memory"],
        }
    }
}

impl FromStr for Dialect {
    type Err = PolyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Dialect::ALL
            .into_iter()
            .find(|d| d.key() == wanted || d.aliases().contains(&wanted.as_str()))
            .ok_or_else(|| PolyError::invalid("dialect", format!("unknown dialect '{}'", s)))
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.generator().name())
    }
}
