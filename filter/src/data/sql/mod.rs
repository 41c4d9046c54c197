//! SQL abstraction layer for multi-database support
//!
//! This module provides abstractions for generating SQL that works across
//! the storage backends the filter engine targets (PostgreSQL, SQLite), plus
//! the parameter accumulator and query builder compiled predicates land in.

mod dialect;
mod params;
mod postgres_dialect;
mod query;
mod sqlite_dialect;

pub use dialect::SqlDialect;
pub use params::{SqlParams, SqlValue, bind_list};
pub use postgres_dialect::PostgresDialect;
pub use query::{BuiltQuery, QueryBuilder};
pub use sqlite_dialect::SqliteDialect;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Storage dialect a deployment compiles filters for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Get the SQL dialect for this backend
    pub fn sql(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &PostgresDialect,
            Dialect::Sqlite => &SqliteDialect,
        }
    }

    /// Get the backend name
    pub fn name(&self) -> &'static str {
        self.sql().name()
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "sqlite" | "sqlite3" => Ok(Dialect::Sqlite),
            other => Err(format!("Unknown SQL dialect: {}", other)),
        }
    }
}
