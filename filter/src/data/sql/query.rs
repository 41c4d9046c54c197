//! Parameterized query assembly
//!
//! `QueryBuilder` carries the caller's base `SELECT`, any base predicates and
//! their parameters. Compiled filters are merged into it; `build()` yields the
//! final SQL plus the ordered parameter list, which the sqlx adapters bind.

use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::sqlite::SqliteArguments;
use sqlx::{Postgres, Sqlite};

use super::{Dialect, SqlParams, SqlValue};
use crate::utils::time::format_utc_millis;

/// Builder for a `SELECT ... WHERE ...` query with positional parameters
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    dialect: Dialect,
    select: String,
    predicates: Vec<String>,
    params: Vec<SqlValue>,
}

impl QueryBuilder {
    /// Start a query from a base statement without a WHERE clause,
    /// e.g. `SELECT id FROM records`
    pub fn new(dialect: Dialect, select: impl Into<String>) -> Self {
        Self {
            dialect,
            select: select.into(),
            predicates: Vec::new(),
            params: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Bind a value for a base predicate and return its placeholder
    pub fn bind(&mut self, value: impl Into<SqlValue>) -> String {
        self.params.push(value.into());
        self.dialect.sql().placeholder(self.params.len())
    }

    /// Add a base predicate
    ///
    /// The predicate must be self-contained (parenthesized if it uses OR) and
    /// must NOT contain user input; bind values with [`QueryBuilder::bind`].
    pub fn push_predicate(&mut self, predicate: impl Into<String>) {
        self.predicates.push(predicate.into());
    }

    pub fn param_count(&self) -> usize {
        self.params.len()
    }

    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    /// Append a compiled predicate whose placeholders were numbered after
    /// this builder's current parameters
    pub(crate) fn merge(&mut self, predicate: String, params: SqlParams) {
        self.predicates.push(predicate);
        self.params.extend(params.values);
    }

    /// Build the WHERE clause (without "WHERE" keyword)
    pub fn where_clause(&self) -> Option<String> {
        if self.predicates.is_empty() {
            None
        } else {
            Some(self.predicates.join(" AND "))
        }
    }

    pub fn build(self) -> BuiltQuery {
        let sql = match self.where_clause() {
            Some(clause) => format!("{} WHERE {}", self.select, clause),
            None => self.select,
        };
        BuiltQuery {
            dialect: self.dialect,
            sql,
            params: self.params,
        }
    }
}

/// Final SQL text and its parameters in placeholder order
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub dialect: Dialect,
    pub sql: String,
    pub params: Vec<SqlValue>,
}

impl BuiltQuery {
    /// Bind all parameters to a SQLite query.
    ///
    /// Timestamps are bound as RFC 3339 UTC text and arrays/JSON as JSON text,
    /// matching how SQLite cells store them.
    pub fn sqlite_query(&self) -> Query<'_, Sqlite, SqliteArguments<'_>> {
        let mut query = sqlx::query(&self.sql);
        for param in &self.params {
            query = match param {
                SqlValue::Text(s) => query.bind(s.clone()),
                SqlValue::Float(f) => query.bind(*f),
                SqlValue::Int(i) => query.bind(*i),
                SqlValue::Bool(b) => query.bind(*b),
                SqlValue::Timestamp(ts) => query.bind(format_utc_millis(*ts)),
                SqlValue::TextArray(values) => {
                    query.bind(serde_json::Value::from(values.clone()).to_string())
                }
                SqlValue::Json(value) => query.bind(value.to_string()),
            };
        }
        query
    }

    /// Bind all parameters to a PostgreSQL query.
    pub fn postgres_query(&self) -> Query<'_, Postgres, PgArguments> {
        let mut query = sqlx::query(&self.sql);
        for param in &self.params {
            query = match param {
                SqlValue::Text(s) => query.bind(s.clone()),
                SqlValue::Float(f) => query.bind(*f),
                SqlValue::Int(i) => query.bind(*i),
                SqlValue::Bool(b) => query.bind(*b),
                SqlValue::Timestamp(ts) => query.bind(*ts),
                SqlValue::TextArray(values) => query.bind(values.clone()),
                SqlValue::Json(value) => query.bind(sqlx::types::Json(value.clone())),
            };
        }
        query
    }
}
