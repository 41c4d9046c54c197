//! Parameter accumulation for compiled predicates
//!
//! User values never reach predicate text: every value is pushed here and the
//! fragment only receives the dialect's placeholder for it.

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;

use super::Dialect;

/// A bound parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Float(f64),
    Int(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    /// PostgreSQL `text[]`; SQLite binds it as JSON text
    TextArray(Vec<String>),
    Json(JsonValue),
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<f64> for SqlValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::Timestamp(value)
    }
}

/// Collects SQL parameters during query building (maintains insertion order)
///
/// Placeholders are numbered after `offset`, so a predicate compiled here can be
/// appended to a query that already binds `offset` parameters.
#[derive(Debug, Clone)]
pub struct SqlParams {
    dialect: Dialect,
    offset: usize,
    pub values: Vec<SqlValue>,
}

impl SqlParams {
    pub fn new(dialect: Dialect) -> Self {
        Self::starting_after(dialect, 0)
    }

    /// Accumulator whose first placeholder is `offset + 1`
    pub fn starting_after(dialect: Dialect, offset: usize) -> Self {
        Self {
            dialect,
            offset,
            values: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Bind a value and return the placeholder that refers to it
    pub fn push(&mut self, value: impl Into<SqlValue>) -> String {
        self.values.push(value.into());
        self.dialect
            .sql()
            .placeholder(self.offset + self.values.len())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Bind every value and return a comma-separated placeholder list, e.g. `?, ?, ?`
pub fn bind_list<I, V>(params: &mut SqlParams, values: I) -> String
where
    I: IntoIterator<Item = V>,
    V: Into<SqlValue>,
{
    values
        .into_iter()
        .map(|v| params.push(v))
        .collect::<Vec<_>>()
        .join(", ")
}
