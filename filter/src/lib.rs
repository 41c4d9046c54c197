//! Tabula filter engine
//!
//! Compiles user-authored filter trees over typed columns into parameterized
//! SQL predicates for PostgreSQL and SQLite.

pub mod core;
pub mod data;
pub mod utils;

pub use crate::core::config::FilterConfig;
pub use data::filters::{
    ColumnMeta, CompileContext, CompiledPredicate, FilterCompiler, FilterError, FilterLimits,
    FilterNode, FilterResult, Operator, parse_filter,
};
pub use data::sql::{BuiltQuery, Dialect, QueryBuilder, SqlParams, SqlValue};
