//! Filter compilation
//!
//! Turns a nested AND/OR filter tree into a parameterized SQL predicate for
//! PostgreSQL or SQLite.
//!
//! # Usage
//! ```ignore
//! let tree = parse_filter(json, &FilterLimits::default())?;
//! let compiler = FilterCompiler::new(Dialect::Sqlite);
//! let mut query = compiler.query("SELECT id FROM records");
//! compiler.compile(&mut query, &tree, &columns, &CompileContext::new())?;
//! let rows = query.build().sqlite_query().fetch_all(&pool).await?;
//! ```
//!
//! # Pipeline
//! 1. `parser` - JSON limits and deserialization (untrusted input only)
//! 2. `preprocess` - actor substitution, vacuous-condition and empty-group pruning
//! 3. `walker` - validation, dispatch and predicate assembly
//! 4. `dispatch` - picks the per-dialect compiler for a column
//! 5. `postgres` / `sqlite` - operator compilers implementing `OperatorContract`

mod contract;
mod date_range;
mod dispatch;
mod error;
mod operator;
mod parser;
pub mod postgres;
mod preprocess;
pub mod sqlite;
mod types;
mod walker;

#[cfg(test)]
mod tests;

pub use contract::{
    DateClock, OperatorContract, distinct_text_list, expect_number, expect_text_list, is_truthy,
    parse_date_filter, resolve_date_range, text_operand,
};
pub use date_range::{DateFilter, DateMode, DateRange, DateRangeError, resolve};
pub use dispatch::{CompileEnv, column_expr, column_time_zone, select};
pub use error::{ErrorKind, FilterError, FilterResult};
pub use operator::{
    Operator, SymbolFamily, legal_operators, operator_for_symbol, parse_operator,
    resolve_operator, symbol_for_operator,
};
pub use parser::{FilterLimits, parse_filter};
pub use preprocess::preprocess;
pub use types::{
    Cardinality, CellKind, ColumnMeta, ColumnOptions, CompileContext, Conjunction, FilterCondition,
    FilterGroup, FilterNode, SemanticType, Storage, index_columns,
};
pub use walker::{CompiledPredicate, FilterCompiler};
