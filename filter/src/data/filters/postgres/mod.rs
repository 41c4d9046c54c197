//! PostgreSQL compilers
//!
//! Single-valued columns use native comparisons. Multi-valued columns are
//! `jsonb` arrays queried with jsonpath (values passed through `vars`),
//! containment operators and `jsonb_array_elements[_text]`.

mod boolean;
mod datetime;
mod number;
mod structured;
mod text;

pub use boolean::{BooleanArray, BooleanCell};
pub use datetime::{DatetimeArray, DatetimeCell};
pub use number::{NumberArray, NumberCell};
pub use structured::StructuredCell;
pub use text::{StringArray, TextCell};

use crate::data::sql::{PostgresDialect, SqlDialect, SqlParams, SqlValue};

/// `(p) IS NOT TRUE`: the complement of `p` including NULL
fn not_true(predicate: &str) -> String {
    PostgresDialect.not_true(predicate)
}

fn array_is_empty(expr: &str) -> String {
    format!(
        "({} IS NULL OR {} = 0)",
        expr,
        PostgresDialect.json_array_length(expr)
    )
}

fn array_is_not_empty(expr: &str) -> String {
    format!("{} > 0", PostgresDialect.json_array_length(expr))
}

/// `jsonb_path_exists(expr, '$[*] ? (filter)', jsonb_build_object(...))`
///
/// `filter` is a trusted jsonpath filter referencing `$name` variables; each
/// variable is bound as a parameter and cast with `cast`.
fn any_element(
    params: &mut SqlParams,
    expr: &str,
    filter: &str,
    vars: Vec<(&str, SqlValue)>,
    cast: &str,
) -> String {
    let vars_sql = vars
        .into_iter()
        .map(|(name, value)| format!("'{}', {}::{}", name, params.push(value), cast))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "jsonb_path_exists({}, '$[*] ? ({})', jsonb_build_object({}))",
        expr, filter, vars_sql
    )
}
