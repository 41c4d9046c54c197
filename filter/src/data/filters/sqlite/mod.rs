//! SQLite compilers
//!
//! Single-valued columns use native comparisons. Multi-valued columns are JSON
//! text arrays searched with correlated `EXISTS` subqueries over `json_each`.
//! Datetimes are RFC 3339 UTC text, so range checks compare strings.

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

use crate::data::sql::{SqlDialect, SqliteDialect};

/// Current array element inside a `json_each` subquery
const ELEMENT: &str = "json_each.value";

/// `IFNULL(NOT (p), 1)`: the complement of `p` including NULL
fn not_true(predicate: &str) -> String {
    SqliteDialect.not_true(predicate)
}

fn each_exists(expr: &str, condition: &str) -> String {
    format!(
        "EXISTS (SELECT 1 FROM json_each({}) WHERE {})",
        expr, condition
    )
}

fn each_not_exists(expr: &str, condition: &str) -> String {
    format!("NOT {}", each_exists(expr, condition))
}

fn array_is_empty(expr: &str) -> String {
    format!(
        "({} IS NULL OR {} = 0)",
        expr,
        SqliteDialect.json_array_length(expr)
    )
}

fn array_is_not_empty(expr: &str) -> String {
    format!("{} > 0", SqliteDialect.json_array_length(expr))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_exists() {
        assert_eq!(
            each_exists("\"tags\"", "json_each.value = ?"),
            "EXISTS (SELECT 1 FROM json_each(\"tags\") WHERE json_each.value = ?)"
        );
        assert_eq!(
            each_not_exists("\"tags\"", "json_each.value = ?"),
            "NOT EXISTS (SELECT 1 FROM json_each(\"tags\") WHERE json_each.value = ?)"
        );
    }

    #[test]
    fn test_array_emptiness() {
        assert_eq!(
            array_is_empty("\"tags\""),
            "(\"tags\" IS NULL OR json_array_length(\"tags\") = 0)"
        );
        assert_eq!(
            array_is_not_empty("\"tags\""),
            "json_array_length(\"tags\") > 0"
        );
    }

    #[test]
    fn test_not_true() {
        assert_eq!(not_true("\"done\" = 1"), "IFNULL(NOT (\"done\" = 1), 1)");
    }
}
