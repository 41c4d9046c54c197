//! SQLite SQL dialect implementation

use super::SqlDialect;

/// SQLite SQL dialect
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn json_field_text(&self, expr: &str, field: &str) -> String {
        format!("json_extract({}, '$.{}')", expr, field)
    }

    fn json_array_length(&self, expr: &str) -> String {
        format!("json_array_length({})", expr)
    }

    fn like(&self, expr: &str, placeholder: &str) -> String {
        // Built-in LIKE folds ASCII only; non-ASCII letters compare exactly
        format!("{} LIKE {} ESCAPE '\\'", expr, placeholder)
    }

    fn not_true(&self, predicate: &str) -> String {
        // SQLite comparisons yield NULL for NULL operands; coalesce so NULL rows match
        format!("IFNULL(NOT ({}), 1)", predicate)
    }
}
