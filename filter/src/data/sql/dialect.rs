//! SQL dialect trait for multi-database support
//!
//! This trait defines the interface for generating database-specific SQL syntax
//! shared by the filter compilers.

/// SQL dialect trait for generating database-specific SQL
///
/// Different databases have different syntax for:
/// - Parameter placeholders (? vs $1)
/// - JSON field access and array length
/// - Case-insensitive pattern matching
/// - NULL handling in negated predicates
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Quote an identifier (column or table name)
    ///
    /// Both supported dialects accept standard double quotes; embedded quotes are doubled.
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// Extract a top-level field of a JSON object as text
    ///
    /// - PostgreSQL: `col->>'field'`
    /// - SQLite: `json_extract(col, '$.field')`
    ///
    /// `field` must be a trusted constant, never user input.
    fn json_field_text(&self, expr: &str, field: &str) -> String;

    /// Length of a JSON array
    ///
    /// - PostgreSQL: `jsonb_array_length(col)`
    /// - SQLite: `json_array_length(col)`
    fn json_array_length(&self, expr: &str) -> String;

    /// Case-insensitive LIKE with backslash escapes
    ///
    /// - PostgreSQL: `col ILIKE $1 ESCAPE '\'`, folding follows the database locale
    /// - SQLite: `col LIKE ? ESCAPE '\'`, which folds ASCII letters only, so
    ///   `ä` does not match `Ä`
    fn like(&self, expr: &str, placeholder: &str) -> String;

    /// Predicate that holds whenever `predicate` is not true, including when it is NULL
    ///
    /// - PostgreSQL: `(p) IS NOT TRUE`
    /// - SQLite: `IFNULL(NOT (p), 1)`
    fn not_true(&self, predicate: &str) -> String;
}
