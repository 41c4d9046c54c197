//! LIKE pattern helpers
//!
//! Substring operators compile to `LIKE`/`ILIKE ... ESCAPE '\'` in both
//! dialects, so user text must have its metacharacters escaped first.

/// Escape `%`, `_` and `\` so they match literally under `ESCAPE '\'`
pub fn escape_like_pattern(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Unanchored pattern matching `s` anywhere in the value
///
/// ```
/// use tabula_filter::utils::sql::contains_pattern;
///
/// assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
/// ```
pub fn contains_pattern(s: &str) -> String {
    format!("%{}%", escape_like_pattern(s))
}
