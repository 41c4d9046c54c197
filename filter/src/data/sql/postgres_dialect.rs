//! PostgreSQL SQL dialect implementation

use super::SqlDialect;

/// PostgreSQL SQL dialect
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn json_field_text(&self, expr: &str, field: &str) -> String {
        format!("{}->>'{}'", expr, field)
    }

    fn json_array_length(&self, expr: &str) -> String {
        format!("jsonb_array_length({})", expr)
    }

    fn like(&self, expr: &str, placeholder: &str) -> String {
        format!("{} ILIKE {} ESCAPE '\\'", expr, placeholder)
    }

    fn not_true(&self, predicate: &str) -> String {
        format!("({}) IS NOT TRUE", predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.placeholder(1), "$1");
        assert_eq!(dialect.placeholder(5), "$5");
    }

    #[test]
    fn test_quote_identifier() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.quote_identifier("score"), "\"score\"");
        assert_eq!(dialect.quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn test_json_helpers() {
        let dialect = PostgresDialect;
        assert_eq!(
            dialect.json_field_text("\"owner\"", "id"),
            "\"owner\"->>'id'"
        );
        assert_eq!(
            dialect.json_array_length("\"tags\""),
            "jsonb_array_length(\"tags\")"
        );
    }

    #[test]
    fn test_like_and_not_true() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.like("name", "$2"), "name ILIKE $2 ESCAPE '\\'");
        assert_eq!(dialect.not_true("name = $1"), "(name = $1) IS NOT TRUE");
    }
}
