//! Text columns and string-set arrays

use serde_json::Value;

use super::{array_is_empty, array_is_not_empty, not_true};
use crate::data::filters::contract::{
    OperatorContract, distinct_text_list, expect_text_list, text_operand,
};
use crate::data::filters::error::FilterResult;
use crate::data::filters::operator::Operator;
use crate::data::filters::types::ColumnMeta;
use crate::data::sql::{PostgresDialect, SqlDialect, SqlParams, SqlValue};
use crate::utils::sql::contains_pattern;

pub struct TextCell<'a> {
    column: &'a ColumnMeta,
    expr: String,
}

impl<'a> TextCell<'a> {
    pub fn new(column: &'a ColumnMeta, expr: String) -> Self {
        Self { column, expr }
    }

    fn equals_sql(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let text = text_operand(self.column, op, value)?;
        Ok(format!("{} = {}", self.expr, params.push(text)))
    }

    fn like_sql(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let text = text_operand(self.column, op, value)?;
        let p = params.push(contains_pattern(&text));
        Ok(PostgresDialect.like(&self.expr, &p))
    }

    fn any_sql(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        let values = expect_text_list(self.column, op, value)?;
        Ok(format!(
            "{} = ANY({})",
            self.expr,
            params.push(SqlValue::TextArray(values))
        ))
    }
}

impl OperatorContract for TextCell<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "postgres.text"
    }

    fn equals(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.equals_sql(params, op, value)
    }

    fn not_equals(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(not_true(&self.equals_sql(params, op, value)?))
    }

    fn contains(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.like_sql(params, op, value)
    }

    fn not_contains(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(not_true(&self.like_sql(params, op, value)?))
    }

    fn any_of(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.any_sql(params, op, value)
    }

    fn none_of(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        Ok(not_true(&self.any_sql(params, op, value)?))
    }

    fn is_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(format!("({} IS NULL OR {} = '')", self.expr, self.expr))
    }

    fn is_not_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(format!("{} <> ''", self.expr))
    }
}

/// Element shape of a string-set array
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayShape {
    /// `["red", "blue"]`
    Text,
    /// `[{ "id": "rec1", "title": "Invoice" }]`, matched on `id`, searched on `title`
    Structured,
}

/// `jsonb` array treated as a set of strings
pub struct StringArray<'a> {
    column: &'a ColumnMeta,
    expr: String,
    shape: ArrayShape,
}

impl<'a> StringArray<'a> {
    pub fn text(column: &'a ColumnMeta, expr: String) -> Self {
        Self {
            column,
            expr,
            shape: ArrayShape::Text,
        }
    }

    pub fn structured(column: &'a ColumnMeta, expr: String) -> Self {
        Self {
            column,
            expr,
            shape: ArrayShape::Structured,
        }
    }

    /// The set members as a `jsonb` array of strings; numeric ids are stringified
    fn members(&self) -> String {
        match self.shape {
            ArrayShape::Text => self.expr.clone(),
            ArrayShape::Structured => format!(
                "(SELECT jsonb_agg(elem->>'id') FROM jsonb_array_elements({}) AS elem)",
                self.expr
            ),
        }
    }

    fn equals_sql(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let text = text_operand(self.column, op, value)?;
        Ok(format!(
            "{} @> jsonb_build_array({}::text)",
            self.members(),
            params.push(text)
        ))
    }

    fn any_sql(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        let values = expect_text_list(self.column, op, value)?;
        Ok(format!(
            "{} ?| {}",
            self.members(),
            params.push(SqlValue::TextArray(values))
        ))
    }

    fn like_sql(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let text = text_operand(self.column, op, value)?;
        let p = params.push(contains_pattern(&text));
        let (elements, element_text) = match self.shape {
            ArrayShape::Text => ("jsonb_array_elements_text", "elem.value".to_string()),
            ArrayShape::Structured => (
                "jsonb_array_elements",
                PostgresDialect.json_field_text("elem.value", "title"),
            ),
        };
        Ok(format!(
            "EXISTS (SELECT 1 FROM {}({}) AS elem(value) WHERE {})",
            elements,
            self.expr,
            PostgresDialect.like(&element_text, &p)
        ))
    }
}

impl OperatorContract for StringArray<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        match self.shape {
            ArrayShape::Text => "postgres.text[]",
            ArrayShape::Structured => "postgres.structured[]",
        }
    }

    fn equals(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.equals_sql(params, op, value)
    }

    fn not_equals(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(not_true(&self.equals_sql(params, op, value)?))
    }

    fn any_of(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.any_sql(params, op, value)
    }

    fn none_of(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        Ok(not_true(&self.any_sql(params, op, value)?))
    }

    fn all_of(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        let values = expect_text_list(self.column, op, value)?;
        Ok(format!(
            "{} ?& {}",
            self.members(),
            params.push(SqlValue::TextArray(values))
        ))
    }

    fn exactly(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        let values = distinct_text_list(self.column, op, value)?;
        let p = params.push(SqlValue::Json(Value::from(values)));
        let members = self.members();
        Ok(format!(
            "({} @> {}::jsonb AND {} <@ {}::jsonb)",
            members, p, members, p
        ))
    }

    fn contains(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.like_sql(params, op, value)
    }

    fn not_contains(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(format!("NOT {}", self.like_sql(params, op, value)?))
    }

    fn is_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(array_is_empty(&self.expr))
    }

    fn is_not_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(array_is_not_empty(&self.expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::types::SemanticType;
    use crate::data::sql::Dialect;
    use serde_json::json;

    #[test]
    fn test_text_cell() {
        let column = ColumnMeta::new("name", "name", SemanticType::Text);
        let cell = TextCell::new(&column, "\"name\"".to_string());
        let mut params = SqlParams::new(Dialect::Postgres);

        let sql = cell.apply(&mut params, Operator::Contains, &json!("50%_off")).unwrap();
        assert_eq!(sql, r#""name" ILIKE $1 ESCAPE '\'"#);
        let sql = cell.apply(&mut params, Operator::NoneOf, &json!(["a", "b"])).unwrap();
        assert_eq!(sql, r#"("name" = ANY($2)) IS NOT TRUE"#);
        assert_eq!(
            params.values,
            vec![
                SqlValue::from("%50\\%\\_off%"),
                SqlValue::TextArray(vec!["a".to_string(), "b".to_string()]),
            ]
        );

        assert!(cell.apply(&mut params, Operator::AllOf, &json!(["a"])).is_err());
    }

    #[test]
    fn test_text_array() {
        let column = ColumnMeta::new("tags", "tags", SemanticType::Text).multi();
        let cell = StringArray::text(&column, "\"tags\"".to_string());
        let mut params = SqlParams::new(Dialect::Postgres);

        assert_eq!(
            cell.apply(&mut params, Operator::Equals, &json!("red")).unwrap(),
            r#""tags" @> jsonb_build_array($1::text)"#
        );
        assert_eq!(
            cell.apply(&mut params, Operator::AnyOf, &json!(["red", "green"])).unwrap(),
            r#""tags" ?| $2"#
        );
        assert_eq!(
            cell.apply(&mut params, Operator::AllOf, &json!(["red", "blue"])).unwrap(),
            r#""tags" ?& $3"#
        );
        assert_eq!(
            cell.apply(
                &mut params,
                Operator::Exactly,
                &json!(["blue", "red", "blue"]),
            )
            .unwrap(),
            r#"("tags" @> $4::jsonb AND "tags" <@ $4::jsonb)"#
        );
        assert_eq!(params.values[3], SqlValue::Json(json!(["blue", "red"])));
        assert_eq!(
            cell.apply(&mut params, Operator::NotContains, &json!("re")).unwrap(),
            r#"NOT EXISTS (SELECT 1 FROM jsonb_array_elements_text("tags") AS elem(value) WHERE elem.value ILIKE $5 ESCAPE '\')"#
        );
    }

    #[test]
    fn test_structured_array() {
        let column = ColumnMeta::new("links", "links", SemanticType::Structured).multi();
        let cell = StringArray::structured(&column, "\"links\"".to_string());
        let mut params = SqlParams::new(Dialect::Postgres);

        assert_eq!(
            cell.apply(
                &mut params,
                Operator::Equals,
                &json!({ "id": "rec2", "title": "Receipt" }),
            )
                .unwrap(),
            r#"(SELECT jsonb_agg(elem->>'id') FROM jsonb_array_elements("links") AS elem) @> jsonb_build_array($1::text)"#
        );
        assert_eq!(params.values, vec![SqlValue::from("rec2")]);
        assert_eq!(
            cell.apply(&mut params, Operator::Contains, &json!("invoice")).unwrap(),
            r#"EXISTS (SELECT 1 FROM jsonb_array_elements("links") AS elem(value) WHERE elem.value->>'title' ILIKE $2 ESCAPE '\')"#
        );
        assert_eq!(cell.name(), "postgres.structured[]");
    }
}
