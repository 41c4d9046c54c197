//! Text columns and string-set arrays

use serde_json::Value;

use super::{ELEMENT, array_is_empty, array_is_not_empty, each_exists, each_not_exists, not_true};
use crate::data::filters::contract::{
    OperatorContract, distinct_text_list, expect_text_list, text_operand,
};
use crate::data::filters::error::FilterResult;
use crate::data::filters::operator::Operator;
use crate::data::filters::types::ColumnMeta;
use crate::data::sql::{SqlDialect, SqlParams, SqlValue, SqliteDialect, bind_list};
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
        Ok(SqliteDialect.like(&self.expr, &p))
    }

    fn in_sql(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        let values = expect_text_list(self.column, op, value)?;
        Ok(format!("{} IN ({})", self.expr, bind_list(params, values)))
    }
}

impl OperatorContract for TextCell<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "sqlite.text"
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
        self.in_sql(params, op, value)
    }

    fn none_of(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        Ok(not_true(&self.in_sql(params, op, value)?))
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

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArrayShape {
    Text,
    Structured,
}

/// JSON text array treated as a set of strings
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

    /// Set member of the current `json_each` row
    fn member(&self) -> String {
        match self.shape {
            ArrayShape::Text => ELEMENT.to_string(),
            ArrayShape::Structured => format!(
                "CAST({} AS TEXT)",
                SqliteDialect.json_field_text(ELEMENT, "id")
            ),
        }
    }

    /// Searchable text of the current `json_each` row
    fn element_text(&self) -> String {
        match self.shape {
            ArrayShape::Text => ELEMENT.to_string(),
            ArrayShape::Structured => SqliteDialect.json_field_text(ELEMENT, "title"),
        }
    }

    fn equals_condition(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let text = text_operand(self.column, op, value)?;
        Ok(format!("{} = {}", self.member(), params.push(text)))
    }

    fn in_condition(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let values = expect_text_list(self.column, op, value)?;
        Ok(format!("{} IN ({})", self.member(), bind_list(params, values)))
    }

    fn like_condition(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let text = text_operand(self.column, op, value)?;
        let p = params.push(contains_pattern(&text));
        Ok(SqliteDialect.like(&self.element_text(), &p))
    }

    /// Number of distinct supplied values present in the set equals their count
    fn has_all(&self, params: &mut SqlParams, values: &[String]) -> String {
        let member = self.member();
        let list = bind_list(params, values.iter().cloned());
        let count = params.push(SqlValue::Int(values.len() as i64));
        format!(
            "(SELECT COUNT(DISTINCT {}) FROM json_each({}) WHERE {} IN ({})) = {}",
            member, self.expr, member, list, count
        )
    }
}

impl OperatorContract for StringArray<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        match self.shape {
            ArrayShape::Text => "sqlite.text[]",
            ArrayShape::Structured => "sqlite.structured[]",
        }
    }

    fn equals(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        Ok(each_exists(&self.expr, &self.equals_condition(params, op, value)?))
    }

    fn not_equals(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(each_not_exists(&self.expr, &self.equals_condition(params, op, value)?))
    }

    fn any_of(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        Ok(each_exists(&self.expr, &self.in_condition(params, op, value)?))
    }

    fn none_of(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        Ok(each_not_exists(&self.expr, &self.in_condition(params, op, value)?))
    }

    fn all_of(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        let values = distinct_text_list(self.column, op, value)?;
        Ok(self.has_all(params, &values))
    }

    fn exactly(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        let values = distinct_text_list(self.column, op, value)?;
        let has_all = self.has_all(params, &values);
        let member = self.member();
        let outside = format!(
            "{} IS NULL OR {} NOT IN ({})",
            member,
            member,
            bind_list(params, values)
        );
        Ok(format!(
            "({} AND {})",
            has_all,
            each_not_exists(&self.expr, &outside)
        ))
    }

    fn contains(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(each_exists(&self.expr, &self.like_condition(params, op, value)?))
    }

    fn not_contains(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(each_not_exists(&self.expr, &self.like_condition(params, op, value)?))
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
