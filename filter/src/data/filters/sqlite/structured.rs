//! Structured columns: JSON objects `{ "id", "title" }` stored as text

use serde_json::Value;

use super::not_true;
use crate::data::filters::contract::{OperatorContract, expect_text_list, text_operand};
use crate::data::filters::error::FilterResult;
use crate::data::filters::operator::Operator;
use crate::data::filters::types::ColumnMeta;
use crate::data::sql::{SqlDialect, SqlParams, SqliteDialect, bind_list};
use crate::utils::sql::contains_pattern;

pub struct StructuredCell<'a> {
    column: &'a ColumnMeta,
    expr: String,
}

impl<'a> StructuredCell<'a> {
    pub fn new(column: &'a ColumnMeta, expr: String) -> Self {
        Self { column, expr }
    }

    /// Numeric ids come back from `json_extract` as integers
    fn id(&self) -> String {
        format!(
            "CAST({} AS TEXT)",
            SqliteDialect.json_field_text(&self.expr, "id")
        )
    }

    fn equals_sql(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let id = text_operand(self.column, op, value)?;
        Ok(format!("{} = {}", self.id(), params.push(id)))
    }

    fn in_sql(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        let ids = expect_text_list(self.column, op, value)?;
        Ok(format!("{} IN ({})", self.id(), bind_list(params, ids)))
    }

    fn like_sql(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let text = text_operand(self.column, op, value)?;
        let p = params.push(contains_pattern(&text));
        let title = SqliteDialect.json_field_text(&self.expr, "title");
        Ok(SqliteDialect.like(&title, &p))
    }
}

impl OperatorContract for StructuredCell<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "sqlite.structured"
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
        self.in_sql(params, op, value)
    }

    fn none_of(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        Ok(not_true(&self.in_sql(params, op, value)?))
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

    fn is_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(format!("{} IS NULL", self.expr))
    }

    fn is_not_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(format!("{} IS NOT NULL", self.expr))
    }
}
