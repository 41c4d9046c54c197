//! Number columns

use serde_json::Value;

use super::{any_element, array_is_empty, array_is_not_empty, not_true};
use crate::data::filters::contract::{OperatorContract, expect_number};
use crate::data::filters::error::FilterResult;
use crate::data::filters::operator::Operator;
use crate::data::filters::types::ColumnMeta;
use crate::data::sql::{SqlParams, SqlValue};

pub struct NumberCell<'a> {
    column: &'a ColumnMeta,
    expr: String,
}

impl<'a> NumberCell<'a> {
    pub fn new(column: &'a ColumnMeta, expr: String) -> Self {
        Self { column, expr }
    }

    fn compare(
        &self,
        params: &mut SqlParams,
        cmp: &str,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let n = expect_number(self.column, op, value)?;
        Ok(format!("{} {} {}", self.expr, cmp, params.push(n)))
    }
}

impl OperatorContract for NumberCell<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "postgres.number"
    }

    fn equals(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.compare(params, "=", op, value)
    }

    fn not_equals(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(not_true(&self.compare(params, "=", op, value)?))
    }

    fn greater_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compare(params, ">", op, value)
    }

    fn greater_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compare(params, ">=", op, value)
    }

    fn less_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compare(params, "<", op, value)
    }

    fn less_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compare(params, "<=", op, value)
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

/// `jsonb` array of numbers; comparisons hold when any element matches
pub struct NumberArray<'a> {
    column: &'a ColumnMeta,
    expr: String,
}

impl<'a> NumberArray<'a> {
    pub fn new(column: &'a ColumnMeta, expr: String) -> Self {
        Self { column, expr }
    }

    fn compare(
        &self,
        params: &mut SqlParams,
        cmp: &str,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let n = expect_number(self.column, op, value)?;
        Ok(any_element(
            params,
            &self.expr,
            &format!("@ {} $v", cmp),
            vec![("v", SqlValue::Float(n))],
            "float8",
        ))
    }
}

impl OperatorContract for NumberArray<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "postgres.number[]"
    }

    fn equals(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.compare(params, "==", op, value)
    }

    fn not_equals(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(not_true(&self.compare(params, "==", op, value)?))
    }

    fn greater_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compare(params, ">", op, value)
    }

    fn greater_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compare(params, ">=", op, value)
    }

    fn less_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compare(params, "<", op, value)
    }

    fn less_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compare(params, "<=", op, value)
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
