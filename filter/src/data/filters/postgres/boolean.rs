//! Boolean columns
//!
//! Presence semantics: NULL reads as false, so `isEmpty` is `equals(false)`.

use serde_json::Value;

use super::not_true;
use crate::data::filters::contract::{OperatorContract, is_truthy};
use crate::data::filters::error::FilterResult;
use crate::data::filters::operator::Operator;
use crate::data::filters::types::ColumnMeta;
use crate::data::sql::SqlParams;

fn presence(is_true: String, present: bool) -> String {
    if present { is_true } else { not_true(&is_true) }
}

pub struct BooleanCell<'a> {
    column: &'a ColumnMeta,
    expr: String,
}

impl<'a> BooleanCell<'a> {
    pub fn new(column: &'a ColumnMeta, expr: String) -> Self {
        Self { column, expr }
    }

    fn is_true(&self) -> String {
        format!("{} = TRUE", self.expr)
    }
}

impl OperatorContract for BooleanCell<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "postgres.boolean"
    }

    fn equals(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(presence(self.is_true(), is_truthy(value)))
    }

    fn not_equals(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(presence(self.is_true(), !is_truthy(value)))
    }

    fn is_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(presence(self.is_true(), false))
    }

    fn is_not_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(presence(self.is_true(), true))
    }
}

/// `jsonb` array of booleans; "true" means any element is true
pub struct BooleanArray<'a> {
    column: &'a ColumnMeta,
    expr: String,
}

impl<'a> BooleanArray<'a> {
    pub fn new(column: &'a ColumnMeta, expr: String) -> Self {
        Self { column, expr }
    }

    fn is_true(&self) -> String {
        format!("jsonb_path_exists({}, '$[*] ? (@ == true)')", self.expr)
    }
}

impl OperatorContract for BooleanArray<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "postgres.boolean[]"
    }

    fn equals(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(presence(self.is_true(), is_truthy(value)))
    }

    fn not_equals(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(presence(self.is_true(), !is_truthy(value)))
    }

    fn is_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(presence(self.is_true(), false))
    }

    fn is_not_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(presence(self.is_true(), true))
    }
}
