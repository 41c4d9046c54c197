//! Boolean columns, stored as integer `1`; NULL reads as false

use serde_json::Value;

use super::{each_exists, each_not_exists, not_true};
use crate::data::filters::contract::{OperatorContract, is_truthy};
use crate::data::filters::error::FilterResult;
use crate::data::filters::operator::Operator;
use crate::data::filters::types::ColumnMeta;
use crate::data::sql::SqlParams;

pub struct BooleanCell<'a> {
    column: &'a ColumnMeta,
    expr: String,
}

impl<'a> BooleanCell<'a> {
    pub fn new(column: &'a ColumnMeta, expr: String) -> Self {
        Self { column, expr }
    }

    fn presence(&self, present: bool) -> String {
        let is_true = format!("{} = 1", self.expr);
        if present { is_true } else { not_true(&is_true) }
    }
}

impl OperatorContract for BooleanCell<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "sqlite.boolean"
    }

    fn equals(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(self.presence(is_truthy(value)))
    }

    fn not_equals(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(self.presence(!is_truthy(value)))
    }

    fn is_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(self.presence(false))
    }

    fn is_not_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(self.presence(true))
    }
}

/// JSON array of booleans; "true" means any element is `true`
pub struct BooleanArray<'a> {
    column: &'a ColumnMeta,
    expr: String,
}

impl<'a> BooleanArray<'a> {
    pub fn new(column: &'a ColumnMeta, expr: String) -> Self {
        Self { column, expr }
    }

    fn presence(&self, present: bool) -> String {
        let any_true = "json_each.type = 'true'";
        if present {
            each_exists(&self.expr, any_true)
        } else {
            each_not_exists(&self.expr, any_true)
        }
    }
}

impl OperatorContract for BooleanArray<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "sqlite.boolean[]"
    }

    fn equals(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(self.presence(is_truthy(value)))
    }

    fn not_equals(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(self.presence(!is_truthy(value)))
    }

    fn is_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(self.presence(false))
    }

    fn is_not_empty(
        &self,
        _params: &mut SqlParams,
        _op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Ok(self.presence(true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::types::SemanticType;
    use crate::data::sql::Dialect;
    use serde_json::json;

    #[test]
    fn test_boolean_cell() {
        let column = ColumnMeta::new("done", "done", SemanticType::Boolean);
        let cell = BooleanCell::new(&column, "\"done\"".to_string());
        let mut params = SqlParams::new(Dialect::Sqlite);
        assert_eq!(
            cell.apply(&mut params, Operator::Equals, &json!(1)).unwrap(),
            "\"done\" = 1"
        );
        assert_eq!(
            cell.apply(&mut params, Operator::IsEmpty, &Value::Null).unwrap(),
            "IFNULL(NOT (\"done\" = 1), 1)"
        );
        assert!(params.is_empty());
    }

    #[test]
    fn test_boolean_array() {
        let column = ColumnMeta::new("flags", "flags", SemanticType::Boolean).multi();
        let cell = BooleanArray::new(&column, "\"flags\"".to_string());
        let mut params = SqlParams::new(Dialect::Sqlite);
        assert_eq!(
            cell.apply(&mut params, Operator::Equals, &json!(true)).unwrap(),
            "EXISTS (SELECT 1 FROM json_each(\"flags\") WHERE json_each.type = 'true')"
        );
        assert_eq!(
            cell.apply(&mut params, Operator::Equals, &json!(false)).unwrap(),
            "NOT EXISTS (SELECT 1 FROM json_each(\"flags\") WHERE json_each.type = 'true')"
        );
    }
}
