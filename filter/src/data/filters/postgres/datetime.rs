//! Datetime columns
//!
//! Every date operator resolves its value to a `[start, end]` range first.
//! Ordering uses the bound that keeps the whole day on the right side:
//! `> end`, `>= start`, `< start`, `<= end`.

use chrono::{DateTime, Utc};
use serde_json::Value;

use super::{any_element, array_is_empty, array_is_not_empty, not_true};
use crate::data::filters::contract::{DateClock, OperatorContract, resolve_date_range};
use crate::data::filters::date_range::DateRange;
use crate::data::filters::error::FilterResult;
use crate::data::filters::operator::Operator;
use crate::data::filters::types::ColumnMeta;
use crate::data::sql::{SqlParams, SqlValue};
use crate::utils::time::format_utc_millis;

pub struct DatetimeCell<'a> {
    column: &'a ColumnMeta,
    expr: String,
    clock: DateClock,
}

impl<'a> DatetimeCell<'a> {
    pub fn new(column: &'a ColumnMeta, expr: String, clock: DateClock) -> Self {
        Self {
            column,
            expr,
            clock,
        }
    }

    fn range(&self, op: Operator, value: &Value) -> FilterResult<DateRange> {
        resolve_date_range(self.column, op, value, &self.clock)
    }

    fn between(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        let range = self.range(op, value)?;
        let start = params.push(range.start_utc());
        let end = params.push(range.end_utc());
        Ok(format!("{} BETWEEN {} AND {}", self.expr, start, end))
    }
}

impl OperatorContract for DatetimeCell<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "postgres.datetime"
    }

    fn equals(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.between(params, op, value)
    }

    fn not_equals(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(not_true(&self.between(params, op, value)?))
    }

    fn within(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.between(params, op, value)
    }

    fn greater_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let end = self.range(op, value)?.end_utc();
        Ok(format!("{} > {}", self.expr, params.push(end)))
    }

    fn greater_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let start = self.range(op, value)?.start_utc();
        Ok(format!("{} >= {}", self.expr, params.push(start)))
    }

    fn less_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let start = self.range(op, value)?.start_utc();
        Ok(format!("{} < {}", self.expr, params.push(start)))
    }

    fn less_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let end = self.range(op, value)?.end_utc();
        Ok(format!("{} <= {}", self.expr, params.push(end)))
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

/// `jsonb` array of RFC 3339 UTC strings, compared as text inside jsonpath
pub struct DatetimeArray<'a> {
    column: &'a ColumnMeta,
    expr: String,
    clock: DateClock,
}

impl<'a> DatetimeArray<'a> {
    pub fn new(column: &'a ColumnMeta, expr: String, clock: DateClock) -> Self {
        Self {
            column,
            expr,
            clock,
        }
    }

    fn range(&self, op: Operator, value: &Value) -> FilterResult<DateRange> {
        resolve_date_range(self.column, op, value, &self.clock)
    }

    fn between(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        let range = self.range(op, value)?;
        Ok(any_element(
            params,
            &self.expr,
            "@ >= $start && @ <= $end",
            vec![
                ("start", SqlValue::Text(format_utc_millis(range.start_utc()))),
                ("end", SqlValue::Text(format_utc_millis(range.end_utc()))),
            ],
            "text",
        ))
    }

    fn bound(
        &self,
        params: &mut SqlParams,
        filter: &str,
        name: &str,
        instant: DateTime<Utc>,
    ) -> String {
        any_element(
            params,
            &self.expr,
            filter,
            vec![(name, SqlValue::Text(format_utc_millis(instant)))],
            "text",
        )
    }
}

impl OperatorContract for DatetimeArray<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "postgres.datetime[]"
    }

    fn equals(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.between(params, op, value)
    }

    fn not_equals(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(not_true(&self.between(params, op, value)?))
    }

    fn within(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.between(params, op, value)
    }

    fn greater_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let end = self.range(op, value)?.end_utc();
        Ok(self.bound(params, "@ > $end", "end", end))
    }

    fn greater_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let start = self.range(op, value)?.start_utc();
        Ok(self.bound(params, "@ >= $start", "start", start))
    }

    fn less_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let start = self.range(op, value)?.start_utc();
        Ok(self.bound(params, "@ < $start", "start", start))
    }

    fn less_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        let end = self.range(op, value)?.end_utc();
        Ok(self.bound(params, "@ <= $end", "end", end))
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
