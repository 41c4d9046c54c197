//! Datetime columns
//!
//! Cells hold fixed-width RFC 3339 UTC text; the sqlx adapter binds range
//! bounds in the same format so text order equals time order.

use serde_json::Value;

use super::{ELEMENT, array_is_empty, array_is_not_empty, each_exists, each_not_exists, not_true};
use crate::data::filters::contract::{DateClock, OperatorContract, resolve_date_range};
use crate::data::filters::date_range::DateRange;
use crate::data::filters::error::FilterResult;
use crate::data::filters::operator::Operator;
use crate::data::filters::types::ColumnMeta;
use crate::data::sql::SqlParams;

/// Which range bound an ordering operator compares against
#[derive(Clone, Copy)]
enum Bound {
    Start,
    End,
}

/// `target BETWEEN start AND end`, or `target <cmp> bound`
fn range_sql(
    params: &mut SqlParams,
    target: &str,
    range: &DateRange,
    cmp: Option<(&str, Bound)>,
) -> String {
    match cmp {
        None => {
            let start = params.push(range.start_utc());
            let end = params.push(range.end_utc());
            format!("{} BETWEEN {} AND {}", target, start, end)
        }
        Some((cmp, Bound::Start)) => {
            format!("{} {} {}", target, cmp, params.push(range.start_utc()))
        }
        Some((cmp, Bound::End)) => format!("{} {} {}", target, cmp, params.push(range.end_utc())),
    }
}

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

    fn compile(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
        cmp: Option<(&str, Bound)>,
    ) -> FilterResult<String> {
        let range = resolve_date_range(self.column, op, value, &self.clock)?;
        Ok(range_sql(params, &self.expr, &range, cmp))
    }
}

impl OperatorContract for DatetimeCell<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "sqlite.datetime"
    }

    fn equals(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.compile(params, op, value, None)
    }

    fn not_equals(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(not_true(&self.compile(params, op, value, None)?))
    }

    fn within(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.compile(params, op, value, None)
    }

    fn greater_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compile(params, op, value, Some((">", Bound::End)))
    }

    fn greater_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compile(params, op, value, Some((">=", Bound::Start)))
    }

    fn less_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compile(params, op, value, Some(("<", Bound::Start)))
    }

    fn less_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.compile(params, op, value, Some(("<=", Bound::End)))
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

/// JSON array of RFC 3339 UTC strings; comparisons hold when any element matches
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

    fn element_sql(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
        cmp: Option<(&str, Bound)>,
    ) -> FilterResult<String> {
        let range = resolve_date_range(self.column, op, value, &self.clock)?;
        Ok(range_sql(params, ELEMENT, &range, cmp))
    }

    fn any(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
        cmp: Option<(&str, Bound)>,
    ) -> FilterResult<String> {
        Ok(each_exists(&self.expr, &self.element_sql(params, op, value, cmp)?))
    }
}

impl OperatorContract for DatetimeArray<'_> {
    fn column(&self) -> &ColumnMeta {
        self.column
    }

    fn name(&self) -> &'static str {
        "sqlite.datetime[]"
    }

    fn equals(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.any(params, op, value, None)
    }

    fn not_equals(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        Ok(each_not_exists(&self.expr, &self.element_sql(params, op, value, None)?))
    }

    fn within(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        self.any(params, op, value, None)
    }

    fn greater_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.any(params, op, value, Some((">", Bound::End)))
    }

    fn greater_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.any(params, op, value, Some((">=", Bound::Start)))
    }

    fn less_than(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.any(params, op, value, Some(("<", Bound::Start)))
    }

    fn less_or_equal(
        &self,
        params: &mut SqlParams,
        op: Operator,
        value: &Value,
    ) -> FilterResult<String> {
        self.any(params, op, value, Some(("<=", Bound::End)))
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
