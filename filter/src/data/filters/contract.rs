//! Operator contract
//!
//! One method per operator. A compiler implements the methods its column kind
//! supports; everything else reports an unsupported operation. Methods push
//! their values into the parameter accumulator and return a SQL fragment that
//! references them by placeholder only.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde_json::Value;

use super::date_range::{self, DateFilter, DateRange};
use super::error::{FilterError, FilterResult};
use super::operator::Operator;
use super::types::ColumnMeta;
use crate::data::sql::SqlParams;

pub trait OperatorContract {
    /// Column this compiler was built for
    fn column(&self) -> &ColumnMeta;

    /// Compiler name used in error messages, e.g. `postgres.number[]`
    fn name(&self) -> &'static str;

    fn unsupported(&self, op: Operator) -> FilterError {
        FilterError::UnsupportedOperation {
            column: self.column().id.clone(),
            operator: op,
            compiler: self.name(),
        }
    }

    fn equals(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn not_equals(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn exactly(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn contains(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn not_contains(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn greater_than(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn greater_or_equal(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn less_than(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn less_or_equal(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn any_of(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn none_of(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn all_of(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn within(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn is_empty(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    fn is_not_empty(
        &self,
        _params: &mut SqlParams,
        op: Operator,
        _value: &Value,
    ) -> FilterResult<String> {
        Err(self.unsupported(op))
    }

    /// Route an operator to its method; date aliases go to the ordering methods
    fn apply(&self, params: &mut SqlParams, op: Operator, value: &Value) -> FilterResult<String> {
        match op {
            Operator::Equals => self.equals(params, op, value),
            Operator::NotEquals => self.not_equals(params, op, value),
            Operator::Exactly => self.exactly(params, op, value),
            Operator::Contains => self.contains(params, op, value),
            Operator::NotContains => self.not_contains(params, op, value),
            Operator::GreaterThan | Operator::After => self.greater_than(params, op, value),
            Operator::GreaterOrEqual | Operator::OnOrAfter => {
                self.greater_or_equal(params, op, value)
            }
            Operator::LessThan | Operator::Before => self.less_than(params, op, value),
            Operator::LessOrEqual | Operator::OnOrBefore => self.less_or_equal(params, op, value),
            Operator::AnyOf => self.any_of(params, op, value),
            Operator::NoneOf => self.none_of(params, op, value),
            Operator::AllOf => self.all_of(params, op, value),
            Operator::Within => self.within(params, op, value),
            Operator::IsEmpty => self.is_empty(params, op, value),
            Operator::IsNotEmpty => self.is_not_empty(params, op, value),
        }
    }
}

// =============================================================================
// Date helpers
// =============================================================================

/// Zone and reference instant a datetime compiler resolves ranges against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateClock {
    pub time_zone: Tz,
    pub now: DateTime<Utc>,
}

/// Parse a date operator's value and check its mode suits the operator:
/// `within` takes rolling windows, every other date operator takes a day
pub fn parse_date_filter(
    column: &ColumnMeta,
    op: Operator,
    value: &Value,
) -> FilterResult<DateFilter> {
    let filter = DateFilter::from_value(value).map_err(|reason| FilterError::MalformedValue {
        column: column.id.clone(),
        operator: op,
        reason,
    })?;

    let legal = if op == Operator::Within {
        filter.mode.is_rolling()
    } else {
        filter.mode.is_day()
    };
    if !legal {
        return Err(FilterError::InvalidSubMode {
            column: column.id.clone(),
            operator: op,
            mode: filter.mode.to_string(),
        });
    }
    Ok(filter)
}

pub fn resolve_date_range(
    column: &ColumnMeta,
    op: Operator,
    value: &Value,
    clock: &DateClock,
) -> FilterResult<DateRange> {
    let filter = parse_date_filter(column, op, value)?;
    date_range::resolve(clock.time_zone, &filter, clock.now).map_err(|source| {
        FilterError::DateRange {
            column: column.id.clone(),
            source,
        }
    })
}

// =============================================================================
// Value helpers
// =============================================================================

fn malformed(column: &ColumnMeta, op: Operator, reason: impl Into<String>) -> FilterError {
    FilterError::MalformedValue {
        column: column.id.clone(),
        operator: op,
        reason: reason.into(),
    }
}

/// Loose truthiness: null, false, 0, "" and empty collections are false
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "false" && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// A number, or a string holding one
pub fn expect_number(column: &ColumnMeta, op: Operator, value: &Value) -> FilterResult<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number
        .filter(|f| f.is_finite())
        .ok_or_else(|| malformed(column, op, format!("expected a number, got {}", value)))
}

/// A string operand; numbers are stringified and `{ "id": ... }` objects
/// contribute their id
pub fn text_operand(column: &ColumnMeta, op: Operator, value: &Value) -> FilterResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Object(map) => match map.get("id") {
            Some(Value::String(id)) => Ok(id.clone()),
            Some(Value::Number(id)) => Ok(id.to_string()),
            _ => Err(malformed(column, op, "expected an object with an id")),
        },
        other => Err(malformed(column, op, format!("expected text, got {}", other))),
    }
}

/// A non-empty list of text operands; scalars are rejected
pub fn expect_text_list(
    column: &ColumnMeta,
    op: Operator,
    value: &Value,
) -> FilterResult<Vec<String>> {
    let Value::Array(items) = value else {
        return Err(malformed(column, op, format!("expected a list, got {}", value)));
    };
    let values = items
        .iter()
        .map(|item| text_operand(column, op, item))
        .collect::<FilterResult<Vec<_>>>()?;
    if values.is_empty() {
        return Err(malformed(column, op, "expected a non-empty list"));
    }
    Ok(values)
}

/// Like [`expect_text_list`] with duplicates removed, first occurrence kept
pub fn distinct_text_list(
    column: &ColumnMeta,
    op: Operator,
    value: &Value,
) -> FilterResult<Vec<String>> {
    let mut values = expect_text_list(column, op, value)?;
    let mut seen = std::collections::HashSet::new();
    values.retain(|v| seen.insert(v.clone()));
    Ok(values)
}
