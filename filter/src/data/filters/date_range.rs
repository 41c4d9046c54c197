//! Date range resolution
//!
//! Turns a relative or absolute date filter into an inclusive instant range in
//! a column's time zone. Pure: the reference instant is always passed in.

use std::fmt;

use chrono::{DateTime, Days, FixedOffset, Months, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::utils::time::{parse_iso_date, parse_rfc3339};

/// Local midnight inside a DST gap is probed forward in these steps
const DST_GAP_PROBE_MINUTES: i64 = 15;
const DST_GAP_PROBE_STEPS: i64 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateMode {
    Today,
    Tomorrow,
    Yesterday,
    OneWeekAgo,
    OneWeekFromNow,
    OneMonthAgo,
    OneMonthFromNow,
    DaysAgo,
    DaysFromNow,
    ExactDate,
    PastWeek,
    PastMonth,
    PastYear,
    NextWeek,
    NextMonth,
    NextYear,
    PastNumberOfDays,
    NextNumberOfDays,
}

impl DateMode {
    /// Rolling windows, the only modes `within` accepts
    pub fn is_rolling(self) -> bool {
        matches!(
            self,
            DateMode::PastWeek
                | DateMode::PastMonth
                | DateMode::PastYear
                | DateMode::NextWeek
                | DateMode::NextMonth
                | DateMode::NextYear
                | DateMode::PastNumberOfDays
                | DateMode::NextNumberOfDays
        )
    }

    /// Modes naming a single calendar day
    pub fn is_day(self) -> bool {
        !self.is_rolling()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DateMode::Today => "today",
            DateMode::Tomorrow => "tomorrow",
            DateMode::Yesterday => "yesterday",
            DateMode::OneWeekAgo => "oneWeekAgo",
            DateMode::OneWeekFromNow => "oneWeekFromNow",
            DateMode::OneMonthAgo => "oneMonthAgo",
            DateMode::OneMonthFromNow => "oneMonthFromNow",
            DateMode::DaysAgo => "daysAgo",
            DateMode::DaysFromNow => "daysFromNow",
            DateMode::ExactDate => "exactDate",
            DateMode::PastWeek => "pastWeek",
            DateMode::PastMonth => "pastMonth",
            DateMode::PastYear => "pastYear",
            DateMode::NextWeek => "nextWeek",
            DateMode::NextMonth => "nextMonth",
            DateMode::NextYear => "nextYear",
            DateMode::PastNumberOfDays => "pastNumberOfDays",
            DateMode::NextNumberOfDays => "nextNumberOfDays",
        }
    }
}

impl fmt::Display for DateMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a date operator: `{ "mode": "pastNumberOfDays", "numberOfDays": 7 }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateFilter {
    pub mode: DateMode,
    #[serde(default)]
    pub number_of_days: Option<i64>,
    #[serde(default)]
    pub exact_date: Option<String>,
}

impl DateFilter {
    pub fn new(mode: DateMode) -> Self {
        Self {
            mode,
            number_of_days: None,
            exact_date: None,
        }
    }

    pub fn days(mode: DateMode, number_of_days: i64) -> Self {
        Self {
            number_of_days: Some(number_of_days),
            ..Self::new(mode)
        }
    }

    pub fn exact(date: impl Into<String>) -> Self {
        Self {
            exact_date: Some(date.into()),
            ..Self::new(DateMode::ExactDate)
        }
    }

    /// Read a filter value; a bare string is shorthand for an exact date
    pub fn from_value(value: &Value) -> Result<Self, String> {
        match value {
            Value::String(date) => Ok(Self::exact(date.clone())),
            Value::Object(_) => serde_json::from_value(value.clone()).map_err(|e| e.to_string()),
            other => Err(format!("expected a date filter object, got {}", other)),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateRangeError {
    #[error("{mode} requires numberOfDays")]
    MissingNumberOfDays { mode: DateMode },

    #[error("{mode} does not accept numberOfDays = {value}")]
    InvalidNumberOfDays { mode: DateMode, value: i64 },

    #[error("exactDate requires a date")]
    MissingExactDate,

    #[error("invalid exact date: {0}")]
    InvalidExactDate(String),

    #[error("date is out of range")]
    OutOfRange,
}

/// Inclusive instant range carrying the zone offset at resolution time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

impl DateRange {
    pub fn start_utc(&self) -> DateTime<Utc> {
        self.start.with_timezone(&Utc)
    }

    pub fn end_utc(&self) -> DateTime<Utc> {
        self.end.with_timezone(&Utc)
    }
}

/// Resolve a date filter against `now` in time zone `tz`
pub fn resolve(
    tz: Tz,
    filter: &DateFilter,
    now: DateTime<Utc>,
) -> Result<DateRange, DateRangeError> {
    let today = now.with_timezone(&tz).date_naive();

    let (first, last) = match filter.mode {
        DateMode::Today => (today, today),
        DateMode::Tomorrow => same_day(shift_days(today, 1)?),
        DateMode::Yesterday => same_day(shift_days(today, -1)?),
        DateMode::OneWeekAgo => same_day(shift_days(today, -7)?),
        DateMode::OneWeekFromNow => same_day(shift_days(today, 7)?),
        DateMode::OneMonthAgo => same_day(shift_months(today, -1)?),
        DateMode::OneMonthFromNow => same_day(shift_months(today, 1)?),
        DateMode::DaysAgo => same_day(shift_days(today, -positive_days(filter)?)?),
        DateMode::DaysFromNow => same_day(shift_days(today, positive_days(filter)?)?),
        DateMode::ExactDate => same_day(exact_date(tz, filter)?),
        DateMode::PastWeek => (shift_days(today, -7)?, today),
        DateMode::PastMonth => (shift_months(today, -1)?, today),
        DateMode::PastYear => (shift_months(today, -12)?, today),
        DateMode::NextWeek => (today, shift_days(today, 7)?),
        DateMode::NextMonth => (today, shift_months(today, 1)?),
        DateMode::NextYear => (today, shift_months(today, 12)?),
        DateMode::PastNumberOfDays => (shift_days(today, -window_days(filter)?)?, today),
        DateMode::NextNumberOfDays => (today, shift_days(today, window_days(filter)?)?),
    };

    Ok(DateRange {
        start: start_of_day(tz, first)?,
        end: end_of_day(tz, last)?,
    })
}

fn same_day(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    (date, date)
}

fn required_days(filter: &DateFilter) -> Result<i64, DateRangeError> {
    filter
        .number_of_days
        .ok_or(DateRangeError::MissingNumberOfDays { mode: filter.mode })
}

fn positive_days(filter: &DateFilter) -> Result<i64, DateRangeError> {
    let days = required_days(filter)?;
    if days <= 0 {
        return Err(DateRangeError::InvalidNumberOfDays {
            mode: filter.mode,
            value: days,
        });
    }
    Ok(days)
}

fn window_days(filter: &DateFilter) -> Result<i64, DateRangeError> {
    let days = required_days(filter)?;
    if days < 0 {
        return Err(DateRangeError::InvalidNumberOfDays {
            mode: filter.mode,
            value: days,
        });
    }
    Ok(days)
}

fn exact_date(tz: Tz, filter: &DateFilter) -> Result<NaiveDate, DateRangeError> {
    let raw = filter
        .exact_date
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or(DateRangeError::MissingExactDate)?;

    if let Some(date) = parse_iso_date(raw) {
        return Ok(date);
    }
    parse_rfc3339(raw)
        .map(|instant| instant.with_timezone(&tz).date_naive())
        .ok_or_else(|| DateRangeError::InvalidExactDate(raw.to_string()))
}

fn shift_days(date: NaiveDate, days: i64) -> Result<NaiveDate, DateRangeError> {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.ok_or(DateRangeError::OutOfRange)
}

/// Calendar month shift, clamped to the last day of the target month
fn shift_months(date: NaiveDate, months: i32) -> Result<NaiveDate, DateRangeError> {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.ok_or(DateRangeError::OutOfRange)
}

fn start_of_day(tz: Tz, date: NaiveDate) -> Result<DateTime<FixedOffset>, DateRangeError> {
    let midnight = date.and_time(NaiveTime::MIN);
    (0..=DST_GAP_PROBE_STEPS)
        .find_map(|step| {
            let local = midnight + TimeDelta::minutes(step * DST_GAP_PROBE_MINUTES);
            tz.from_local_datetime(&local).earliest()
        })
        .map(|dt| dt.fixed_offset())
        .ok_or(DateRangeError::OutOfRange)
}

fn end_of_day(tz: Tz, date: NaiveDate) -> Result<DateTime<FixedOffset>, DateRangeError> {
    let last_milli = date
        .and_hms_milli_opt(23, 59, 59, 999)
        .ok_or(DateRangeError::OutOfRange)?;
    if let Some(dt) = tz.from_local_datetime(&last_milli).latest() {
        return Ok(dt.fixed_offset());
    }
    let next = shift_days(date, 1)?;
    Ok(start_of_day(tz, next)? - TimeDelta::milliseconds(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use serde_json::json;

    fn utc(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
    }

    fn fixed(ts: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(ts).unwrap()
    }

    #[test]
    fn test_past_number_of_days_is_deterministic() {
        let now = utc("2024-03-15T00:00:00Z");
        let range = resolve(
            Tz::UTC,
            &DateFilter::days(DateMode::PastNumberOfDays, 7),
            now,
        )
        .unwrap();
        assert_eq!(range.start, fixed("2024-03-08T00:00:00Z"));
        assert_eq!(range.end, fixed("2024-03-15T23:59:59.999Z"));
        assert_eq!(range.end_utc().nanosecond(), 999_000_000);
    }

    #[test]
    fn test_day_anchors() {
        let now = utc("2024-03-15T12:00:00Z");
        let cases = [
            (DateMode::Today, "2024-03-15"),
            (DateMode::Tomorrow, "2024-03-16"),
            (DateMode::Yesterday, "2024-03-14"),
            (DateMode::OneWeekAgo, "2024-03-08"),
            (DateMode::OneWeekFromNow, "2024-03-22"),
            (DateMode::OneMonthAgo, "2024-02-15"),
            (DateMode::OneMonthFromNow, "2024-04-15"),
        ];
        for (mode, day) in cases {
            let range = resolve(Tz::UTC, &DateFilter::new(mode), now).unwrap();
            assert_eq!(
                range.start,
                fixed(&format!("{}T00:00:00Z", day)),
                "{}",
                mode
            );
            assert_eq!(
                range.end,
                fixed(&format!("{}T23:59:59.999Z", day)),
                "{}",
                mode
            );
        }
    }

    #[test]
    fn test_month_shift_clamps_to_month_end() {
        let now = utc("2024-03-31T12:00:00Z");
        let range = resolve(Tz::UTC, &DateFilter::new(DateMode::OneMonthAgo), now).unwrap();
        assert_eq!(range.start, fixed("2024-02-29T00:00:00Z"));
    }

    #[test]
    fn test_rolling_windows() {
        let now = utc("2024-03-15T12:00:00Z");

        let range = resolve(Tz::UTC, &DateFilter::new(DateMode::PastWeek), now).unwrap();
        assert_eq!(range.start, fixed("2024-03-08T00:00:00Z"));
        assert_eq!(range.end, fixed("2024-03-15T23:59:59.999Z"));

        let range = resolve(Tz::UTC, &DateFilter::new(DateMode::NextYear), now).unwrap();
        assert_eq!(range.start, fixed("2024-03-15T00:00:00Z"));
        assert_eq!(range.end, fixed("2025-03-15T23:59:59.999Z"));

        let range = resolve(
            Tz::UTC,
            &DateFilter::days(DateMode::NextNumberOfDays, 0),
            now,
        )
        .unwrap();
        assert_eq!(range.start, fixed("2024-03-15T00:00:00Z"));
        assert_eq!(range.end, fixed("2024-03-15T23:59:59.999Z"));
    }

    #[test]
    fn test_days_ago_requires_positive_count() {
        let now = utc("2024-03-15T12:00:00Z");
        let range = resolve(Tz::UTC, &DateFilter::days(DateMode::DaysAgo, 3), now).unwrap();
        assert_eq!(range.start, fixed("2024-03-12T00:00:00Z"));

        assert_eq!(
            resolve(Tz::UTC, &DateFilter::new(DateMode::DaysFromNow), now),
            Err(DateRangeError::MissingNumberOfDays {
                mode: DateMode::DaysFromNow
            })
        );
        assert_eq!(
            resolve(Tz::UTC, &DateFilter::days(DateMode::DaysAgo, 0), now),
            Err(DateRangeError::InvalidNumberOfDays {
                mode: DateMode::DaysAgo,
                value: 0
            })
        );
        let negative = DateFilter::days(DateMode::PastNumberOfDays, -1);
        assert!(resolve(Tz::UTC, &negative, now).is_err());
    }

    #[test]
    fn test_exact_date_forms() {
        let now = utc("2024-03-15T12:00:00Z");
        let range = resolve(Tz::UTC, &DateFilter::exact("2024-01-02"), now).unwrap();
        assert_eq!(range.start, fixed("2024-01-02T00:00:00Z"));

        // 23:30 in New York is already the next day in UTC
        let range = resolve(
            Tz::UTC,
            &DateFilter::exact("2024-01-02T23:30:00-05:00"),
            now,
        )
        .unwrap();
        assert_eq!(range.start, fixed("2024-01-03T00:00:00Z"));

        assert_eq!(
            resolve(Tz::UTC, &DateFilter::new(DateMode::ExactDate), now),
            Err(DateRangeError::MissingExactDate)
        );
        assert_eq!(
            resolve(Tz::UTC, &DateFilter::exact("02/01/2024"), now),
            Err(DateRangeError::InvalidExactDate("02/01/2024".to_string()))
        );
    }

    #[test]
    fn test_today_uses_column_zone() {
        // 02:00 UTC is still the previous evening in New York
        let now = utc("2024-03-15T02:00:00Z");
        let range = resolve(
            chrono_tz::America::New_York,
            &DateFilter::new(DateMode::Today),
            now,
        )
        .unwrap();
        assert_eq!(range.start, fixed("2024-03-14T00:00:00-04:00"));
        assert_eq!(range.end, fixed("2024-03-14T23:59:59.999-04:00"));
        assert_eq!(range.start.offset().local_minus_utc(), -4 * 3600);
    }

    #[test]
    fn test_midnight_in_dst_gap() {
        // Sao Paulo skipped from 00:00 to 01:00 on 2018-11-04
        let now = utc("2018-11-04T15:00:00Z");
        let range = resolve(
            chrono_tz::America::Sao_Paulo,
            &DateFilter::new(DateMode::Today),
            now,
        )
        .unwrap();
        assert_eq!(range.start, fixed("2018-11-04T01:00:00-02:00"));
        assert_eq!(range.end, fixed("2018-11-04T23:59:59.999-02:00"));
    }

    #[test]
    fn test_from_value() {
        let filter =
            DateFilter::from_value(&json!({ "mode": "pastNumberOfDays", "numberOfDays": 7 }))
                .unwrap();
        assert_eq!(filter, DateFilter::days(DateMode::PastNumberOfDays, 7));

        let filter = DateFilter::from_value(&json!("2024-03-01")).unwrap();
        assert_eq!(filter, DateFilter::exact("2024-03-01"));

        assert!(DateFilter::from_value(&json!({ "mode": "fortnight" })).is_err());
        assert!(DateFilter::from_value(&json!(5)).is_err());
    }

    #[test]
    fn test_mode_classes() {
        assert!(DateMode::PastWeek.is_rolling());
        assert!(DateMode::NextNumberOfDays.is_rolling());
        assert!(DateMode::ExactDate.is_day());
        assert!(DateMode::DaysAgo.is_day());
        assert!(!DateMode::Today.is_rolling());
    }
}
