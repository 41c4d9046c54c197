//! Time utility functions

use chrono::{DateTime, FixedOffset, NaiveDate, SecondsFormat, Utc};

/// Format an instant the way SQLite and JSON cells store datetimes:
/// RFC 3339, UTC, millisecond precision, `Z` suffix.
///
/// Fixed-width output keeps lexicographic order equal to chronological order,
/// which the SQLite compilers rely on.
pub fn format_utc_millis(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 instant, keeping its offset
pub fn parse_rfc3339(ts: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(ts.trim()).ok()
}

/// Parse a calendar date in `YYYY-MM-DD` form
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}
