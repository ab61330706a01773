//! Tolerant parsing for dashboard-supplied date strings.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{AnalysisError, Result};

/// Datetime formats tried in order when parsing a timestamp
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f", // ISO without offset: 2016-01-01T12:30:00
    "%Y-%m-%d %H:%M:%S%.f", // Space-separated: 2016-01-01 12:30:00
    "%Y/%m/%d %H:%M:%S",    // Slash-separated: 2016/01/01 12:30:00
];

/// Date-only formats tried after the datetime formats, read as midnight
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", // ISO format: 2016-01-15
    "%Y/%m/%d", // Slash ISO: 2016/01/15
    "%d-%m-%Y", // European: 15-01-2016
    "%d/%m/%Y", // UK: 15/01/2016
    "%d.%m.%Y", // German/Danish: 15.01.2016
    "%Y%m%d",   // Compact: 20160115
];

/// Parse a date or datetime string with multiple format attempts.
///
/// Offset-carrying timestamps (RFC 3339) are accepted at their wall-clock
/// reading; the offset itself is discarded. Date-only inputs are read as
/// midnight.
///
/// # Arguments
/// * `s` - The date string to parse
///
/// # Returns
/// The parsed timestamp, or `InvalidDateError` when no format matches
pub fn parse_date(s: &str) -> Result<NaiveDateTime> {
    let trimmed = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.naive_local());
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(dt);
        }
    }

    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    Err(AnalysisError::InvalidDateError(s.to_string()))
}

/// Floor a timestamp to midnight of its calendar day
#[must_use]
pub fn midnight_of(ts: NaiveDateTime) -> NaiveDateTime {
    ts.date().and_time(NaiveTime::MIN)
}
