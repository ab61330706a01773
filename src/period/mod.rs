//! Epi-week period grid
//!
//! Surveillance indicators are reported per epi-week: a 7-day period
//! anchored to a configurable start weekday. This module resolves the
//! dashboard-supplied date range into a canonical grid of period start
//! timestamps and assigns any record timestamp to its period.
//!
//! The grid covers `[start, end)`: period starts are midnights of the
//! anchor weekday, the first on or after the start date's calendar day,
//! stepping 7 days and stopping strictly before `end`. A period start
//! equal to `end` is excluded. Row filtering for totals is inclusive of
//! `end`, so a record dated exactly at `end` counts toward totals but
//! has no period slot.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};

use crate::error::{AnalysisError, Result};
use crate::models::Timeline;
use crate::utils::dates::{midnight_of, parse_date};

/// Date-range options shared by every indicator computation
#[derive(Debug, Clone, Default)]
pub struct PeriodOptions {
    /// Range start date, defaults to January 1 of the end date's year
    pub start_date: Option<String>,
    /// Range end date, defaults to now
    pub end_date: Option<String>,
    /// Epi-week start day, defaults to the resolved start date's weekday
    pub week_start_day: Option<Weekday>,
}

impl PeriodOptions {
    /// Options for an explicit date range
    #[must_use]
    pub fn range(start_date: &str, end_date: &str) -> Self {
        Self {
            start_date: Some(start_date.to_string()),
            end_date: Some(end_date.to_string()),
            week_start_day: None,
        }
    }

    /// Set the epi-week start day
    #[must_use]
    pub fn with_week_start(mut self, week_start_day: Weekday) -> Self {
        self.week_start_day = Some(week_start_day);
        self
    }
}

/// Map the dashboard weekday encoding (0 = Monday .. 6 = Sunday) to the
/// period-anchoring weekday. Values above 6 map to `None`.
#[must_use]
pub const fn epi_week_day(day: u8) -> Option<Weekday> {
    match day {
        0 => Some(Weekday::Mon),
        1 => Some(Weekday::Tue),
        2 => Some(Weekday::Wed),
        3 => Some(Weekday::Thu),
        4 => Some(Weekday::Fri),
        5 => Some(Weekday::Sat),
        6 => Some(Weekday::Sun),
        _ => None,
    }
}

/// Canonical period grid for a resolved date range
#[derive(Debug, Clone, PartialEq)]
pub struct PeriodGrid {
    start: NaiveDateTime,
    end: NaiveDateTime,
    week_start: Weekday,
    periods: Vec<NaiveDateTime>,
}

impl PeriodGrid {
    /// Resolved range start
    #[must_use]
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// Resolved range end
    #[must_use]
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// The weekday period starts are anchored to
    #[must_use]
    pub fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Period start timestamps, ascending
    #[must_use]
    pub fn periods(&self) -> &[NaiveDateTime] {
        &self.periods
    }

    /// Iterate over period start timestamps
    pub fn iter(&self) -> impl Iterator<Item = NaiveDateTime> + '_ {
        self.periods.iter().copied()
    }

    /// Number of whole periods in the range
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    /// Whether the range holds no whole period
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// Row filter for totals: `start <= ts <= end`, inclusive both ends
    #[must_use]
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }

    /// The period start a timestamp belongs to: the latest anchor-weekday
    /// midnight at or before it. The result may lie outside the grid for
    /// timestamps in the partial head week or at the range end; timelines
    /// drop those on re-indexing.
    #[must_use]
    pub fn period_start_of(&self, ts: NaiveDateTime) -> NaiveDateTime {
        let day = ts.date();
        let days_back = (day.weekday().num_days_from_monday() + 7
            - self.week_start.num_days_from_monday())
            % 7;
        (day - Duration::days(i64::from(days_back))).and_time(NaiveTime::MIN)
    }

    /// A zero-filled timeline with one slot per grid period
    #[must_use]
    pub fn empty_timeline(&self) -> Timeline {
        Timeline::zero_filled(self.iter())
    }

    /// Grid periods starting on or after the given timestamp's calendar
    /// day. Used for per-clinic slots that begin at the clinic's
    /// reporting start date.
    #[must_use]
    pub fn periods_from(&self, from: NaiveDateTime) -> Vec<NaiveDateTime> {
        let threshold = midnight_of(from);
        self.periods
            .iter()
            .copied()
            .filter(|&p| p >= threshold)
            .collect()
    }
}

/// Resolve dashboard date-range options into a period grid.
///
/// Defaults: the end date is now; the start date is January 1 of the end
/// date's year at midnight; the week start day is the resolved start
/// date's weekday. Supplied date strings that cannot be parsed fail with
/// `InvalidDateError`.
pub fn resolve_period(options: &PeriodOptions) -> Result<PeriodGrid> {
    let end = match &options.end_date {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().naive_local(),
    };
    let start = match &options.start_date {
        Some(s) => parse_date(s)?,
        None => NaiveDate::from_ymd_opt(end.year(), 1, 1)
            .ok_or_else(|| AnalysisError::InvalidDateError(format!("{}-01-01", end.year())))?
            .and_time(NaiveTime::MIN),
    };
    let week_start = options.week_start_day.unwrap_or_else(|| start.weekday());

    let start_day = start.date();
    let days_ahead = (week_start.num_days_from_monday() + 7
        - start_day.weekday().num_days_from_monday())
        % 7;
    let first = (start_day + Duration::days(i64::from(days_ahead))).and_time(NaiveTime::MIN);

    let mut periods = Vec::new();
    let mut period = first;
    while period < end {
        periods.push(period);
        period += Duration::days(7);
    }

    log::debug!(
        "Resolved period grid: {} periods from {start} to {end} anchored on {week_start}",
        periods.len()
    );

    Ok(PeriodGrid {
        start,
        end,
        week_start,
        periods,
    })
}
