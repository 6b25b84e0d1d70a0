//! Date windows and time bucketing.
//!
//! All truncation is UTC-based. Windows are inclusive at both ends on day
//! boundaries: `from` snaps to 00:00:00 and `to` to 23:59:59.999 of the
//! named days. Week buckets use ISO week-of-year keyed by the ISO week-year
//! (`%G-W%V`), so late-December days can land in week 1 of the next year.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateWindow {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl DateWindow {
    /// Builds a window from optional ISO date strings. A missing `to`
    /// defaults to today and a missing `from` to `default_days` before `to`.
    pub fn parse(
        from: Option<&str>,
        to: Option<&str>,
        now: DateTime<Utc>,
        default_days: u32,
    ) -> Result<Self, DomainError> {
        let to_date = match to {
            Some(raw) => parse_date("to", raw)?,
            None => now.date_naive(),
        };
        let from_date = match from {
            Some(raw) => parse_date("from", raw)?,
            None => to_date - Duration::days(i64::from(default_days)),
        };

        Self::from_dates(from_date, to_date)
    }

    pub fn from_dates(from: NaiveDate, to: NaiveDate) -> Result<Self, DomainError> {
        if from > to {
            return Err(DomainError::WindowReversed { from, to });
        }

        Ok(Self { from: start_of_day(from), to: end_of_day(to) })
    }

    /// Trailing window of `days` full days ending at `now`, both bounds
    /// inclusive. Used for sales-velocity scans.
    pub fn trailing(now: DateTime<Utc>, days: u32) -> Self {
        Self { from: now - Duration::days(i64::from(days)), to: now }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at <= self.to
    }

    pub fn from_date(&self) -> NaiveDate {
        self.from.date_naive()
    }

    pub fn to_date(&self) -> NaiveDate {
        self.to.date_naive()
    }
}

fn parse_date(param: &'static str, raw: &str) -> Result<NaiveDate, DomainError> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(at.with_timezone(&Utc).date_naive());
    }

    Err(DomainError::InvalidDate { param, value: raw.to_string() })
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    let end = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(end).and_utc()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Day,
    Week,
    Month,
}

impl Interval {
    pub fn bucket_key(self, at: DateTime<Utc>) -> String {
        match self {
            Self::Day => at.format("%Y-%m-%d").to_string(),
            Self::Week => {
                let week = at.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Self::Month => at.format("%Y-%m").to_string(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl std::str::FromStr for Interval {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            other => Err(DomainError::InvalidParameter {
                param: "interval",
                value: other.to_string(),
                expected: "day|week|month",
            }),
        }
    }
}

/// Monotonic month counter used for cohort offset arithmetic.
pub fn month_index(at: DateTime<Utc>) -> i32 {
    at.year() * 12 + at.month0() as i32
}

/// Renders a month counter back to its `YYYY-MM` key.
pub fn month_key(index: i32) -> String {
    format!("{:04}-{:02}", index.div_euclid(12), index.rem_euclid(12) + 1)
}
