//! Relative time expressions and the absolute consumer window they resolve to.
//!
//! An expression is `<n><unit>` where unit is one of `d`, `h`, `m`, `s`
//! (case-insensitive) and means "n units before the baseline".

use chrono::{DateTime, TimeDelta, Utc};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static TIME_EXPR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)([dhmsDHMS])$").expect("valid time expression regex"));

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowError {
    #[error(
        "Invalid time format: '{0}'. Expected <number><unit> where unit is d (days), h (hours), m (minutes) or s (seconds)"
    )]
    InvalidTimeFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl TimeUnit {
    fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'd' => Some(TimeUnit::Days),
            'h' => Some(TimeUnit::Hours),
            'm' => Some(TimeUnit::Minutes),
            's' => Some(TimeUnit::Seconds),
            _ => None,
        }
    }

    fn letter(&self) -> char {
        match self {
            TimeUnit::Days => 'd',
            TimeUnit::Hours => 'h',
            TimeUnit::Minutes => 'm',
            TimeUnit::Seconds => 's',
        }
    }
}

/// A parsed relative time expression such as `1d` or `90M`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOffset {
    pub amount: u64,
    pub unit: TimeUnit,
}

impl TimeOffset {
    /// Convert to a duration, or `None` if the amount does not fit.
    pub fn to_duration(&self) -> Option<TimeDelta> {
        let amount = i64::try_from(self.amount).ok()?;
        match self.unit {
            TimeUnit::Days => TimeDelta::try_days(amount),
            TimeUnit::Hours => TimeDelta::try_hours(amount),
            TimeUnit::Minutes => TimeDelta::try_minutes(amount),
            TimeUnit::Seconds => TimeDelta::try_seconds(amount),
        }
    }
}

impl FromStr for TimeOffset {
    type Err = WindowError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || WindowError::InvalidTimeFormat(s.to_string());

        let caps = TIME_EXPR_RE.captures(s).ok_or_else(invalid)?;
        let amount = caps[1].parse::<u64>().map_err(|_| invalid())?;
        let unit = caps[2]
            .chars()
            .next()
            .and_then(TimeUnit::from_letter)
            .ok_or_else(invalid)?;

        Ok(TimeOffset { amount, unit })
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.letter())
    }
}

/// Resolve `expression` to epoch milliseconds, counting back from `baseline`.
pub fn resolve(expression: &str, baseline: DateTime<Utc>) -> Result<i64, WindowError> {
    let offset: TimeOffset = expression.parse()?;
    let invalid = || WindowError::InvalidTimeFormat(expression.to_string());

    let duration = offset.to_duration().ok_or_else(invalid)?;
    let instant = baseline.checked_sub_signed(duration).ok_or_else(invalid)?;
    Ok(instant.timestamp_millis())
}

/// Begin and end boundaries handed to the consumer, in epoch milliseconds.
///
/// No ordering is enforced; a window ending before it begins simply matches
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub begin_ms: i64,
    pub end_ms: i64,
}

impl TimeWindow {
    pub fn new(begin_ms: i64, end_ms: i64) -> Self {
        Self { begin_ms, end_ms }
    }

    /// Resolve both boundaries against the same baseline instant.
    pub fn resolve(begin: &str, end: &str, baseline: DateTime<Utc>) -> Result<Self, WindowError> {
        Ok(Self {
            begin_ms: resolve(begin, baseline)?,
            end_ms: resolve(end, baseline)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.end_ms < self.begin_ms
    }
}
