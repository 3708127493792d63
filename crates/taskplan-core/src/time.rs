//! Clock-time arithmetic, date ranges and time-period resolution.
//!
//! All intra-day comparisons are done in whole minutes since midnight via
//! [`ClockTime`]. Calendar days are plain [`NaiveDate`]s; the engine has no
//! notion of time zones.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{ConfigError, CoreError, ValidationError};

/// Minutes in a full day. `24:00` is accepted as a closing time.
pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// A wall-clock time of day with minute precision.
///
/// Serialized as `"HH:MM"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ClockTime(u32);

impl ClockTime {
    /// Build from an hour and minute. Returns `None` when out of range.
    pub fn new(hour: u32, minute: u32) -> Option<Self> {
        if minute >= 60 {
            return None;
        }
        Self::from_minutes(hour * 60 + minute)
    }

    /// Build from minutes since midnight (`0..=1440`).
    pub fn from_minutes(minutes: u32) -> Option<Self> {
        (minutes <= MINUTES_PER_DAY).then_some(Self(minutes))
    }

    /// Minutes since midnight.
    pub fn minutes(self) -> u32 {
        self.0
    }

    pub fn hour(self) -> u32 {
        self.0 / 60
    }

    pub fn minute(self) -> u32 {
        self.0 % 60
    }

    /// Add minutes, failing past the end of the day.
    pub fn checked_add(self, minutes: u32) -> Option<Self> {
        Self::from_minutes(self.0.checked_add(minutes)?)
    }

    /// Start of the hour bucket this time falls in.
    pub fn hour_bucket(self) -> Self {
        Self(self.hour() * 60)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for ClockTime {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || ConfigError::ParseFailed(format!("invalid clock time '{s}', expected HH:MM"));

        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(bad());
        }
        let hour: u32 = h.parse().map_err(|_| bad())?;
        let minute: u32 = m.parse().map_err(|_| bad())?;
        ClockTime::new(hour, minute).ok_or_else(bad)
    }
}

impl Serialize for ClockTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ClockTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Convert an `"HH:MM"` clock value to minutes since midnight.
pub fn clock_minutes(time: &str) -> Result<u32, ConfigError> {
    time.parse::<ClockTime>().map(ClockTime::minutes)
}

/// Half-open clock interval `[start, end)` within one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl TimeInterval {
    pub fn new(start: ClockTime, end: ClockTime) -> Self {
        Self { start, end }
    }

    /// Interval starting at `start` lasting `minutes`, clamped to the end of the day.
    pub fn starting_at(start: ClockTime, minutes: u32) -> Self {
        let end = start.minutes().saturating_add(minutes).min(MINUTES_PER_DAY);
        Self {
            start,
            end: ClockTime(end),
        }
    }

    pub fn duration_minutes(&self) -> u32 {
        self.end.minutes().saturating_sub(self.start.minutes())
    }

    /// Check if this interval overlaps `[start, end)` given in minutes.
    pub fn overlaps_minutes(&self, start: u32, end: u32) -> bool {
        self.start.minutes() < end && self.end.minutes() > start
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        self.overlaps_minutes(other.start.minutes(), other.end.minutes())
    }
}

/// Inclusive range of whole calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, ValidationError> {
        if end < start {
            return Err(ValidationError::InvalidTimeRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Every day of the range in calendar order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }

    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

/// Which window of days a scheduling run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TimePeriod {
    #[default]
    Today,
    Tomorrow,
    ThisWeek,
    Custom {
        #[serde(default)]
        start: Option<NaiveDate>,
        #[serde(default)]
        end: Option<NaiveDate>,
    },
}

impl FromStr for TimePeriod {
    type Err = ConfigError;

    /// Parse the bare tags `today`, `tomorrow`, `this_week` and `custom`
    /// (the latter without bounds).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "today" => Ok(TimePeriod::Today),
            "tomorrow" => Ok(TimePeriod::Tomorrow),
            "this_week" | "week" => Ok(TimePeriod::ThisWeek),
            "custom" => Ok(TimePeriod::Custom {
                start: None,
                end: None,
            }),
            other => Err(ConfigError::invalid(
                "timePeriod",
                format!("unknown time period '{other}'"),
            )),
        }
    }
}

/// Resolve a [`TimePeriod`] into a concrete range of days.
///
/// `allowed` is the set of weekdays that have an availability entry. It only
/// matters for `this_week`.
pub fn resolve_time_period(
    period: TimePeriod,
    allowed: &HashSet<Weekday>,
    today: NaiveDate,
) -> Result<DateRange, CoreError> {
    match period {
        TimePeriod::Today => Ok(DateRange::single(today)),
        TimePeriod::Tomorrow => Ok(DateRange::single(today + Duration::days(1))),
        TimePeriod::ThisWeek => resolve_this_week(allowed, today),
        TimePeriod::Custom { start, end } => {
            let start = start.ok_or_else(|| ConfigError::MissingKey("timePeriod.start".into()))?;
            let end = end.ok_or_else(|| ConfigError::MissingKey("timePeriod.end".into()))?;
            Ok(DateRange::new(start, end)?)
        }
    }
}

fn resolve_this_week(allowed: &HashSet<Weekday>, today: NaiveDate) -> Result<DateRange, CoreError> {
    let is_allowed = |d: &NaiveDate| allowed.contains(&d.weekday());

    // Every weekday occurs once in any seven consecutive days.
    let Some(start) = today.iter_days().take(7).find(is_allowed) else {
        return Err(ConfigError::invalid(
            "dailySchedule",
            "this_week needs at least one weekday in the availability table",
        )
        .into());
    };

    // No allowed day left before Sunday: the range is the following week's.
    let sunday = today + Duration::days(6 - i64::from(today.weekday().num_days_from_monday()));
    let last_day = if start <= sunday { sunday } else { sunday + Duration::days(7) };

    let end = start
        .iter_days()
        .take_while(|d| *d <= last_day)
        .filter(is_allowed)
        .last()
        .unwrap_or(start);
    Ok(DateRange { start, end })
}
