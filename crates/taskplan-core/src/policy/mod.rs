//! Scheduling policy.
//!
//! This module provides:
//! - [`SchedulingPolicy`], the immutable configuration of one scheduling run
//! - [`PolicyOverrides`], the partial form callers and config files supply
//! - Validation of every field range at construction time
//!
//! A run starts from [`SchedulingPolicy::default()`] and applies overrides
//! with [`SchedulingPolicy::merged`]; the result is never mutated afterward.

mod overrides;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

pub use overrides::{
    BreakOverrides, EnergyOverrides, LunchBreakOverrides, OptimizationOverrides, PolicyOverrides,
    PriorityLimitOverrides, ShortBreakOverrides,
};

use crate::energy::EnergyTable;
use crate::error::ConfigError;
use crate::mood::MoodAdjustments;
use crate::task::Priority;
use crate::time::{ClockTime, TimeInterval, TimePeriod};

/// Validation constraints for policy values.
pub mod constraints {
    /// Minimum task duration in minutes.
    pub const DURATION_MIN: u32 = 1;
    /// Maximum task duration in minutes.
    pub const DURATION_MAX: u32 = 720;
    /// Maximum tasks per day.
    pub const TASKS_PER_DAY_MAX: u32 = 100;
    /// Maximum planned hours per day.
    pub const HOURS_PER_DAY_MAX: f64 = 24.0;
    /// Minimum slot search granularity in minutes.
    pub const SLOT_INTERVAL_MIN: u32 = 1;
    /// Maximum slot search granularity in minutes.
    pub const SLOT_INTERVAL_MAX: u32 = 240;
    /// Maximum spacing between tasks in minutes.
    pub const BREAK_BETWEEN_MAX: u32 = 240;
    /// Maximum length of any configured break in minutes.
    pub const BREAK_DURATION_MAX: u32 = 240;
    /// Minimum period between short breaks in minutes.
    pub const SHORT_BREAK_FREQUENCY_MIN: u32 = 15;
}

/// Which tasks the orchestrator may move.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMode {
    /// Replan everything except fixed urgent tasks.
    #[default]
    Full,
    /// Only place tasks that have no placement yet.
    Unscheduled,
    /// Re-place tasks already scheduled in range.
    Reschedule,
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SelectionMode::Full => "full",
            SelectionMode::Unscheduled => "unscheduled",
            SelectionMode::Reschedule => "reschedule",
        })
    }
}

impl FromStr for SelectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" => Ok(SelectionMode::Full),
            "unscheduled" => Ok(SelectionMode::Unscheduled),
            "reschedule" => Ok(SelectionMode::Reschedule),
            other => Err(ConfigError::invalid(
                "taskSelectionMode",
                format!("unknown selection mode '{other}'"),
            )),
        }
    }
}

/// Per-priority daily quota.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriorityLimits {
    pub urgent: u32,
    pub high: u32,
    pub medium: u32,
    pub low: u32,
}

impl PriorityLimits {
    pub fn get(&self, priority: Priority) -> u32 {
        match priority {
            Priority::Urgent => self.urgent,
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}

impl Default for PriorityLimits {
    fn default() -> Self {
        Self {
            urgent: 3,
            high: 3,
            medium: 4,
            low: 4,
        }
    }
}

/// Opening hours and recurring blocked intervals for one weekday.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayAvailability {
    pub weekday: Weekday,
    pub open: ClockTime,
    pub close: ClockTime,
    #[serde(default)]
    pub blocked: Vec<TimeInterval>,
}

impl DayAvailability {
    pub fn new(weekday: Weekday, open: ClockTime, close: ClockTime) -> Self {
        Self {
            weekday,
            open,
            close,
            blocked: Vec::new(),
        }
    }

    pub fn with_blocked(mut self, start: ClockTime, end: ClockTime) -> Self {
        self.blocked.push(TimeInterval::new(start, end));
        self
    }

    pub fn window(&self) -> TimeInterval {
        TimeInterval::new(self.open, self.close)
    }
}

/// Lunch window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchBreak {
    pub enabled: bool,
    pub start: ClockTime,
    pub duration: u32,
}

/// Short breaks every `frequency` minutes after the day opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortBreaks {
    pub enabled: bool,
    pub frequency: u32,
    pub duration: u32,
}

/// Break rules applied on top of the availability table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakPolicy {
    pub enabled: bool,
    pub lunch_break: LunchBreak,
    pub short_breaks: ShortBreaks,
}

impl Default for BreakPolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            lunch_break: LunchBreak {
                enabled: true,
                start: hm(12, 0),
                duration: 60,
            },
            short_breaks: ShortBreaks {
                enabled: false,
                frequency: 90,
                duration: 10,
            },
        }
    }
}

/// Optimization toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationOptions {
    /// Honor the recurring blocked intervals of the availability table.
    pub respect_fixed_appointments: bool,
    pub add_breaks: BreakPolicy,
    /// Reward batching same-category work close together.
    pub optimize_focus_time: bool,
}

impl Default for OptimizationOptions {
    fn default() -> Self {
        Self {
            respect_fixed_appointments: true,
            add_breaks: BreakPolicy::default(),
            optimize_focus_time: true,
        }
    }
}

/// Immutable configuration for one scheduling run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingPolicy {
    /// Duration for tasks that declare none (minutes)
    pub default_duration: u32,
    pub max_tasks_per_day: u32,
    pub max_hours_per_day: f64,
    pub priority_limits: PriorityLimits,
    pub energy_levels: EnergyTable,
    /// Slot search granularity (minutes)
    pub time_slot_interval: u32,
    /// Minimum spacing kept before and after every task (minutes)
    pub break_between_tasks: u32,
    pub daily_schedule: Vec<DayAvailability>,
    pub optimization: OptimizationOptions,
    pub consider_mood: bool,
    pub mood_adjustments: MoodAdjustments,
    pub task_selection_mode: SelectionMode,
    pub time_period: TimePeriod,
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        let workday = |weekday| DayAvailability::new(weekday, hm(9, 0), hm(17, 0));
        Self {
            default_duration: 60,
            max_tasks_per_day: 6,
            max_hours_per_day: 8.0,
            priority_limits: PriorityLimits::default(),
            energy_levels: EnergyTable::default(),
            time_slot_interval: 30,
            break_between_tasks: 15,
            daily_schedule: [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri]
                .into_iter()
                .map(workday)
                .collect(),
            optimization: OptimizationOptions::default(),
            consider_mood: false,
            mood_adjustments: MoodAdjustments::default(),
            task_selection_mode: SelectionMode::Full,
            time_period: TimePeriod::Today,
        }
    }
}

impl SchedulingPolicy {
    /// Deep-merge `overrides` onto this policy and validate the result.
    pub fn merged(&self, overrides: &PolicyOverrides) -> Result<SchedulingPolicy, ConfigError> {
        let policy = overrides.apply(self.clone());
        policy.validate()?;
        Ok(policy)
    }

    /// Daily planned-minutes cap derived from `max_hours_per_day`.
    pub fn max_minutes_per_day(&self) -> u32 {
        (self.max_hours_per_day * 60.0).floor() as u32
    }

    /// Availability entry for the weekday of `day`.
    pub fn availability_for(&self, day: NaiveDate) -> Option<&DayAvailability> {
        let weekday = day.weekday();
        self.daily_schedule.iter().find(|d| d.weekday == weekday)
    }

    /// Weekdays that have an availability entry.
    pub fn allowed_weekdays(&self) -> HashSet<Weekday> {
        self.daily_schedule.iter().map(|d| d.weekday).collect()
    }

    /// Check every field against [`constraints`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        use constraints::*;

        check_range("defaultDuration", self.default_duration, DURATION_MIN, DURATION_MAX)?;
        check_range("maxTasksPerDay", self.max_tasks_per_day, 1, TASKS_PER_DAY_MAX)?;
        if !(self.max_hours_per_day.is_finite()
            && self.max_hours_per_day > 0.0
            && self.max_hours_per_day <= HOURS_PER_DAY_MAX)
        {
            return Err(ConfigError::invalid(
                "maxHoursPerDay",
                format!("{} outside (0, {HOURS_PER_DAY_MAX}]", self.max_hours_per_day),
            ));
        }
        for priority in Priority::ALL {
            check_range(
                &format!("priorityLimits.{priority}"),
                self.priority_limits.get(priority),
                0,
                TASKS_PER_DAY_MAX,
            )?;
        }
        check_range("timeSlotInterval", self.time_slot_interval, SLOT_INTERVAL_MIN, SLOT_INTERVAL_MAX)?;
        check_range("breakBetweenTasks", self.break_between_tasks, 0, BREAK_BETWEEN_MAX)?;

        self.validate_daily_schedule()?;
        self.energy_levels.validate()?;
        self.validate_breaks()?;
        self.mood_adjustments.validate()?;
        Ok(())
    }

    fn validate_daily_schedule(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for day in &self.daily_schedule {
            let key = format!("dailySchedule.{}", day.weekday);
            if !seen.insert(day.weekday) {
                return Err(ConfigError::invalid(key, "weekday listed more than once"));
            }
            if day.open >= day.close {
                return Err(ConfigError::invalid(
                    key,
                    format!("open {} must be before close {}", day.open, day.close),
                ));
            }
            for blocked in &day.blocked {
                if blocked.start >= blocked.end {
                    return Err(ConfigError::invalid(
                        format!("{key}.blocked"),
                        format!("interval {}-{} is empty", blocked.start, blocked.end),
                    ));
                }
            }
        }
        Ok(())
    }

    fn validate_breaks(&self) -> Result<(), ConfigError> {
        use constraints::*;

        let breaks = &self.optimization.add_breaks;
        if breaks.lunch_break.enabled {
            check_range(
                "optimization.addBreaks.lunchBreak.duration",
                breaks.lunch_break.duration,
                1,
                BREAK_DURATION_MAX,
            )?;
        }
        if breaks.short_breaks.enabled {
            let short = breaks.short_breaks;
            check_range(
                "optimization.addBreaks.shortBreaks.frequency",
                short.frequency,
                SHORT_BREAK_FREQUENCY_MIN,
                24 * 60,
            )?;
            if short.duration == 0 || short.duration >= short.frequency {
                return Err(ConfigError::invalid(
                    "optimization.addBreaks.shortBreaks.duration",
                    format!("{} must be positive and shorter than the frequency", short.duration),
                ));
            }
        }
        Ok(())
    }
}

fn check_range(key: &str, value: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if value < min || value > max {
        return Err(ConfigError::invalid(key, format!("{value} outside {min}..={max}")));
    }
    Ok(())
}

fn hm(hour: u32, minute: u32) -> ClockTime {
    ClockTime::new(hour, minute).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let policy = SchedulingPolicy::default();
        policy.validate().unwrap();
        assert_eq!(policy.max_minutes_per_day(), 480);
        assert_eq!(policy.allowed_weekdays().len(), 5);
    }

    #[test]
    fn availability_lookup_by_weekday() {
        let policy = SchedulingPolicy::default();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let saturday = NaiveDate::from_ymd_opt(2026, 10, 24).unwrap();
        assert_eq!(policy.availability_for(monday).unwrap().open, hm(9, 0));
        assert!(policy.availability_for(saturday).is_none());
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut policy = SchedulingPolicy::default();
        policy.time_slot_interval = 0;
        assert!(policy.validate().is_err());

        let mut policy = SchedulingPolicy::default();
        policy.max_hours_per_day = 25.0;
        assert!(policy.validate().is_err());

        let mut policy = SchedulingPolicy::default();
        policy.daily_schedule.push(DayAvailability::new(Weekday::Mon, hm(8, 0), hm(9, 0)));
        let err = policy.validate().unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn rejects_inverted_day_window() {
        let mut policy = SchedulingPolicy::default();
        policy.daily_schedule = vec![DayAvailability::new(Weekday::Sat, hm(18, 0), hm(8, 0))];
        assert!(policy.validate().is_err());
    }

    #[test]
    fn rejects_short_break_longer_than_period() {
        let mut policy = SchedulingPolicy::default();
        policy.optimization.add_breaks.short_breaks = ShortBreaks {
            enabled: true,
            frequency: 30,
            duration: 30,
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn selection_mode_parses() {
        assert_eq!("Reschedule".parse::<SelectionMode>().unwrap(), SelectionMode::Reschedule);
        assert!("partial".parse::<SelectionMode>().is_err());
        assert_eq!(SelectionMode::Unscheduled.to_string(), "unscheduled");
    }

    #[test]
    fn policy_serializes_camel_case() {
        let json = serde_json::to_value(SchedulingPolicy::default()).unwrap();
        assert!(json.get("maxTasksPerDay").is_some());
        assert_eq!(json["optimization"]["addBreaks"]["lunchBreak"]["start"], "12:00");
        assert_eq!(json["dailySchedule"][0]["weekday"], "Mon");
    }
}
