//! Task types consumed and produced by the scheduler.
//!
//! The engine treats every field except the placement (`scheduled`, `date`,
//! `start_time`, `end_time`, `duration`) as read-only.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;
use crate::policy::SchedulingPolicy;
use crate::time::{ClockTime, TimeInterval};

/// Task priority.
///
/// Declaration order is placement order: urgent tasks are placed first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Urgent,
    High,
    Medium,
    Low,
}

impl Priority {
    pub const ALL: [Priority; 4] = [Priority::Urgent, Priority::High, Priority::Medium, Priority::Low];

    /// Position in priority order, urgent = 0 … low = 3.
    pub fn rank(self) -> u32 {
        match self {
            Priority::Urgent => 0,
            Priority::High => 1,
            Priority::Medium => 2,
            Priority::Low => 3,
        }
    }

    /// Rank scaled to `0.0..=1.0`.
    pub fn normalized_rank(self) -> f64 {
        f64::from(self.rank()) / 3.0
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Urgent => "urgent",
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Medium
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::invalid("priority", format!("unknown priority '{s}'")))
    }
}

/// Lifecycle status as tracked by the surrounding application.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

/// A consistent (date, start, end) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub date: NaiveDate,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl Placement {
    pub fn interval(&self) -> TimeInterval {
        TimeInterval::new(self.start, self.end)
    }

    pub fn duration_minutes(&self) -> u32 {
        self.interval().duration_minutes()
    }
}

/// A unit of work to be placed on the calendar.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub priority: Priority,
    /// Free-form grouping label used for clustering similar work
    #[serde(default)]
    pub category: String,
    /// Duration in minutes. The policy default applies when absent.
    #[serde(default)]
    pub duration: Option<u32>,
    /// Soft hint; never binding.
    #[serde(default)]
    pub preferred_date: Option<NaiveDate>,
    #[serde(default)]
    pub scheduled: bool,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub start_time: Option<ClockTime>,
    #[serde(default)]
    pub end_time: Option<ClockTime>,
    #[serde(default)]
    pub status: TaskStatus,
}

impl Task {
    /// Create an unscheduled task with a fresh id.
    pub fn new(title: impl Into<String>, priority: Priority) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.into(),
            priority,
            category: String::new(),
            duration: None,
            preferred_date: None,
            scheduled: false,
            date: None,
            start_time: None,
            end_time: None,
            status: TaskStatus::Pending,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn with_duration(mut self, minutes: u32) -> Self {
        self.duration = Some(minutes);
        self
    }

    pub fn with_preferred_date(mut self, date: NaiveDate) -> Self {
        self.preferred_date = Some(date);
        self
    }

    /// Declared duration, or the policy default.
    pub fn effective_duration(&self, policy: &SchedulingPolicy) -> u32 {
        self.duration.unwrap_or(policy.default_duration)
    }

    /// Current placement, if the task is scheduled with all fields present.
    pub fn placement(&self) -> Option<Placement> {
        if !self.scheduled {
            return None;
        }
        match (self.date, self.start_time, self.end_time) {
            (Some(date), Some(start), Some(end)) if start <= end => Some(Placement { date, start, end }),
            _ => None,
        }
    }

    /// Scheduled day, if any.
    pub fn scheduled_date(&self) -> Option<NaiveDate> {
        self.placement().map(|p| p.date)
    }

    /// Copy of this task placed at `start` on `date`.
    pub fn placed(&self, date: NaiveDate, start: ClockTime, duration: u32) -> Option<Task> {
        let end = start.checked_add(duration)?;
        Some(Task {
            scheduled: true,
            date: Some(date),
            start_time: Some(start),
            end_time: Some(end),
            duration: Some(duration),
            ..self.clone()
        })
    }

    /// Copy of this task with its placement removed.
    pub fn unplaced(&self) -> Task {
        Task {
            scheduled: false,
            date: None,
            start_time: None,
            end_time: None,
            ..self.clone()
        }
    }

    pub fn has_preferred_date(&self) -> bool {
        self.preferred_date.is_some()
    }
}
