//! Automatic task scheduler.
//!
//! This module places tasks onto concrete days and start times:
//! - Resolves the run's date range from the policy's time period
//! - Partitions tasks by selection mode (`full`, `unscheduled`, `reschedule`)
//! - Places tasks greedily, one at a time, each placement visible to the next
//! - Never moves an urgent task that is already scheduled inside the range
//!
//! Placement is single-pass with no backtracking. A task that fits nowhere is
//! left out of the result; that is a normal outcome, not an error.

pub mod availability;
pub mod slot;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

pub use availability::{compute_daily_load, find_available_days, DailyLimits, DailyLoad};
pub use slot::{break_windows, find_best_time_slot, SlotChoice};

use crate::error::Result;
use crate::policy::{PolicyOverrides, SchedulingPolicy, SelectionMode};
use crate::task::{Priority, Task};
use crate::time::{resolve_time_period, DateRange};

/// Result of a scheduling run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// Every placed task, fixed ones included
    pub tasks: Vec<Task>,
    /// Ids of tasks that were up for placement but fit nowhere
    pub unplaced: Vec<String>,
    pub range: DateRange,
    pub mode: SelectionMode,
}

/// Input split by how a run may treat each task.
#[derive(Debug, Default)]
struct Partition {
    /// Urgent tasks already scheduled in range; never moved.
    fixed_urgent: Vec<Task>,
    /// Other tasks already scheduled in range.
    other_placed: Vec<Task>,
    /// Unscheduled tasks and tasks scheduled outside the range.
    rest: Vec<Task>,
}

impl Partition {
    fn split(tasks: &[Task], range: &DateRange) -> Self {
        let mut partition = Partition::default();
        for task in tasks {
            match task.placement() {
                Some(p) if range.contains(p.date) && task.priority == Priority::Urgent => {
                    partition.fixed_urgent.push(task.clone())
                }
                Some(p) if range.contains(p.date) => partition.other_placed.push(task.clone()),
                _ => partition.rest.push(task.clone()),
            }
        }
        partition
    }
}

/// Sort key: urgent first, then tasks with a date hint, then shorter tasks.
fn placement_key(task: &Task, policy: &SchedulingPolicy) -> i64 {
    let hint = if task.has_preferred_date() { 100 } else { 0 };
    i64::from(task.priority.rank()) * 1000 - hint + i64::from(task.effective_duration(policy))
}

/// Place one task against the current working set.
///
/// A preferred date among the available days wins outright when it has any
/// free slot. Otherwise every available day is tried and the globally lowest
/// slot score wins; ties keep the earlier day in day-score order.
pub fn schedule_task(
    task: &Task,
    range: &DateRange,
    placed: &[Task],
    policy: &SchedulingPolicy,
) -> Option<Task> {
    let days = find_available_days(task, range, placed, policy);
    if days.is_empty() {
        return None;
    }
    let duration = task.effective_duration(policy);

    if let Some(preferred) = task.preferred_date.filter(|d| days.contains(d)) {
        if let Some(slot) = find_best_time_slot(task, preferred, placed, policy) {
            tracing::debug!(task = %task.id, day = %preferred, start = %slot.start, "placed on preferred date");
            return task.placed(preferred, slot.start, duration);
        }
    }

    let mut best: Option<(NaiveDate, SlotChoice)> = None;
    for day in days {
        if let Some(slot) = find_best_time_slot(task, day, placed, policy) {
            if best.map_or(true, |(_, b)| slot.score < b.score) {
                best = Some((day, slot));
            }
        }
    }

    let (day, slot) = best?;
    tracing::debug!(task = %task.id, %day, start = %slot.start, score = slot.score, "placed");
    task.placed(day, slot.start, duration)
}

/// Greedy scheduler bound to one policy and one notion of "today".
#[derive(Debug, Clone)]
pub struct AutoScheduler {
    policy: SchedulingPolicy,
    today: NaiveDate,
}

impl AutoScheduler {
    /// Create a scheduler with the default policy, using the local date as today.
    pub fn new() -> Self {
        Self::with_policy(SchedulingPolicy::default())
    }

    /// Create with a validated policy.
    pub fn with_policy(policy: SchedulingPolicy) -> Self {
        Self {
            policy,
            today: Local::now().date_naive(),
        }
    }

    /// Merge `overrides` onto the default policy.
    pub fn from_overrides(overrides: &PolicyOverrides) -> Result<Self> {
        let policy = SchedulingPolicy::default().merged(overrides)?;
        Ok(Self::with_policy(policy))
    }

    /// Pin the date `today`/`tomorrow`/`this_week` are resolved against.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn policy(&self) -> &SchedulingPolicy {
        &self.policy
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Date range this scheduler plans over.
    pub fn date_range(&self) -> Result<DateRange> {
        resolve_time_period(self.policy.time_period, &self.policy.allowed_weekdays(), self.today)
    }

    /// Run one scheduling pass over `tasks`.
    pub fn run(&self, tasks: &[Task]) -> Result<ScheduleOutcome> {
        let range = self.date_range()?;
        let mode = self.policy.task_selection_mode;
        let Partition {
            fixed_urgent,
            other_placed,
            rest,
        } = Partition::split(tasks, &range);

        tracing::debug!(
            %mode,
            start = %range.start,
            end = %range.end,
            fixed = fixed_urgent.len(),
            placed = other_placed.len(),
            rest = rest.len(),
            "partitioned tasks"
        );

        let (mut working, mut pending) = match mode {
            SelectionMode::Full => {
                let pending: Vec<Task> = other_placed.iter().chain(rest.iter()).map(Task::unplaced).collect();
                (fixed_urgent, pending)
            }
            SelectionMode::Unscheduled => {
                let pending: Vec<Task> = rest.into_iter().filter(|t| t.placement().is_none()).collect();
                let mut working = fixed_urgent;
                working.extend(other_placed);
                (working, pending)
            }
            SelectionMode::Reschedule => {
                let pending: Vec<Task> = other_placed.iter().map(Task::unplaced).collect();
                (fixed_urgent, pending)
            }
        };

        pending.sort_by_key(|t| placement_key(t, &self.policy));

        let mut unplaced = Vec::new();
        for task in &pending {
            match schedule_task(task, &range, &working, &self.policy) {
                Some(placed) => working.push(placed),
                None => {
                    tracing::warn!(task = %task.id, title = %task.title, "no slot found");
                    unplaced.push(task.id.clone());
                }
            }
        }

        tracing::info!(
            %mode,
            placed = working.len(),
            unplaced = unplaced.len(),
            "scheduling run finished"
        );

        Ok(ScheduleOutcome {
            tasks: working,
            unplaced,
            range,
            mode,
        })
    }

    /// Run and return only the placed tasks.
    pub fn schedule(&self, tasks: &[Task]) -> Result<Vec<Task>> {
        Ok(self.run(tasks)?.tasks)
    }
}

impl Default for AutoScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Schedule `tasks` under the default policy merged with `overrides`.
///
/// Tasks that cannot be placed are absent from the returned list.
pub fn schedule_tasks(tasks: &[Task], overrides: &PolicyOverrides, today: NaiveDate) -> Result<Vec<Task>> {
    AutoScheduler::from_overrides(overrides)?
        .with_today(today)
        .schedule(tasks)
}
