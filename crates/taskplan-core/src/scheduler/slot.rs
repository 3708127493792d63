//! Intra-day slot search.
//!
//! Candidate start times are scanned from the day's opening time in steps of
//! the policy's slot interval. Rejected positions never reach the scorer.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::availability::{compute_daily_load, placements_on, DailyLimits};
use crate::energy::energy_tier;
use crate::policy::{DayAvailability, SchedulingPolicy};
use crate::scoring::slot_score;
use crate::task::Task;
use crate::time::{ClockTime, TimeInterval};

/// Winning start time for a task on one day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotChoice {
    pub start: ClockTime,
    pub score: f64,
}

/// Why a candidate position was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Blocked,
    Break,
    Conflict,
    Energy,
}

/// Concrete break intervals for a day under the policy's break rules.
///
/// Short breaks start every `frequency` minutes after opening time and stop
/// at closing time.
pub fn break_windows(day: &DayAvailability, policy: &SchedulingPolicy) -> Vec<TimeInterval> {
    let breaks = &policy.optimization.add_breaks;
    if !breaks.enabled {
        return Vec::new();
    }

    let mut windows = Vec::new();
    if breaks.lunch_break.enabled {
        windows.push(TimeInterval::starting_at(
            breaks.lunch_break.start,
            breaks.lunch_break.duration,
        ));
    }
    if breaks.short_breaks.enabled && breaks.short_breaks.frequency > 0 {
        let close = day.close.minutes();
        let mut at = day.open.minutes() + breaks.short_breaks.frequency;
        while at < close {
            if let Some(start) = ClockTime::from_minutes(at) {
                windows.push(TimeInterval::starting_at(start, breaks.short_breaks.duration));
            }
            at += breaks.short_breaks.frequency;
        }
    }
    windows
}

struct DayContext<'a> {
    availability: &'a DayAvailability,
    breaks: Vec<TimeInterval>,
    occupied: Vec<TimeInterval>,
}

impl DayContext<'_> {
    fn check(&self, task: &Task, start: u32, end: u32, policy: &SchedulingPolicy) -> Result<(), Rejection> {
        if policy.optimization.respect_fixed_appointments
            && self.availability.blocked.iter().any(|b| b.overlaps_minutes(start, end))
        {
            return Err(Rejection::Blocked);
        }
        if self.breaks.iter().any(|b| b.overlaps_minutes(start, end)) {
            return Err(Rejection::Break);
        }
        let spacing = policy.break_between_tasks;
        if self
            .occupied
            .iter()
            .any(|o| start < o.end.minutes() + spacing && end + spacing > o.start.minutes())
        {
            return Err(Rejection::Conflict);
        }
        let tier = ClockTime::from_minutes(start).map(|t| energy_tier(t, &policy.energy_levels));
        match tier {
            Some(tier) if tier.eligible_for(task.priority) => Ok(()),
            _ => Err(Rejection::Energy),
        }
    }
}

/// Best start time for `task` on `day`, or `None` when nothing fits.
///
/// Returns early when the day is already at its task count, at the task's
/// priority quota, or would exceed its minute budget. Among accepted
/// positions the lowest [`slot_score`] wins; ties go to the earliest.
pub fn find_best_time_slot(
    task: &Task,
    day: NaiveDate,
    placed: &[Task],
    policy: &SchedulingPolicy,
) -> Option<SlotChoice> {
    let availability = policy.availability_for(day)?;
    let duration = task.effective_duration(policy);

    let load = compute_daily_load(day, placed);
    if !DailyLimits::adjusted(policy, task.priority, 1.0).admits(&load, task.priority, duration) {
        return None;
    }

    let ctx = DayContext {
        availability,
        breaks: break_windows(availability, policy),
        occupied: placements_on(day, placed).map(|(_, p)| p.interval()).collect(),
    };

    let step = policy.time_slot_interval.max(1);
    let last_start = availability.close.minutes().checked_sub(duration)?;
    let mut best: Option<SlotChoice> = None;
    let mut start = availability.open.minutes();

    while start <= last_start {
        match ctx.check(task, start, start + duration, policy) {
            Ok(()) => {
                if let Some(at) = ClockTime::from_minutes(start) {
                    let score = slot_score(task, day, at, duration, placed, policy);
                    if best.map_or(true, |b| score < b.score) {
                        best = Some(SlotChoice { start: at, score });
                    }
                }
            }
            Err(reason) => {
                tracing::trace!(task = %task.id, %day, start, ?reason, "slot rejected");
            }
        }
        start += step;
    }

    best
}
