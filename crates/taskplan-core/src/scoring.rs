//! Day and slot heuristics.
//!
//! Two scores drive placement:
//! - [`day_score`] ranks candidate days (higher is better)
//! - [`slot_score`] ranks concrete start times, within a day and across days
//!   (lower is better)

use chrono::NaiveDate;

use crate::energy::{energy_tier, EnergyTier};
use crate::policy::SchedulingPolicy;
use crate::scheduler::availability::{compute_daily_load, placements_on};
use crate::task::{Priority, Task};
use crate::time::{ClockTime, TimeInterval};

/// Window around a candidate start in which same-category tasks count as batched.
pub const FOCUS_WINDOW_MINUTES: u32 = 60;

const MS_PER_MINUTE: f64 = 60_000.0;

fn shares_category(a: &Task, b: &Task) -> bool {
    !a.category.is_empty() && a.category == b.category
}

/// Planned share of the day's minute budget.
fn utilization(planned_minutes: u32, policy: &SchedulingPolicy) -> f64 {
    let max = policy.max_minutes_per_day();
    if max == 0 {
        return 0.0;
    }
    f64::from(planned_minutes) / f64::from(max)
}

/// Desirability of `day` for `task` (higher is better).
///
/// - Activity bonus: `+1000 − count×100` when the day already has tasks
/// - Clustering: `+200` per task that day in the same category
/// - Balance: `floor((1 − |0.5 − utilization|) × 500)`, peaking at half full
/// - Mood: on days with a factor ≠ 1.0 the score is scaled by
///   `1 − rank×(1 − factor)` and shifted by `(factor − 0.5)×1000`, so low-mood
///   days put off low priority work more than urgent work
pub fn day_score(task: &Task, day: NaiveDate, placed: &[Task], policy: &SchedulingPolicy) -> f64 {
    let load = compute_daily_load(day, placed);
    let mut score = 0.0;

    if load.task_count > 0 {
        score += 1000.0 - f64::from(load.task_count) * 100.0;
    }

    let same_category = placements_on(day, placed)
        .filter(|(other, _)| shares_category(task, other))
        .count();
    score += same_category as f64 * 200.0;

    let u = utilization(load.total_minutes, policy);
    score += ((1.0 - (0.5 - u).abs()) * 500.0).floor();

    let factor = policy.mood_adjustments.factor_for(day, policy.consider_mood);
    if policy.consider_mood && factor != 1.0 {
        score *= 1.0 - task.priority.normalized_rank() * (1.0 - factor);
        score += (factor - 0.5) * 1000.0;
    }

    score
}

/// Gap in minutes between two intervals; zero when they touch or overlap.
fn gap_minutes(a: &TimeInterval, b: &TimeInterval) -> u32 {
    let (a_start, a_end) = (a.start.minutes(), a.end.minutes());
    let (b_start, b_end) = (b.start.minutes(), b.end.minutes());
    b_start.saturating_sub(a_end).max(a_start.saturating_sub(b_end))
}

/// Proximity reward (0 to 100) for sitting close to the nearest placed task.
fn proximity_bonus(distance_minutes: u32) -> f64 {
    let distance_ms = f64::from(distance_minutes) * MS_PER_MINUTE;
    if distance_ms == 0.0 {
        return 100.0;
    }
    (100_000.0 / distance_ms).floor().min(100.0)
}

/// Cost of starting `task` at `start` on `day` (lower is better).
///
/// - Crowding: `−200` when the day already has a task
/// - Proximity: `−min(100, floor(100000 / distance_ms))` to the nearest task
/// - Energy: `+50` for urgent/high work outside a high-energy hour
/// - Focus batching: `−50` per same-category task starting within ±60 min
///   (only with `optimize_focus_time`)
/// - Utilization: `−(planned / max) × 100`
pub fn slot_score(
    task: &Task,
    day: NaiveDate,
    start: ClockTime,
    duration: u32,
    placed: &[Task],
    policy: &SchedulingPolicy,
) -> f64 {
    let candidate = TimeInterval::starting_at(start, duration);
    let on_day: Vec<_> = placements_on(day, placed).collect();
    let mut score = 0.0;

    if !on_day.is_empty() {
        score -= 200.0;
    }

    if let Some(nearest) = on_day
        .iter()
        .map(|(_, p)| gap_minutes(&candidate, &p.interval()))
        .min()
    {
        score -= proximity_bonus(nearest);
    }

    if matches!(task.priority, Priority::Urgent | Priority::High)
        && energy_tier(start, &policy.energy_levels) != EnergyTier::High
    {
        score += 50.0;
    }

    if policy.optimization.optimize_focus_time {
        let batched = on_day
            .iter()
            .filter(|(other, p)| {
                shares_category(task, other) && p.start.minutes().abs_diff(start.minutes()) <= FOCUS_WINDOW_MINUTES
            })
            .count();
        score -= batched as f64 * 50.0;
    }

    let planned: u32 = on_day.iter().map(|(_, p)| p.duration_minutes()).sum();
    score -= utilization(planned, policy) * 100.0;

    score
}
