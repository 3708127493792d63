//! Daily load aggregation and candidate day selection.

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::policy::SchedulingPolicy;
use crate::scoring::day_score;
use crate::task::{Placement, Priority, Task};
use crate::time::DateRange;

/// What is already planned on one calendar day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLoad {
    pub task_count: u32,
    pub total_minutes: u32,
    /// Counts indexed by [`Priority::rank`]
    pub per_priority: [u32; 4],
}

impl DailyLoad {
    pub fn count(&self, priority: Priority) -> u32 {
        self.per_priority[priority.rank() as usize]
    }
}

/// Daily limits after applying a capacity factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyLimits {
    pub max_tasks: u32,
    pub priority_quota: u32,
    pub max_minutes: u32,
}

impl DailyLimits {
    /// Limits for `priority` scaled by `factor` (rounded down).
    pub fn adjusted(policy: &SchedulingPolicy, priority: Priority, factor: f64) -> Self {
        let scale = |limit: u32| (f64::from(limit) * factor).floor().max(0.0) as u32;
        Self {
            max_tasks: scale(policy.max_tasks_per_day),
            priority_quota: scale(policy.priority_limits.get(priority)),
            max_minutes: scale(policy.max_minutes_per_day()),
        }
    }

    /// Whether one more task of `duration` minutes fits on top of `load`.
    pub fn admits(&self, load: &DailyLoad, priority: Priority, duration: u32) -> bool {
        load.task_count < self.max_tasks
            && load.count(priority) < self.priority_quota
            && load
                .total_minutes
                .checked_add(duration)
                .is_some_and(|total| total <= self.max_minutes)
    }
}

/// Placed tasks on `day` together with their placement.
pub fn placements_on<'a>(day: NaiveDate, placed: &'a [Task]) -> impl Iterator<Item = (&'a Task, Placement)> + 'a {
    placed
        .iter()
        .filter_map(move |t| t.placement().filter(|p| p.date == day).map(|p| (t, p)))
}

/// Aggregate the tasks already placed on `day`.
pub fn compute_daily_load(day: NaiveDate, placed: &[Task]) -> DailyLoad {
    placements_on(day, placed).fold(DailyLoad::default(), |mut load, (task, placement)| {
        load.task_count += 1;
        load.total_minutes += placement.duration_minutes();
        load.per_priority[task.priority.rank() as usize] += 1;
        load
    })
}

/// Days of `range` that can still take `task`, best day first.
///
/// A day qualifies when its weekday is in the availability table and the
/// mood-adjusted task, priority and minute limits all admit the task. The
/// ordering is advisory: the orchestrator compares slot costs across every
/// returned day.
pub fn find_available_days(
    task: &Task,
    range: &DateRange,
    placed: &[Task],
    policy: &SchedulingPolicy,
) -> Vec<NaiveDate> {
    let duration = task.effective_duration(policy);

    let mut scored: Vec<(NaiveDate, f64)> = range
        .days()
        .filter(|day| policy.availability_for(*day).is_some())
        .filter(|day| {
            let factor = policy.mood_adjustments.factor_for(*day, policy.consider_mood);
            let limits = DailyLimits::adjusted(policy, task.priority, factor);
            limits.admits(&compute_daily_load(*day, placed), task.priority, duration)
        })
        .map(|day| (day, day_score(task, day, placed, policy)))
        .collect();

    // Stable: equal scores keep calendar order.
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.into_iter().map(|(day, _)| day).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::MoodAdjustments;
    use crate::time::ClockTime;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn placed(id: &str, priority: Priority, d: u32, h: u32, minutes: u32) -> Task {
        Task::new(id, priority)
            .with_id(id)
            .placed(date(d), ClockTime::new(h, 0).unwrap(), minutes)
            .unwrap()
    }

    #[test]
    fn load_counts_only_that_day() {
        let tasks = vec![
            placed("a", Priority::High, 19, 9, 60),
            placed("b", Priority::Low, 19, 11, 30),
            placed("c", Priority::Low, 20, 9, 45),
            Task::new("unplaced", Priority::Urgent),
        ];
        let load = compute_daily_load(date(19), &tasks);
        assert_eq!(load.task_count, 2);
        assert_eq!(load.total_minutes, 90);
        assert_eq!(load.count(Priority::High), 1);
        assert_eq!(load.count(Priority::Low), 1);
        assert_eq!(load.count(Priority::Urgent), 0);
    }

    #[test]
    fn skips_days_without_availability() {
        let policy = SchedulingPolicy::default();
        // Fri 23 .. Mon 26
        let range = DateRange::new(date(23), date(26)).unwrap();
        let days = find_available_days(&Task::new("t", Priority::Low), &range, &[], &policy);
        assert_eq!(days.len(), 2);
        assert!(days.contains(&date(23)));
        assert!(days.contains(&date(26)));
    }

    #[test]
    fn respects_priority_quota() {
        let mut policy = SchedulingPolicy::default();
        policy.priority_limits.high = 1;
        let range = DateRange::new(date(19), date(20)).unwrap();
        let existing = vec![placed("a", Priority::High, 19, 9, 30)];
        let days = find_available_days(&Task::new("t", Priority::High), &range, &existing, &policy);
        assert_eq!(days, vec![date(20)]);
        // other priorities unaffected
        let days = find_available_days(&Task::new("t", Priority::Low), &range, &existing, &policy);
        assert_eq!(days.len(), 2);
    }

    #[test]
    fn respects_minute_budget() {
        let mut policy = SchedulingPolicy::default();
        policy.max_hours_per_day = 2.0;
        let range = DateRange::single(date(19));
        let existing = vec![placed("a", Priority::Low, 19, 9, 90)];
        let fits = Task::new("fits", Priority::Low).with_duration(30);
        let too_long = Task::new("long", Priority::Low).with_duration(31);
        assert_eq!(find_available_days(&fits, &range, &existing, &policy), vec![date(19)]);
        assert!(find_available_days(&too_long, &range, &existing, &policy).is_empty());
    }

    #[test]
    fn mood_factor_shrinks_capacity() {
        let mut policy = SchedulingPolicy::default();
        policy.max_tasks_per_day = 4;
        policy.consider_mood = true;
        policy.mood_adjustments = MoodAdjustments::new().with(date(19), 0.5);
        let range = DateRange::new(date(19), date(20)).unwrap();
        let existing = vec![
            placed("a", Priority::Low, 19, 9, 30),
            placed("b", Priority::Low, 19, 10, 30),
            placed("c", Priority::Low, 20, 9, 30),
            placed("d", Priority::Low, 20, 10, 30),
        ];
        // floor(4 × 0.5) = 2 tasks on the 19th, 4 on the 20th
        let days = find_available_days(&Task::new("t", Priority::Medium), &range, &existing, &policy);
        assert_eq!(days, vec![date(20)]);
    }

    #[test]
    fn busier_day_ranks_first() {
        let policy = SchedulingPolicy::default();
        let range = DateRange::new(date(19), date(20)).unwrap();
        let existing = vec![placed("a", Priority::Low, 20, 9, 60)];
        let days = find_available_days(&Task::new("t", Priority::Low), &range, &existing, &policy);
        assert_eq!(days, vec![date(20), date(19)]);
    }

    #[test]
    fn oversized_duration_is_never_admitted() {
        let policy = SchedulingPolicy::default();
        let limits = DailyLimits::adjusted(&policy, Priority::Low, 1.0);
        let load = DailyLoad {
            task_count: 1,
            total_minutes: 60,
            per_priority: [0, 0, 0, 1],
        };
        assert!(!limits.admits(&load, Priority::Low, u32::MAX - 10));
        assert!(limits.admits(&load, Priority::Low, 420));

        let range = DateRange::single(date(19));
        let huge = Task::new("huge", Priority::Low).with_duration(u32::MAX);
        assert!(find_available_days(&huge, &range, &[], &policy).is_empty());
    }

    #[test]
    fn adjusted_limits_round_down() {
        let policy = SchedulingPolicy::default();
        let limits = DailyLimits::adjusted(&policy, Priority::Urgent, 0.5);
        assert_eq!(limits.max_tasks, 3);
        assert_eq!(limits.priority_quota, 1); // floor(3 × 0.5)
        assert_eq!(limits.max_minutes, 240);
    }
}
