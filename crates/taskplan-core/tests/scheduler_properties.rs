//! Property tests over random task sets.
//!
//! Whatever the input, a run must never overlap placements, exceed daily
//! quotas or leave the working window.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use proptest::prelude::*;
use taskplan_core::policy::{BreakOverrides, LunchBreakOverrides, OptimizationOverrides, ShortBreakOverrides};
use taskplan_core::scheduler::break_windows;
use taskplan_core::{
    validate_schedule, AutoScheduler, MoodAdjustments, PolicyOverrides, Priority, SchedulingPolicy, SelectionMode,
    Task, TimePeriod,
};

fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
}

fn task_strategy() -> impl Strategy<Value = Task> {
    (0usize..4, 1u32..=12, 0usize..3, proptest::option::of(0i64..7)).prop_map(
        |(priority, quarters, category, preferred)| {
            let mut task = Task::new("generated", Priority::ALL[priority])
                .with_duration(quarters * 15)
                .with_category(["", "docs", "code"][category]);
            task.preferred_date = preferred.map(|d| monday() + Duration::days(d));
            task
        },
    )
}

fn mode_strategy() -> impl Strategy<Value = SelectionMode> {
    prop_oneof![
        Just(SelectionMode::Full),
        Just(SelectionMode::Unscheduled),
        Just(SelectionMode::Reschedule),
    ]
}

/// Every placement constraint that must hold for any run.
fn check_invariants(policy: &SchedulingPolicy, placed: &[Task], input: &[Task]) -> Result<(), TestCaseError> {
    let input_ids: HashSet<&str> = input.iter().map(|t| t.id.as_str()).collect();
    let mut seen = HashSet::new();
    let mut by_day: HashMap<NaiveDate, Vec<&Task>> = HashMap::new();

    for task in placed {
        prop_assert!(input_ids.contains(task.id.as_str()));
        prop_assert!(seen.insert(task.id.as_str()), "duplicate {}", task.id);
        let p = task.placement();
        prop_assert!(p.is_some());
        by_day.entry(p.unwrap().date).or_default().push(task);
    }

    for (day, tasks) in &by_day {
        let factor = policy.mood_adjustments.factor_for(*day, policy.consider_mood).min(1.0);
        let cap = |limit: u32| (f64::from(limit) * factor).floor() as usize;
        prop_assert!(tasks.len() <= cap(policy.max_tasks_per_day));
        for priority in Priority::ALL {
            let count = tasks.iter().filter(|t| t.priority == priority).count();
            prop_assert!(count <= cap(policy.priority_limits.get(priority)));
        }
        let minutes: u32 = tasks.iter().map(|t| t.placement().unwrap().duration_minutes()).sum();
        prop_assert!(minutes as usize <= cap(policy.max_minutes_per_day()));

        let availability = policy.availability_for(*day);
        prop_assert!(availability.is_some());
        let availability = availability.unwrap();
        let breaks = break_windows(availability, policy);

        let mut intervals: Vec<_> = tasks.iter().map(|t| t.placement().unwrap().interval()).collect();
        for interval in &intervals {
            prop_assert!(interval.start >= availability.open);
            prop_assert!(interval.end <= availability.close);
            prop_assert!(!availability.blocked.iter().any(|b| b.overlaps(interval)));
            prop_assert!(!breaks.iter().any(|b| b.overlaps(interval)));
        }
        intervals.sort_by_key(|i| i.start);
        for pair in intervals.windows(2) {
            prop_assert!(pair[1].start.minutes() >= pair[0].end.minutes() + policy.break_between_tasks);
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_full_run_respects_constraints(tasks in proptest::collection::vec(task_strategy(), 0..30)) {
        let overrides = PolicyOverrides::default().with_time_period(TimePeriod::ThisWeek);
        let scheduler = AutoScheduler::from_overrides(&overrides).unwrap().with_today(monday());
        let outcome = scheduler.run(&tasks).unwrap();

        check_invariants(scheduler.policy(), &outcome.tasks, &tasks)?;
        prop_assert_eq!(outcome.tasks.len() + outcome.unplaced.len(), tasks.len());
        for task in &outcome.tasks {
            prop_assert!(outcome.range.contains(task.date.unwrap()));
        }
        // default hours match the validator's working window
        let violations = validate_schedule(&outcome.tasks, scheduler.policy(), &outcome.range);
        prop_assert!(violations.is_empty(), "{:?}", violations);
    }

    #[test]
    fn prop_mood_factors_shrink_quotas(
        tasks in proptest::collection::vec(task_strategy(), 0..30),
        factors in proptest::collection::vec(prop_oneof![Just(0.5), Just(0.75), Just(1.0)], 5),
    ) {
        let moods: MoodAdjustments = factors
            .iter()
            .enumerate()
            .map(|(i, f)| (monday() + Duration::days(i as i64), *f))
            .collect();
        let overrides = PolicyOverrides {
            consider_mood: Some(true),
            mood_adjustments: Some(moods),
            ..Default::default()
        }
        .with_time_period(TimePeriod::ThisWeek);
        let scheduler = AutoScheduler::from_overrides(&overrides).unwrap().with_today(monday());

        let placed = scheduler.schedule(&tasks).unwrap();
        check_invariants(scheduler.policy(), &placed, &tasks)?;
    }

    #[test]
    fn prop_short_breaks_stay_free(
        tasks in proptest::collection::vec(task_strategy(), 0..30),
        frequency in 45u32..=120,
        length in 5u32..=20,
        with_lunch in any::<bool>(),
    ) {
        let overrides = PolicyOverrides {
            optimization: Some(OptimizationOverrides {
                add_breaks: Some(BreakOverrides {
                    enabled: Some(true),
                    lunch_break: Some(LunchBreakOverrides {
                        enabled: Some(with_lunch),
                        ..Default::default()
                    }),
                    short_breaks: Some(ShortBreakOverrides {
                        enabled: Some(true),
                        frequency: Some(frequency),
                        duration: Some(length),
                    }),
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
        .with_time_period(TimePeriod::ThisWeek);
        let scheduler = AutoScheduler::from_overrides(&overrides).unwrap().with_today(monday());
        prop_assert!(scheduler.policy().optimization.add_breaks.short_breaks.enabled);

        let placed = scheduler.schedule(&tasks).unwrap();
        check_invariants(scheduler.policy(), &placed, &tasks)?;
    }

    #[test]
    fn prop_second_pass_keeps_constraints(
        tasks in proptest::collection::vec(task_strategy(), 0..20),
        mode in mode_strategy(),
    ) {
        let week = PolicyOverrides::default().with_time_period(TimePeriod::ThisWeek);
        let first = AutoScheduler::from_overrides(&week).unwrap().with_today(monday()).schedule(&tasks).unwrap();

        let mut input = first.clone();
        input.extend(tasks.iter().filter(|t| !first.iter().any(|p| p.id == t.id)).cloned());

        let scheduler = AutoScheduler::from_overrides(&week.with_mode(mode)).unwrap().with_today(monday());
        let second = scheduler.schedule(&input).unwrap();
        check_invariants(scheduler.policy(), &second, &input)?;

        if mode == SelectionMode::Unscheduled {
            for task in &first {
                prop_assert!(second.contains(task));
            }
        }
    }
}
