//! Post-hoc schedule auditing.
//!
//! Re-derives violations from a finished schedule instead of trusting the
//! scheduler. The working window here is a fixed 09:00–17:00 on weekdays,
//! deliberately stricter than the availability table a policy may carry, so
//! a schedule can be valid for the scheduler and still be flagged here.

use chrono::{Datelike, Weekday};

use crate::policy::SchedulingPolicy;
use crate::task::{Placement, Task};
use crate::time::{ClockTime, DateRange};

/// Start of the audited working window (minutes since midnight).
pub const WORKDAY_START: u32 = 9 * 60;
/// End of the audited working window (minutes since midnight).
pub const WORKDAY_END: u32 = 17 * 60;
/// Allowed difference between declared and placed duration (minutes).
pub const DURATION_TOLERANCE: u32 = 1;

fn label(task: &Task) -> String {
    format!("'{}' ({})", task.title, task.id)
}

fn fmt_minutes(minutes: u32) -> String {
    ClockTime::from_minutes(minutes).map_or_else(|| format!("{minutes}min"), |t| t.to_string())
}

/// Check `tasks` against `policy` and `range`.
///
/// Returns human-readable violations; an empty list means the schedule is
/// valid. Unscheduled tasks are ignored.
pub fn validate_schedule(tasks: &[Task], policy: &SchedulingPolicy, range: &DateRange) -> Vec<String> {
    let mut violations = Vec::new();
    let mut placed: Vec<(&Task, Placement)> = Vec::new();

    for task in tasks.iter().filter(|t| t.scheduled) {
        match task.placement() {
            Some(p) => placed.push((task, p)),
            None => violations.push(format!(
                "Task {} is marked scheduled but has an incomplete placement",
                label(task)
            )),
        }
    }

    for (task, p) in &placed {
        let (start, end) = (p.start.minutes(), p.end.minutes());

        if start < WORKDAY_START || end > WORKDAY_END {
            violations.push(format!(
                "Task {} at {}-{} is outside working hours {}-{}",
                label(task),
                p.start,
                p.end,
                fmt_minutes(WORKDAY_START),
                fmt_minutes(WORKDAY_END)
            ));
        }

        if !range.contains(p.date) {
            violations.push(format!(
                "Task {} on {} is outside the requested range {} to {}",
                label(task),
                p.date,
                range.start,
                range.end
            ));
        }

        if matches!(p.date.weekday(), Weekday::Sat | Weekday::Sun) {
            violations.push(format!("Task {} is scheduled on a weekend ({})", label(task), p.date));
        }

        if let Some(declared) = task.duration {
            let actual = p.duration_minutes();
            if actual.abs_diff(declared) > DURATION_TOLERANCE {
                violations.push(format!(
                    "Task {} lasts {actual} minutes but declares {declared}",
                    label(task)
                ));
            }
        }
    }

    placed.sort_by_key(|(_, p)| (p.date, p.start));
    for pair in placed.windows(2) {
        let (a_task, a) = &pair[0];
        let (b_task, b) = &pair[1];
        if a.date != b.date {
            continue;
        }
        if b.start < a.end {
            violations.push(format!(
                "Tasks {} and {} overlap on {}",
                label(a_task),
                label(b_task),
                a.date
            ));
        } else if b.start.minutes() - a.end.minutes() < policy.break_between_tasks {
            violations.push(format!(
                "Tasks {} and {} on {} are {} minutes apart, less than the {} minute break",
                label(a_task),
                label(b_task),
                a.date,
                b.start.minutes() - a.end.minutes(),
                policy.break_between_tasks
            ));
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Priority;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn at(h: u32, m: u32) -> ClockTime {
        ClockTime::new(h, m).unwrap()
    }

    fn task(id: &str, d: u32, start: ClockTime, minutes: u32) -> Task {
        Task::new(id, Priority::Medium)
            .with_id(id)
            .placed(date(d), start, minutes)
            .unwrap()
    }

    fn week() -> DateRange {
        DateRange::new(date(19), date(25)).unwrap()
    }

    #[test]
    fn clean_schedule_has_no_violations() {
        let policy = SchedulingPolicy::default();
        let tasks = vec![task("a", 19, at(9, 0), 60), task("b", 19, at(10, 15), 60)];
        assert!(validate_schedule(&tasks, &policy, &week()).is_empty());
    }

    #[test]
    fn detects_overlap() {
        let policy = SchedulingPolicy::default();
        let tasks = vec![task("a", 19, at(9, 0), 60), task("b", 19, at(9, 30), 60)];
        let v = validate_schedule(&tasks, &policy, &week());
        assert_eq!(v.len(), 1);
        assert!(v[0].contains("overlap"));
    }

    #[test]
    fn detects_short_spacing() {
        let policy = SchedulingPolicy::default();
        let tasks = vec![task("a", 19, at(9, 0), 60), task("b", 19, at(10, 5), 60)];
        let v = validate_schedule(&tasks, &policy, &week());
        assert_eq!(v.len(), 1);
        assert!(v[0].contains("5 minutes apart"));
    }

    #[test]
    fn detects_outside_working_hours_even_if_policy_allows() {
        let policy = SchedulingPolicy::default();
        let tasks = vec![task("early", 19, at(8, 0), 60), task("late", 20, at(16, 30), 60)];
        let v = validate_schedule(&tasks, &policy, &week());
        assert_eq!(v.len(), 2);
        assert!(v.iter().all(|s| s.contains("working hours")));
    }

    #[test]
    fn detects_weekend_and_out_of_range() {
        let policy = SchedulingPolicy::default();
        let tasks = vec![task("sat", 24, at(10, 0), 30), task("next", 27, at(10, 0), 30)];
        let v = validate_schedule(&tasks, &policy, &week());
        assert!(v.iter().any(|s| s.contains("weekend")));
        assert!(v.iter().any(|s| s.contains("outside the requested range")));
    }

    #[test]
    fn detects_duration_mismatch_beyond_tolerance() {
        let policy = SchedulingPolicy::default();
        let mut off_by_one = task("a", 19, at(9, 0), 60);
        off_by_one.duration = Some(61);
        let mut off_by_five = task("b", 20, at(9, 0), 60);
        off_by_five.duration = Some(65);
        let v = validate_schedule(&[off_by_one, off_by_five], &policy, &week());
        assert_eq!(v.len(), 1);
        assert!(v[0].contains("declares 65"));
    }

    #[test]
    fn incomplete_placement_is_reported() {
        let policy = SchedulingPolicy::default();
        let mut broken = Task::new("broken", Priority::Low);
        broken.scheduled = true;
        let v = validate_schedule(&[broken], &policy, &week());
        assert_eq!(v.len(), 1);
        assert!(v[0].contains("incomplete"));
    }
}
