//! Partial policy supplied by callers and config files.
//!
//! Every field is optional. [`PolicyOverrides::apply`] deep-merges onto a full
//! policy; [`PolicyOverrides::overlay`] stacks two override layers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{DayAvailability, SchedulingPolicy, SelectionMode};
use crate::mood::MoodAdjustments;
use crate::time::{ClockTime, TimePeriod};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PriorityLimitOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub urgent: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct EnergyOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Vec<ClockTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<Vec<ClockTime>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Vec<ClockTime>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct LunchBreakOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<ClockTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct ShortBreakOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct BreakOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lunch_break: Option<LunchBreakOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_breaks: Option<ShortBreakOverrides>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct OptimizationOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respect_fixed_appointments: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub add_breaks: Option<BreakOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimize_focus_time: Option<bool>,
}

/// Caller-supplied policy options.
///
/// Keys follow the external option names (`defaultDuration`,
/// `maxHoursPerDay`, `dailySchedule`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PolicyOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_duration: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tasks_per_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_hours_per_day: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority_limits: Option<PriorityLimitOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_levels: Option<EnergyOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_slot_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub break_between_tasks: Option<u32>,
    /// Replaces the weekly table wholesale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_schedule: Option<Vec<DayAvailability>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub optimization: Option<OptimizationOverrides>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consider_mood: Option<bool>,
    /// Merged per date; entries here win.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mood_adjustments: Option<MoodAdjustments>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_selection_mode: Option<SelectionMode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_period: Option<TimePeriod>,
}

fn set<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

/// `upper` wins field by field.
fn pick<T: Clone>(lower: &Option<T>, upper: &Option<T>) -> Option<T> {
    upper.clone().or_else(|| lower.clone())
}

fn pick_nested<T, F>(lower: &Option<T>, upper: &Option<T>, merge: F) -> Option<T>
where
    T: Clone,
    F: FnOnce(&T, &T) -> T,
{
    match (lower, upper) {
        (Some(l), Some(u)) => Some(merge(l, u)),
        _ => pick(lower, upper),
    }
}

impl PolicyOverrides {
    pub fn is_empty(&self) -> bool {
        *self == PolicyOverrides::default()
    }

    pub fn with_mode(mut self, mode: SelectionMode) -> Self {
        self.task_selection_mode = Some(mode);
        self
    }

    pub fn with_time_period(mut self, period: TimePeriod) -> Self {
        self.time_period = Some(period);
        self
    }

    pub fn with_mood(mut self, day: NaiveDate, factor: f64) -> Self {
        self.consider_mood = Some(true);
        self.mood_adjustments
            .get_or_insert_with(MoodAdjustments::default)
            .insert(day, factor);
        self
    }

    /// Deep-merge onto `policy`, returning the merged value.
    pub fn apply(&self, mut policy: SchedulingPolicy) -> SchedulingPolicy {
        set(&mut policy.default_duration, &self.default_duration);
        set(&mut policy.max_tasks_per_day, &self.max_tasks_per_day);
        set(&mut policy.max_hours_per_day, &self.max_hours_per_day);
        if let Some(limits) = &self.priority_limits {
            let target = &mut policy.priority_limits;
            set(&mut target.urgent, &limits.urgent);
            set(&mut target.high, &limits.high);
            set(&mut target.medium, &limits.medium);
            set(&mut target.low, &limits.low);
        }
        if let Some(energy) = &self.energy_levels {
            let target = &mut policy.energy_levels;
            set(&mut target.high, &energy.high);
            set(&mut target.medium, &energy.medium);
            set(&mut target.low, &energy.low);
        }
        set(&mut policy.time_slot_interval, &self.time_slot_interval);
        set(&mut policy.break_between_tasks, &self.break_between_tasks);
        set(&mut policy.daily_schedule, &self.daily_schedule);
        if let Some(opt) = &self.optimization {
            let target = &mut policy.optimization;
            set(&mut target.respect_fixed_appointments, &opt.respect_fixed_appointments);
            set(&mut target.optimize_focus_time, &opt.optimize_focus_time);
            if let Some(breaks) = &opt.add_breaks {
                let target = &mut target.add_breaks;
                set(&mut target.enabled, &breaks.enabled);
                if let Some(lunch) = &breaks.lunch_break {
                    set(&mut target.lunch_break.enabled, &lunch.enabled);
                    set(&mut target.lunch_break.start, &lunch.start);
                    set(&mut target.lunch_break.duration, &lunch.duration);
                }
                if let Some(short) = &breaks.short_breaks {
                    set(&mut target.short_breaks.enabled, &short.enabled);
                    set(&mut target.short_breaks.frequency, &short.frequency);
                    set(&mut target.short_breaks.duration, &short.duration);
                }
            }
        }
        set(&mut policy.consider_mood, &self.consider_mood);
        if let Some(moods) = &self.mood_adjustments {
            for (day, factor) in moods.iter() {
                policy.mood_adjustments.insert(day, factor);
            }
        }
        set(&mut policy.task_selection_mode, &self.task_selection_mode);
        set(&mut policy.time_period, &self.time_period);
        policy
    }

    /// Stack `upper` on top of `self`; fields set in `upper` win.
    pub fn overlay(&self, upper: &PolicyOverrides) -> PolicyOverrides {
        PolicyOverrides {
            default_duration: pick(&self.default_duration, &upper.default_duration),
            max_tasks_per_day: pick(&self.max_tasks_per_day, &upper.max_tasks_per_day),
            max_hours_per_day: pick(&self.max_hours_per_day, &upper.max_hours_per_day),
            priority_limits: pick_nested(&self.priority_limits, &upper.priority_limits, |l, u| {
                PriorityLimitOverrides {
                    urgent: pick(&l.urgent, &u.urgent),
                    high: pick(&l.high, &u.high),
                    medium: pick(&l.medium, &u.medium),
                    low: pick(&l.low, &u.low),
                }
            }),
            energy_levels: pick_nested(&self.energy_levels, &upper.energy_levels, |l, u| EnergyOverrides {
                high: pick(&l.high, &u.high),
                medium: pick(&l.medium, &u.medium),
                low: pick(&l.low, &u.low),
            }),
            time_slot_interval: pick(&self.time_slot_interval, &upper.time_slot_interval),
            break_between_tasks: pick(&self.break_between_tasks, &upper.break_between_tasks),
            daily_schedule: pick(&self.daily_schedule, &upper.daily_schedule),
            optimization: pick_nested(&self.optimization, &upper.optimization, |l, u| {
                OptimizationOverrides {
                    respect_fixed_appointments: pick(
                        &l.respect_fixed_appointments,
                        &u.respect_fixed_appointments,
                    ),
                    add_breaks: pick_nested(&l.add_breaks, &u.add_breaks, |l, u| BreakOverrides {
                        enabled: pick(&l.enabled, &u.enabled),
                        lunch_break: pick_nested(&l.lunch_break, &u.lunch_break, |l, u| {
                            LunchBreakOverrides {
                                enabled: pick(&l.enabled, &u.enabled),
                                start: pick(&l.start, &u.start),
                                duration: pick(&l.duration, &u.duration),
                            }
                        }),
                        short_breaks: pick_nested(&l.short_breaks, &u.short_breaks, |l, u| {
                            ShortBreakOverrides {
                                enabled: pick(&l.enabled, &u.enabled),
                                frequency: pick(&l.frequency, &u.frequency),
                                duration: pick(&l.duration, &u.duration),
                            }
                        }),
                    }),
                    optimize_focus_time: pick(&l.optimize_focus_time, &u.optimize_focus_time),
                }
            }),
            consider_mood: pick(&self.consider_mood, &upper.consider_mood),
            mood_adjustments: pick_nested(&self.mood_adjustments, &upper.mood_adjustments, |l, u| {
                l.iter().chain(u.iter()).collect()
            }),
            task_selection_mode: pick(&self.task_selection_mode, &upper.task_selection_mode),
            time_period: pick(&self.time_period, &upper.time_period),
        }
    }
}
