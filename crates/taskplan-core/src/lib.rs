//! # Taskplan Core Library
//!
//! This library provides the scheduling logic behind the `taskplan` CLI.
//! Given a list of tasks and a scheduling policy it assigns each task a day
//! and a start time, greedily and deterministically, without moving urgent
//! work that is already pinned.
//!
//! ## Architecture
//!
//! - **Time**: clock times, intervals, date ranges and period resolution
//! - **Policy**: the immutable rule set for one run, built by deep-merging
//!   partial overrides onto the defaults
//! - **Scheduler**: candidate day selection, slot search and the greedy
//!   orchestrator with its three selection modes
//! - **Scoring**: day and slot cost functions
//! - **Validator**: an independent audit of a finished schedule
//! - **Config**: TOML-based persistent policy overrides
//!
//! ## Key Components
//!
//! - [`AutoScheduler`]: Runs one scheduling pass
//! - [`SchedulingPolicy`]: Validated policy
//! - [`PolicyOverrides`]: Partial policy supplied by callers
//! - [`validate_schedule`]: Post-hoc schedule audit
//! - [`PlannerConfig`]: Persistent configuration

pub mod config;
pub mod energy;
pub mod error;
pub mod mood;
pub mod policy;
pub mod scheduler;
pub mod scoring;
pub mod task;
pub mod time;
pub mod validator;

pub use config::{data_dir, OutputConfig, PlannerConfig};
pub use energy::{energy_tier, EnergyTable, EnergyTier};
pub use error::{ConfigError, CoreError, ValidationError};
pub use mood::MoodAdjustments;
pub use policy::{DayAvailability, PolicyOverrides, SchedulingPolicy, SelectionMode};
pub use scheduler::{
    compute_daily_load, find_available_days, find_best_time_slot, schedule_task, schedule_tasks,
    AutoScheduler, DailyLoad, ScheduleOutcome, SlotChoice,
};
pub use scoring::{day_score, slot_score};
pub use task::{Placement, Priority, Task, TaskStatus};
pub use time::{resolve_time_period, ClockTime, DateRange, TimeInterval, TimePeriod};
pub use validator::validate_schedule;
