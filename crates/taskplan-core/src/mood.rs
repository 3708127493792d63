//! Mood-derived daily capacity factors.
//!
//! Factors come from outside the engine (a user's recorded mood/energy for a
//! day). A factor below 1.0 shrinks that day's quotas. A factor above 1.0
//! raises the day's score but never lifts capacity past the policy limits,
//! since slot search re-checks the unscaled limits.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Smallest factor that is rejected. Factors must be strictly positive.
pub const MIN_FACTOR_EXCLUSIVE: f64 = 0.0;
/// Largest accepted factor.
pub const MAX_FACTOR: f64 = 1.5;

/// Per-date capacity factors keyed by ISO date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoodAdjustments(BTreeMap<NaiveDate, f64>);

impl MoodAdjustments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, day: NaiveDate, factor: f64) -> Self {
        self.0.insert(day, factor);
        self
    }

    pub fn insert(&mut self, day: NaiveDate, factor: f64) {
        self.0.insert(day, factor);
    }

    pub fn get(&self, day: NaiveDate) -> Option<f64> {
        self.0.get(&day).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.0.iter().map(|(d, f)| (*d, *f))
    }

    /// Factor to apply on `day`; 1.0 when mood is ignored or unknown.
    pub fn factor_for(&self, day: NaiveDate, enabled: bool) -> f64 {
        if !enabled {
            return 1.0;
        }
        self.get(day).unwrap_or(1.0)
    }

    /// Check every factor lies in `(0, 1.5]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (day, factor) in self.iter() {
            if !factor.is_finite() || factor <= MIN_FACTOR_EXCLUSIVE || factor > MAX_FACTOR {
                return Err(ConfigError::invalid(
                    format!("moodAdjustments.{day}"),
                    format!("factor {factor} outside (0, {MAX_FACTOR}]"),
                ));
            }
        }
        Ok(())
    }
}

impl FromIterator<(NaiveDate, f64)> for MoodAdjustments {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
