//! Energy tier table and lookup.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::task::Priority;
use crate::time::ClockTime;

/// Coarse suitability of a clock time for demanding work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum EnergyTier {
    High,
    Medium,
    Low,
}

impl EnergyTier {
    /// Whether a task of `priority` may start in this tier.
    ///
    /// High priority work needs a high tier and medium priority work a
    /// high or medium one. Urgent tasks are not restricted here; they are
    /// steered toward high tiers by the slot score instead.
    pub fn eligible_for(self, priority: Priority) -> bool {
        match priority {
            Priority::High => self == EnergyTier::High,
            Priority::Medium => matches!(self, EnergyTier::High | EnergyTier::Medium),
            Priority::Low | Priority::Urgent => true,
        }
    }
}

/// Clock hours grouped by tier. Entries are matched by hour bucket, so
/// `"09:00"` covers 09:00 through 09:59.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnergyTable {
    #[serde(default)]
    pub high: Vec<ClockTime>,
    #[serde(default)]
    pub medium: Vec<ClockTime>,
    #[serde(default)]
    pub low: Vec<ClockTime>,
}

impl Default for EnergyTable {
    fn default() -> Self {
        let hours = |hs: &[u32]| hs.iter().filter_map(|h| ClockTime::new(*h, 0)).collect();
        Self {
            high: hours(&[8, 9, 10, 11]),
            medium: hours(&[12, 13, 14, 15]),
            low: hours(&[16, 17, 18, 19]),
        }
    }
}

impl EnergyTable {
    /// Check that no hour bucket is claimed by two tiers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let tiers = [
            (EnergyTier::High, &self.high),
            (EnergyTier::Medium, &self.medium),
            (EnergyTier::Low, &self.low),
        ];
        for (i, (tier_a, times_a)) in tiers.iter().enumerate() {
            for (tier_b, times_b) in &tiers[i + 1..] {
                let clash = times_a.iter().find_map(|a| {
                    times_b
                        .iter()
                        .find(|b| b.hour_bucket() == a.hour_bucket())
                        .map(|b| (a, b))
                });
                if let Some((a, b)) = clash {
                    return Err(ConfigError::invalid(
                        "energyLevels",
                        format!("{a} ({tier_a:?}) clashes with {b} ({tier_b:?})"),
                    ));
                }
            }
        }
        Ok(())
    }
}

/// Tier of `time` according to `table`. Hours not listed anywhere are low.
pub fn energy_tier(time: ClockTime, table: &EnergyTable) -> EnergyTier {
    let bucket = time.hour_bucket();
    let listed = |times: &[ClockTime]| times.iter().any(|t| t.hour_bucket() == bucket);

    if listed(&table.high) {
        EnergyTier::High
    } else if listed(&table.medium) {
        EnergyTier::Medium
    } else {
        EnergyTier::Low
    }
}
