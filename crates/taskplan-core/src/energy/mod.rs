//! Energy tiers.
//!
//! The policy classifies clock hours into three tiers of suitability for
//! demanding work. The slot finder uses the tier both as a hard eligibility
//! filter and as a scoring input.

mod tier;

pub use tier::{energy_tier, EnergyTable, EnergyTier};
