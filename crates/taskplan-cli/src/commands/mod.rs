pub mod completions;
pub mod config;
pub mod policy;
pub mod schedule;

use std::error::Error;
use std::path::Path;

use taskplan_core::{PlannerConfig, PolicyOverrides, SchedulingPolicy};

/// Read policy overrides from a `.toml` or JSON file.
pub(crate) fn read_overrides(path: &Path) -> Result<PolicyOverrides, Box<dyn Error>> {
    let content =
        std::fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let overrides = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(overrides)
}

/// Config-file overrides, then `policy_file`, then `flags`.
pub(crate) fn layered_overrides(
    config: &PlannerConfig,
    policy_file: Option<&Path>,
    flags: &PolicyOverrides,
) -> Result<PolicyOverrides, Box<dyn Error>> {
    let mut layered = config.policy.clone();
    if let Some(path) = policy_file {
        layered = layered.overlay(&read_overrides(path)?);
    }
    Ok(layered.overlay(flags))
}

/// Effective policy for the given layers.
pub(crate) fn effective_policy(
    config: &PlannerConfig,
    policy_file: Option<&Path>,
    flags: &PolicyOverrides,
) -> Result<SchedulingPolicy, Box<dyn Error>> {
    let overrides = layered_overrides(config, policy_file, flags)?;
    tracing::debug!(?overrides, "merging policy overrides");
    Ok(SchedulingPolicy::default().merged(&overrides)?)
}
