use std::path::PathBuf;

use clap::Subcommand;
use taskplan_core::{PlannerConfig, PolicyOverrides};

#[derive(Subcommand)]
pub enum PolicyAction {
    /// Print the effective policy as JSON
    Show {
        /// Policy overrides file (JSON or .toml), applied over the config file
        #[arg(long)]
        policy: Option<PathBuf>,
    },
    /// Print the built-in default policy as JSON
    Defaults,
}

pub fn run(action: PolicyAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        PolicyAction::Show { policy } => {
            let config = PlannerConfig::load()?;
            let effective = super::effective_policy(&config, policy.as_deref(), &PolicyOverrides::default())?;
            println!("{}", serde_json::to_string_pretty(&effective)?);
        }
        PolicyAction::Defaults => {
            let defaults = taskplan_core::SchedulingPolicy::default();
            println!("{}", serde_json::to_string_pretty(&defaults)?);
        }
    }
    Ok(())
}
