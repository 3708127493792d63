use clap::Subcommand;
use taskplan_core::PlannerConfig;

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show the stored configuration as TOML
    Show,
    /// Get an effective config value
    Get {
        /// Config key (e.g. "policy.maxTasksPerDay", "output.json")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value (JSON for tables and lists)
        value: String,
    },
    /// Reset config to defaults
    Reset,
    /// Print the config file location
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show => {
            let config = PlannerConfig::load()?;
            print!("{}", toml::to_string_pretty(&config)?);
        }
        ConfigAction::Get { key } => {
            let config = PlannerConfig::load()?;
            match config.get(&key) {
                Some(value) => println!("{value}"),
                None => return Err(format!("unknown key: {key}").into()),
            }
        }
        ConfigAction::Set { key, value } => {
            let mut config = PlannerConfig::load()?;
            config.set(&key, &value)?;
            println!("ok");
        }
        ConfigAction::Reset => {
            PlannerConfig::reset()?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", PlannerConfig::path().display());
        }
    }
    Ok(())
}
