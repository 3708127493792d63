//! TOML-based planner configuration.
//!
//! Stores:
//! - Policy overrides applied on top of the built-in default policy
//! - Output preferences for the CLI
//!
//! Configuration is stored at `~/.config/taskplan/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, CoreError, Result};
use crate::policy::{PolicyOverrides, SchedulingPolicy};

/// Returns `~/.config/taskplan[-dev]/` based on TASKPLAN_ENV.
///
/// Set TASKPLAN_ENV=dev to use a development data directory.
pub fn data_dir() -> PathBuf {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("TASKPLAN_ENV").unwrap_or_else(|_| "production".to_string());

    if env == "dev" {
        base_dir.join("taskplan-dev")
    } else {
        base_dir.join("taskplan")
    }
}

/// CLI output preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Print schedules as JSON instead of a table.
    #[serde(default)]
    pub json: bool,
    /// Report tasks that could not be placed.
    #[serde(default = "default_true")]
    pub show_unplaced: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: false,
            show_unplaced: true,
        }
    }
}

/// Planner configuration.
///
/// Serialized to/from TOML at `~/.config/taskplan/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    #[serde(default)]
    pub policy: PolicyOverrides,
    #[serde(default)]
    pub output: OutputConfig,
}

impl PlannerConfig {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    /// Parse `value` into the JSON type of `existing`.
    fn coerce_like(existing: &serde_json::Value, key: &str, value: &str) -> Result<serde_json::Value> {
        let invalid = |message: String| ConfigError::invalid(key, message);

        let parsed = match existing {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse::<bool>()
                    .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
            ),
            serde_json::Value::Number(_) => {
                if let Ok(n) = value.parse::<u64>() {
                    serde_json::Value::Number(n.into())
                } else if let Ok(n) = value.parse::<f64>() {
                    serde_json::Number::from_f64(n)
                        .map(serde_json::Value::Number)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                } else {
                    return Err(invalid(format!("cannot parse '{value}' as number")).into());
                }
            }
            serde_json::Value::Object(_) | serde_json::Value::Array(_) => serde_json::from_str(value)?,
            _ => serde_json::Value::String(value.into()),
        };
        Ok(parsed)
    }

    /// Write `value` at `key`, creating intermediate objects.
    fn insert_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: serde_json::Value,
    ) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();
        let (leaf, parents) = parts
            .split_last()
            .ok_or_else(|| ConfigError::MissingKey("config key is empty".into()))?;

        let mut current = root;
        for part in parents {
            let obj = current
                .as_object_mut()
                .ok_or_else(|| ConfigError::invalid(key, "path does not name a table"))?;
            current = obj
                .entry(part.to_string())
                .or_insert_with(|| serde_json::Value::Object(Default::default()));
        }
        current
            .as_object_mut()
            .ok_or_else(|| ConfigError::invalid(key, "path does not name a table"))?
            .insert(leaf.to_string(), value);
        Ok(())
    }

    /// JSON view with the fully merged policy, used for key lookup.
    fn effective_view(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "policy": serde_json::to_value(self.effective_policy()?)?,
            "output": serde_json::to_value(&self.output)?,
        }))
    }

    /// Path of the config file.
    pub fn path() -> PathBuf {
        data_dir().join("config.toml")
    }

    /// Load from the default location, writing defaults when the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save()?;
            Ok(cfg)
        }
    }

    /// Load from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: PlannerConfig = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(cfg)
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default configuration");
            Self::default()
        })
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    /// Persist to an explicit path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Overwrite the config file with defaults.
    pub fn reset() -> Result<Self> {
        let cfg = Self::default();
        cfg.save()?;
        Ok(cfg)
    }

    /// Default policy merged with the configured overrides.
    pub fn effective_policy(&self) -> Result<SchedulingPolicy, ConfigError> {
        SchedulingPolicy::default().merged(&self.policy)
    }

    /// Get an effective config value as string by dot-separated key,
    /// e.g. `policy.maxTasksPerDay`.
    pub fn get(&self, key: &str) -> Option<String> {
        let view = self.effective_view().ok()?;
        match Self::get_json_value_by_path(&view, key)? {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// The key must name an existing setting. The value is parsed as the
    /// setting's current type and the resulting policy is validated.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let view = self.effective_view()?;
        let existing = Self::get_json_value_by_path(&view, key)
            .ok_or_else(|| CoreError::Custom(format!("unknown config key: {key}")))?;
        let new_value = Self::coerce_like(existing, key, value)?;

        let mut json = serde_json::to_value(&*self)?;
        Self::insert_json_value_by_path(&mut json, key, new_value)?;
        let updated: PlannerConfig = serde_json::from_value(json)?;
        updated.effective_policy()?;

        *self = updated;
        Ok(())
    }

    /// Set a value by key and save. Returns error if key is unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.set_value(key, value)?;
        self.save()
    }
}
