//! Configuration file support for gtg.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/gtg/config.toml`.

use crate::notify::DEFAULT_TITLE;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub workout: WorkoutConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl DataConfig {
    pub fn state_path(&self) -> PathBuf {
        self.data_dir.join("state.json")
    }

    pub fn jobs_path(&self) -> PathBuf {
        self.data_dir.join("jobs.json")
    }

    pub fn set_log_path(&self) -> PathBuf {
        self.data_dir.join("sets.wal")
    }
}

/// Bounds the setup form enforces on the rest period
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkoutConfig {
    #[serde(default = "default_min_rest_minutes")]
    pub min_rest_minutes: i32,

    #[serde(default = "default_max_rest_minutes")]
    pub max_rest_minutes: i32,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            min_rest_minutes: default_min_rest_minutes(),
            max_rest_minutes: default_max_rest_minutes(),
        }
    }
}

/// Reminder delivery settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Whether the user allows reminders to be posted
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            title: default_title(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("gtg")
}

fn default_min_rest_minutes() -> i32 {
    30
}

fn default_max_rest_minutes() -> i32 {
    120
}

fn default_enabled() -> bool {
    true
}

fn default_title() -> String {
    DEFAULT_TITLE.into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("gtg").join("config.toml")
    }

    /// Check cross-field constraints serde cannot express
    pub fn validate(&self) -> Result<()> {
        let workout = &self.workout;
        if workout.min_rest_minutes < 1 {
            return Err(Error::Config(format!(
                "min_rest_minutes must be at least 1, got {}",
                workout.min_rest_minutes
            )));
        }
        if workout.min_rest_minutes > workout.max_rest_minutes {
            return Err(Error::Config(format!(
                "min_rest_minutes ({}) exceeds max_rest_minutes ({})",
                workout.min_rest_minutes, workout.max_rest_minutes
            )));
        }
        Ok(())
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workout.min_rest_minutes, 30);
        assert_eq!(config.workout.max_rest_minutes, 120);
        assert!(config.notifications.enabled);
        assert_eq!(config.notifications.title, "Time for your next set!");
        assert!(config.data.data_dir.ends_with("gtg"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[notifications]
enabled = false
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert!(!config.notifications.enabled);
        assert_eq!(config.notifications.title, "Time for your next set!");
        assert_eq!(config.workout.max_rest_minutes, 120); // default
    }

    #[test]
    fn test_save_and_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.data.data_dir = temp_dir.path().join("data");
        config.workout.min_rest_minutes = 15;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.data.data_dir, temp_dir.path().join("data"));
        assert_eq!(loaded.workout.min_rest_minutes, 15);
        assert_eq!(loaded.data.state_path(), temp_dir.path().join("data/state.json"));
    }

    #[test]
    fn test_invalid_rest_bounds_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[workout]\nmin_rest_minutes = 90\nmax_rest_minutes = 60\n",
        )
        .unwrap();

        assert!(matches!(Config::load_from(&path), Err(Error::Config(_))));
    }
}
