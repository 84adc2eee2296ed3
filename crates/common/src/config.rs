//! Provider configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::{types::is_valid_account_id, Error, Result};

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ProviderConfig {
    /// Region all resources are created in
    pub region: String,

    /// ARN partition (aws, aws-cn, aws-us-gov)
    pub partition: String,

    /// Account id of the caller
    pub account_id: String,

    /// Store directory path (simulator database lives here)
    pub store_path: PathBuf,

    /// Operation timeouts and polling cadence
    pub timeouts: TimeoutsConfig,

    /// Retry of requests that fail while a dependency propagates
    pub propagation: PropagationConfig,

    /// Local cloud simulator behavior
    pub simulator: SimulatorConfig,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            region: "us-west-2".to_string(),
            partition: "aws".to_string(),
            account_id: "123456789012".to_string(),
            store_path: crate::default_store_path(),
            timeouts: TimeoutsConfig::default(),
            propagation: PropagationConfig::default(),
            simulator: SimulatorConfig::default(),
        }
    }
}

/// Timeouts applied to lifecycle polling
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeoutsConfig {
    pub create_secs: u64,
    pub update_secs: u64,
    pub delete_secs: u64,

    /// Fixed sleep between two describe calls
    pub poll_interval_ms: u64,

    /// Sleep before the first describe call
    pub delay_ms: u64,
}

impl Default for TimeoutsConfig {
    fn default() -> Self {
        Self {
            create_secs: 600,
            update_secs: 600,
            delete_secs: 600,
            poll_interval_ms: 5_000,
            delay_ms: 0,
        }
    }
}

impl TimeoutsConfig {
    pub fn create(&self) -> Duration {
        Duration::from_secs(self.create_secs)
    }

    pub fn update(&self) -> Duration {
        Duration::from_secs(self.update_secs)
    }

    pub fn delete(&self) -> Duration {
        Duration::from_secs(self.delete_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Bounded retry for eventual-consistency errors on single requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PropagationConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for PropagationConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_ms: 2_000,
        }
    }
}

impl PropagationConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Describe calls a freshly created or deleted record stays in its
    /// transitional status
    pub settle_polls: u32,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self { settle_polls: 1 }
    }
}

impl ProviderConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            return Err(Error::InvalidConfig("region must not be empty".to_string()));
        }
        if self.partition.is_empty() {
            return Err(Error::InvalidConfig("partition must not be empty".to_string()));
        }
        if !is_valid_account_id(&self.account_id) {
            return Err(Error::InvalidConfig(format!(
                "account_id must be 12 digits, got {:?}",
                self.account_id
            )));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "timeouts.poll_interval_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Get the simulator database path
    pub fn db_path(&self) -> PathBuf {
        self.store_path.join("cloud.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = ProviderConfig::load(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, ProviderConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = ProviderConfig::default();
        config.region = "eu-central-1".to_string();
        config.timeouts.poll_interval_ms = 250;
        config.save(&path).unwrap();

        let loaded = ProviderConfig::load(&path).unwrap();
        assert_eq!(loaded.region, "eu-central-1");
        assert_eq!(loaded.timeouts.poll_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "region = \"ap-south-1\"\n[timeouts]\ncreate_secs = 30\n").unwrap();

        let config = ProviderConfig::load(&path).unwrap();
        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.timeouts.create(), Duration::from_secs(30));
        assert_eq!(config.timeouts.delete_secs, 600);
        assert_eq!(config.partition, "aws");
    }

    #[test]
    fn test_rejects_bad_account() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "account_id = \"abc\"\n").unwrap();
        assert!(matches!(
            ProviderConfig::load(&path),
            Err(Error::InvalidConfig(_))
        ));
    }
}
