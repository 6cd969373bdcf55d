//! # Configuration Module
//!
//! Handles loading and validating configuration from TOML files.

use serde::Deserialize;
use serde::de::Error;
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub ble: BleConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub log: LogConfig,
}

/// BLE telemetry configuration
#[derive(Debug, Deserialize, Clone)]
pub struct BleConfig {
    /// Advertised device name to discover
    #[serde(default = "default_device_name")]
    pub device_name: String,

    /// Length of one full polling cycle in seconds
    #[serde(default = "default_poll_interval_s")]
    pub poll_interval_s: u64,

    /// Delay before each per-slot poll write in milliseconds
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
}

/// Profile store configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    #[serde(default = "default_profiles_path")]
    pub profiles_path: String,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    /// Directory for the rolling file log; empty disables file logging
    #[serde(default = "default_log_dir")]
    pub dir: String,
}

// Default value functions
fn default_device_name() -> String { "MC3000".to_string() }
fn default_poll_interval_s() -> u64 { 1 }
fn default_settle_ms() -> u64 { 100 }
fn default_profiles_path() -> String { "profiles.json".to_string() }
fn default_log_dir() -> String { String::new() }

impl Default for BleConfig {
    fn default() -> Self {
        Self {
            device_name: default_device_name(),
            poll_interval_s: default_poll_interval_s(),
            settle_ms: default_settle_ms(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { profiles_path: default_profiles_path() }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { dir: default_log_dir() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ble: BleConfig::default(),
            storage: StorageConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, TOML parsing fails, or
    /// validation fails.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the given file when it exists, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        if self.ble.device_name.is_empty() {
            return Err(crate::error::Mc3000Error::Config(
                toml::de::Error::custom("device_name cannot be empty")
            ));
        }

        if self.ble.poll_interval_s == 0 || self.ble.poll_interval_s > 3600 {
            return Err(crate::error::Mc3000Error::Config(
                toml::de::Error::custom("poll_interval_s must be between 1 and 3600")
            ));
        }

        if self.ble.settle_ms == 0 || self.ble.settle_ms > 10000 {
            return Err(crate::error::Mc3000Error::Config(
                toml::de::Error::custom("settle_ms must be between 1 and 10000")
            ));
        }

        // Four settle delays have to fit inside one polling cycle
        if self.ble.settle_ms * 4 >= self.ble.poll_interval_s * 1000 {
            return Err(crate::error::Mc3000Error::Config(
                toml::de::Error::custom("settle_ms is too large for poll_interval_s")
            ));
        }

        if self.storage.profiles_path.is_empty() {
            return Err(crate::error::Mc3000Error::Config(
                toml::de::Error::custom("profiles_path cannot be empty")
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_valid_config() -> Config {
        Config::default()
    }

    #[test]
    fn test_default_functions() {
        assert_eq!(default_device_name(), "MC3000");
        assert_eq!(default_poll_interval_s(), 1);
        assert_eq!(default_settle_ms(), 100);
        assert_eq!(default_profiles_path(), "profiles.json");
        assert_eq!(default_log_dir(), "");
    }

    #[test]
    fn test_defaults_validate() {
        assert!(create_valid_config().validate().is_ok());
    }

    #[test]
    fn test_empty_device_name() {
        let mut config = create_valid_config();
        config.ble.device_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_bounds() {
        let mut config = create_valid_config();
        config.ble.poll_interval_s = 0;
        assert!(config.validate().is_err());

        config.ble.poll_interval_s = 3601;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_settle_must_fit_in_cycle() {
        let mut config = create_valid_config();
        config.ble.poll_interval_s = 1;
        config.ble.settle_ms = 250;
        assert!(config.validate().is_err());

        config.ble.poll_interval_s = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_profiles_path() {
        let mut config = create_valid_config();
        config.storage.profiles_path = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[ble]\ndevice_name = \"MC3000\"\npoll_interval_s = 3\n\n[storage]\nprofiles_path = \"p.json\"\n"
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.ble.poll_interval_s, 3);
        assert_eq!(config.ble.settle_ms, 100); // default fills in
        assert_eq!(config.storage.profiles_path, "p.json");
    }

    #[test]
    fn test_load_rejects_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not toml at all [").unwrap();
        assert!(Config::load(file.path()).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("/nonexistent/config.toml").unwrap();
        assert_eq!(config.ble.device_name, "MC3000");
    }
}
