//! Configuration management for occupancy.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::loader::DEFAULT_DELIMITER;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "occupancy";

/// Default records file name.
const RECORDS_FILE_NAME: &str = "occupancies.csv";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `OCCUPANCY_`)
/// 2. TOML config file at `~/.config/occupancy/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Record source configuration.
    pub data: DataConfig,
    /// Synthetic generator configuration.
    pub generator: GeneratorConfig,
    /// Output configuration.
    pub output: OutputConfig,
}

/// Record source configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Path to the records file.
    /// Defaults to `~/.local/share/occupancy/occupancies.csv`
    pub records_path: Option<PathBuf>,
    /// Field delimiter used in the records file.
    pub delimiter: char,
}

/// Synthetic generator configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Number of records to generate.
    pub count: usize,
    /// Year the generated departures fall in.
    pub year: i32,
    /// Seed for reproducible output. Random when unset.
    pub seed: Option<u64>,
}

/// Output configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Format used to print query results.
    pub format: OutputFormat,
}

/// How query results are printed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Plain,
    /// Pretty-printed JSON.
    Json,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            records_path: None, // Will be resolved to default at runtime
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            count: 100,
            year: 2024,
            seed: None,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `OCCUPANCY_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("OCCUPANCY_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.generator.count == 0 {
            return Err(Error::ConfigValidation {
                message: "generator.count must be greater than 0".to_string(),
            });
        }

        if !(1..=9999).contains(&self.generator.year) {
            return Err(Error::ConfigValidation {
                message: format!(
                    "generator.year ({}) must be between 1 and 9999",
                    self.generator.year
                ),
            });
        }

        let delimiter = self.data.delimiter;
        if delimiter.is_alphanumeric()
            || (delimiter.is_whitespace() && delimiter != '\t')
            || matches!(delimiter, '-' | ':' | '.' | '#')
        {
            return Err(Error::ConfigValidation {
                message: format!("data.delimiter {delimiter:?} clashes with record field contents"),
            });
        }

        Ok(())
    }

    /// Get the records path, resolving defaults if not set.
    #[must_use]
    pub fn records_path(&self) -> PathBuf {
        self.data
            .records_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(RECORDS_FILE_NAME))
    }
}
