//! Configuration structures for the OHLCV EDA toolkit.

use crate::error::{Error, Result};
use crate::types::Frequency;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Rolling feature configuration.
    pub features: FeatureConfig,
    /// Resampling configuration.
    pub resample: ResampleConfig,
    /// Preprocessing configuration.
    pub preprocess: PreprocessConfig,
}

impl Config {
    /// Parse a configuration from a JSON string and validate it.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Check that all values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.features.window < 2 {
            return Err(Error::config(format!(
                "features.window must be at least 2, got {}",
                self.features.window
            )));
        }
        self.resample.frequency()?;
        Ok(())
    }
}

/// Rolling feature configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Trailing window length in returns.
    pub window: usize,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self { window: 30 }
    }
}

/// Resampling configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResampleConfig {
    /// Bucket frequency alias (e.g., "1H", "15min", "D").
    pub frequency: String,
}

impl ResampleConfig {
    /// Parsed frequency.
    pub fn frequency(&self) -> Result<Frequency> {
        self.frequency.parse()
    }
}

impl Default for ResampleConfig {
    fn default() -> Self {
        Self {
            frequency: "1H".to_string(),
        }
    }
}

/// Preprocessing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessConfig {
    /// Drop rows whose timestamp repeats an earlier row.
    pub dedupe_timestamps: bool,
}

impl Default for PreprocessConfig {
    fn default() -> Self {
        Self {
            dedupe_timestamps: true,
        }
    }
}
