//! Main ranking configuration
//!
//! This module defines the configuration structures for a ranking session,
//! including TOML file loading, environment variable overrides and validation.

use crate::config::rating::RatingSettings;
use crate::error::RankingError;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

/// Main ranking configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub history: HistorySettings,
    pub rating: RatingSettings,
    pub exploration: ExplorationSettings,
}

/// Match history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of match ups kept; the oldest are evicted first
    pub capacity: usize,
    /// Key the history is stored under
    pub storage_key: String,
    /// Replace an unreadable stored history with an empty one instead of failing
    pub discard_corrupt: bool,
}

/// Next-pair exploration settings, used once the order is fully resolved
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExplorationSettings {
    /// Chance of pairing two items that share the most common rating
    pub mode_probability: f64,
    /// Chance of a uniformly random pair; otherwise least-compared vs closest rating
    pub random_pair_probability: f64,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: 30_000,
            storage_key: "matchUps".to_string(),
            discard_corrupt: false,
        }
    }
}

impl Default for ExplorationSettings {
    fn default() -> Self {
        Self {
            mode_probability: 0.8,
            random_pair_probability: 0.5,
        }
    }
}

impl RankingConfig {
    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a TOML file, then apply environment overrides
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config = Self::from_toml_str(&contents)?;
        config.apply_env()?;
        validate_config(&config)?;
        Ok(config)
    }

    /// Parse configuration from TOML text; missing sections use defaults
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents).map_err(|e| {
            RankingError::ConfigurationError {
                message: format!("Invalid TOML configuration: {}", e),
            }
        })?;
        validate_config(&config)?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<()> {
        // History settings
        if let Ok(capacity) = env::var("RANKING_HISTORY_CAPACITY") {
            self.history.capacity = capacity
                .parse()
                .map_err(|_| anyhow!("Invalid RANKING_HISTORY_CAPACITY value: {}", capacity))?;
        }
        if let Ok(key) = env::var("RANKING_STORAGE_KEY") {
            self.history.storage_key = key;
        }
        if let Ok(discard) = env::var("RANKING_DISCARD_CORRUPT_HISTORY") {
            self.history.discard_corrupt = discard.parse().map_err(|_| {
                anyhow!("Invalid RANKING_DISCARD_CORRUPT_HISTORY value: {}", discard)
            })?;
        }

        // Rating settings
        if let Ok(k) = env::var("RANKING_K_FACTOR") {
            self.rating.k_factor = k
                .parse()
                .map_err(|_| anyhow!("Invalid RANKING_K_FACTOR value: {}", k))?;
        }
        if let Ok(initial) = env::var("RANKING_INITIAL_RATING") {
            self.rating.initial_rating = initial
                .parse()
                .map_err(|_| anyhow!("Invalid RANKING_INITIAL_RATING value: {}", initial))?;
        }

        // Exploration settings
        if let Ok(p) = env::var("RANKING_MODE_PROBABILITY") {
            self.exploration.mode_probability = p
                .parse()
                .map_err(|_| anyhow!("Invalid RANKING_MODE_PROBABILITY value: {}", p))?;
        }
        if let Ok(p) = env::var("RANKING_RANDOM_PAIR_PROBABILITY") {
            self.exploration.random_pair_probability = p
                .parse()
                .map_err(|_| anyhow!("Invalid RANKING_RANDOM_PAIR_PROBABILITY value: {}", p))?;
        }

        Ok(())
    }
}

fn config_error(message: &str) -> anyhow::Error {
    RankingError::ConfigurationError {
        message: message.to_string(),
    }
    .into()
}

fn is_probability(p: f64) -> bool {
    (0.0..=1.0).contains(&p)
}

/// Validate configuration values
pub fn validate_config(config: &RankingConfig) -> Result<()> {
    if config.history.capacity == 0 {
        return Err(config_error("History capacity must be greater than 0"));
    }
    if config.history.storage_key.is_empty() {
        return Err(config_error("History storage key cannot be empty"));
    }

    config.rating.validate()?;

    if !is_probability(config.exploration.mode_probability) {
        return Err(config_error("Mode probability must be within [0, 1]"));
    }
    if !is_probability(config.exploration.random_pair_probability) {
        return Err(config_error("Random pair probability must be within [0, 1]"));
    }

    Ok(())
}
