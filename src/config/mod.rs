//! Configuration management for a ranking session
//!
//! This module handles configuration loading from TOML files and environment
//! variables, validation, and default values.

pub mod app;
pub mod rating;

// Re-export commonly used types
pub use app::{validate_config, ExplorationSettings, HistorySettings, RankingConfig};
pub use rating::RatingSettings;
