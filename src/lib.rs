//! Tracklist Ranker - pairwise song ranking core
//!
//! This crate turns a stream of "A beats B" judgments into ELO scores and a
//! best-effort total order over a catalog of songs, and picks the pair to
//! compare next. Fetching, rendering and playback belong to the host.

pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod ranking;
pub mod rating;
pub mod types;
pub mod utils;

// Re-export commonly used types and traits
pub use error::{RankingError, Result};
pub use types::*;

// Re-export key components
pub use config::RankingConfig;
pub use history::{FileHistoryStore, HistoryStore, InMemoryHistoryStore, MatchHistory};
pub use ranking::RankingManager;
pub use rating::EloRatingModel;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
