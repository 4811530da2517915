//! ELO rating system integration
//!
//! This module maintains per-item ratings using the ELO implementation of the
//! skillratings crate.

pub mod elo;

// Re-export commonly used types
pub use elo::{EloRatingModel, RatingEntry, RatingUpdate};
