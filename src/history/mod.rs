//! Match history and its persistence
//!
//! This module provides the capacity-bounded log of pairwise outcomes and the
//! storage interface it is persisted through.

pub mod log;
pub mod store;

// Re-export commonly used types
pub use log::{MatchHistory, DEFAULT_HISTORY_CAPACITY};
pub use store::{FileHistoryStore, HistoryStore, InMemoryHistoryStore};
