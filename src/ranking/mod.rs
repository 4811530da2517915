//! Ordering and next-pair selection
//!
//! This module combines the match history and the ELO ratings into a total
//! order over the catalog and decides which pair the user judges next.

pub mod manager;
pub mod oracle;
pub mod scheduler;
pub mod selector;

// Re-export commonly used types
pub use manager::RankingManager;
pub use oracle::{Comparator, Comparison, ComparisonOracle};
pub use scheduler::{AdaptiveSortScheduler, SortReport};
pub use selector::{PairSelector, Selection, SelectionStrategy};
