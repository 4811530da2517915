//! Merge-sort driven ordering pass
//!
//! Every pass sorts the full item list with a top-down merge sort. The fixed
//! split/merge structure means the same history and ratings always produce the
//! same comparisons in the same order, so the needed battles surfaced by a pass
//! are stable from one call to the next and can be used as a queue of pairs to
//! show.

use crate::ranking::oracle::Comparator;
use crate::types::{ItemId, ItemPair};
use crate::utils::ratio;

/// Outcome of one sort pass
#[derive(Debug, Clone, PartialEq)]
pub struct SortReport {
    /// Items in ranked order, best first
    pub simple_ranking: Vec<ItemId>,
    /// Number of comparator invocations
    pub total_comparisons: usize,
    /// Pairs ordered by guesswork, in the order they were first compared
    pub needed_battles: Vec<ItemPair>,
    /// Share of comparisons backed by history, in `[0, 1]`
    pub progress: f64,
}

impl SortReport {
    /// First pair that still needs a judgment
    pub fn next_battle(&self) -> Option<&ItemPair> {
        self.needed_battles.first()
    }

    /// Whether every comparison of the pass was backed by history
    pub fn is_resolved(&self) -> bool {
        self.needed_battles.is_empty()
    }
}

/// Runs full ordering passes over an item list
#[derive(Debug, Clone, Copy, Default)]
pub struct AdaptiveSortScheduler;

impl AdaptiveSortScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Sort `items` with `comparator` and report what was learned
    pub fn run<C: Comparator + ?Sized>(&self, items: &[ItemId], comparator: &C) -> SortReport {
        let mut pass = SortPass {
            comparator,
            total_comparisons: 0,
            needed_battles: Vec::new(),
        };
        let simple_ranking = pass.sort(items);

        // Fewer than two items means nothing to compare
        let progress = if items.len() < 2 || pass.total_comparisons == 0 {
            1.0
        } else {
            1.0 - ratio(pass.needed_battles.len(), pass.total_comparisons)
        };

        SortReport {
            simple_ranking,
            total_comparisons: pass.total_comparisons,
            needed_battles: pass.needed_battles,
            progress,
        }
    }
}

struct SortPass<'c, C: Comparator + ?Sized> {
    comparator: &'c C,
    total_comparisons: usize,
    needed_battles: Vec<ItemPair>,
}

impl<C: Comparator + ?Sized> SortPass<'_, C> {
    fn sort(&mut self, items: &[ItemId]) -> Vec<ItemId> {
        if items.len() <= 1 {
            return items.to_vec();
        }

        let middle = items.len() / 2;
        let left = self.sort(&items[..middle]);
        let right = self.sort(&items[middle..]);
        self.merge(left, right)
    }

    fn merge(&mut self, left: Vec<ItemId>, right: Vec<ItemId>) -> Vec<ItemId> {
        let mut merged = Vec::with_capacity(left.len() + right.len());
        let (mut i, mut j) = (0, 0);

        while i < left.len() && j < right.len() {
            let comparison = self.comparator.compare(&left[i], &right[j]);
            self.total_comparisons += 1;
            if let Some(pair) = comparison.needed_battle {
                self.needed_battles.push(pair);
            }

            // Ties keep the left run first
            if comparison.order <= 0 {
                merged.push(left[i].clone());
                i += 1;
            } else {
                merged.push(right[j].clone());
                j += 1;
            }
        }

        merged.extend_from_slice(&left[i..]);
        merged.extend_from_slice(&right[j..]);
        merged
    }
}
