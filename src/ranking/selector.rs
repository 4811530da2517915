//! Next-pair selection
//!
//! While the sort pass still has needed battles the first of them is shown.
//! Once history fully determines the order, exploration heuristics pick the
//! next pair. The gates run in a fixed sequence and each one may override the
//! previous pick:
//!
//! 1. with `mode_probability`, two items sharing the most common rating;
//! 2. with `random_pair_probability`, two uniformly random items;
//! 3. otherwise, the least-compared item against its closest-rated rival.

use crate::config::ExplorationSettings;
use crate::ranking::scheduler::SortReport;
use crate::rating::EloRatingModel;
use crate::types::{ItemId, ItemPair};
use crate::utils::rating_difference;
use rand::seq::IndexedRandom;
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

/// Heuristic that produced a pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectionStrategy {
    NeededBattle,
    SharedMode,
    Random,
    LeastCompared,
}

impl SelectionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionStrategy::NeededBattle => "needed_battle",
            SelectionStrategy::SharedMode => "shared_mode",
            SelectionStrategy::Random => "random",
            SelectionStrategy::LeastCompared => "least_compared",
        }
    }
}

impl std::fmt::Display for SelectionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pair to show next and how it was chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub pair: ItemPair,
    pub strategy: SelectionStrategy,
}

impl Selection {
    fn new(pair: ItemPair, strategy: SelectionStrategy) -> Self {
        Self { pair, strategy }
    }
}

/// Chooses the next pair from a sort report
#[derive(Debug, Clone, Default)]
pub struct PairSelector {
    settings: ExplorationSettings,
}

impl PairSelector {
    pub fn new(settings: ExplorationSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &ExplorationSettings {
        &self.settings
    }

    /// Pick the next pair, or `None` when fewer than two items exist
    pub fn select<R: Rng + ?Sized>(
        &self,
        report: &SortReport,
        items: &[ItemId],
        ratings: &EloRatingModel,
        rng: &mut R,
    ) -> Option<Selection> {
        if let Some(battle) = report.next_battle() {
            return Some(Selection::new(battle.clone(), SelectionStrategy::NeededBattle));
        }

        if items.len() < 2 {
            return None;
        }

        let mut selection = None;

        if rng.random_bool(self.settings.mode_probability) {
            if let Some(pair) = shared_mode_pair(items, ratings, rng) {
                selection = Some(Selection::new(pair, SelectionStrategy::SharedMode));
            }
        }

        let exploration = if rng.random_bool(self.settings.random_pair_probability) {
            random_pair(items, rng).map(|pair| Selection::new(pair, SelectionStrategy::Random))
        } else {
            least_compared_pair(items, ratings)
                .map(|pair| Selection::new(pair, SelectionStrategy::LeastCompared))
        };

        let selection = exploration.or(selection);
        if let Some(chosen) = &selection {
            debug!(
                "Selected {:?} vs {:?} by {}",
                chosen.pair.0, chosen.pair.1, chosen.strategy
            );
        }
        selection
    }
}

/// Most common rating among `items`; ties go to the first value encountered
pub fn mode_rating(items: &[ItemId], ratings: &EloRatingModel) -> Option<f64> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    let mut mode = None;
    let mut max_count = 0;

    for item in items {
        let rating = ratings.rating(item);
        let count = counts.entry(rating.to_bits()).or_insert(0);
        *count += 1;
        if *count > max_count {
            max_count = *count;
            mode = Some(rating);
        }
    }

    mode
}

/// Two random items that share the modal rating, if at least two do
pub fn shared_mode_pair<R: Rng + ?Sized>(
    items: &[ItemId],
    ratings: &EloRatingModel,
    rng: &mut R,
) -> Option<ItemPair> {
    let mode = mode_rating(items, ratings)?;
    let candidates: Vec<&ItemId> = items
        .iter()
        .filter(|item| ratings.rating(item).to_bits() == mode.to_bits())
        .collect();

    random_pair(&candidates, rng).map(|(a, b)| (a.clone(), b.clone()))
}

/// Two distinct items chosen uniformly at random
pub fn random_pair<T: Clone, R: Rng + ?Sized>(items: &[T], rng: &mut R) -> Option<(T, T)> {
    let mut chosen = items.choose_multiple(rng, 2);
    let a = chosen.next()?.clone();
    let b = chosen.next()?.clone();
    Some((a, b))
}

/// The least-compared item paired with the item whose rating is closest to it
pub fn least_compared_pair(items: &[ItemId], ratings: &EloRatingModel) -> Option<ItemPair> {
    let mut by_count: Vec<&ItemId> = items.iter().collect();
    by_count.sort_by_key(|item| ratings.comparison_count(item));

    let (least, rest) = by_count.split_first()?;
    let target = ratings.rating(least);
    let closest = rest.iter().min_by(|a, b| {
        rating_difference(ratings.rating(a), target)
            .total_cmp(&rating_difference(ratings.rating(b), target))
    })?;

    Some(((*least).clone(), (*closest).clone()))
}
