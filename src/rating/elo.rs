//! ELO rating model
//!
//! Keeps one rating and one comparison count per item and applies the ELO
//! update rule from the skillratings crate after every outcome.

use crate::config::RatingSettings;
use crate::types::ItemId;
use skillratings::elo::{elo, expected_score, EloConfig, EloRating};
use skillratings::Outcomes;
use std::collections::HashMap;

/// Rating state for a single item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingEntry {
    pub rating: EloRating,
    pub comparisons: u64,
}

impl RatingEntry {
    fn new(initial_rating: f64) -> Self {
        Self {
            rating: EloRating {
                rating: initial_rating,
            },
            comparisons: 0,
        }
    }
}

/// Change applied by a single outcome
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RatingUpdate {
    pub winner_before: f64,
    pub winner_after: f64,
    pub loser_before: f64,
    pub loser_after: f64,
}

impl RatingUpdate {
    /// Rating points moved from the loser to the winner
    pub fn delta(&self) -> f64 {
        self.winner_after - self.winner_before
    }
}

/// Ratings and comparison counts for every item seen in a session
#[derive(Debug, Clone)]
pub struct EloRatingModel {
    entries: HashMap<ItemId, RatingEntry>,
    config: EloConfig,
    initial_rating: f64,
}

impl Default for EloRatingModel {
    fn default() -> Self {
        Self::new(&RatingSettings::default())
    }
}

impl EloRatingModel {
    pub fn new(settings: &RatingSettings) -> Self {
        Self {
            entries: HashMap::new(),
            config: settings.elo_config(),
            initial_rating: settings.initial_rating,
        }
    }

    /// Rating an item starts with
    pub fn initial_rating(&self) -> f64 {
        self.initial_rating
    }

    /// Create the rating entry for an item if it does not exist yet
    pub fn ensure_item(&mut self, item: &str) {
        if !self.entries.contains_key(item) {
            self.entries
                .insert(item.to_string(), RatingEntry::new(self.initial_rating));
        }
    }

    /// Current rating, or the initial rating for an unseen item
    pub fn rating(&self, item: &str) -> f64 {
        self.entries
            .get(item)
            .map(|entry| entry.rating.rating)
            .unwrap_or(self.initial_rating)
    }

    /// Number of recorded match ups the item took part in
    pub fn comparison_count(&self, item: &str) -> u64 {
        self.entries
            .get(item)
            .map(|entry| entry.comparisons)
            .unwrap_or(0)
    }

    /// Probability that `a` beats `b`
    pub fn expected(&self, a: &str, b: &str) -> f64 {
        let (expected_a, _) = expected_score(&self.elo_rating(a), &self.elo_rating(b));
        expected_a
    }

    /// Apply one outcome
    pub fn record_outcome(&mut self, winner: &str, loser: &str) -> RatingUpdate {
        self.ensure_item(winner);
        self.ensure_item(loser);

        let winner_before = self.elo_rating(winner);
        let loser_before = self.elo_rating(loser);
        let (winner_after, loser_after) =
            elo(&winner_before, &loser_before, &Outcomes::WIN, &self.config);

        for (item, after) in [(winner, winner_after), (loser, loser_after)] {
            if let Some(entry) = self.entries.get_mut(item) {
                entry.rating = after;
                entry.comparisons += 1;
            }
        }

        RatingUpdate {
            winner_before: winner_before.rating,
            winner_after: winner_after.rating,
            loser_before: loser_before.rating,
            loser_after: loser_after.rating,
        }
    }

    /// Every known item with its rating
    pub fn scores(&self) -> HashMap<ItemId, f64> {
        self.entries
            .iter()
            .map(|(item, entry)| (item.clone(), entry.rating.rating))
            .collect()
    }

    /// The given items ordered by rating, best first
    ///
    /// Items with equal ratings keep their relative order.
    pub fn leaderboard(&self, items: &[ItemId]) -> Vec<(ItemId, f64)> {
        let mut board: Vec<(ItemId, f64)> = items
            .iter()
            .map(|item| (item.clone(), self.rating(item)))
            .collect();
        board.sort_by(|a, b| b.1.total_cmp(&a.1));
        board
    }

    pub fn get(&self, item: &str) -> Option<&RatingEntry> {
        self.entries.get(item)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn elo_rating(&self, item: &str) -> EloRating {
        EloRating {
            rating: self.rating(item),
        }
    }
}
