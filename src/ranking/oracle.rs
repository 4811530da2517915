//! History-first comparator
//!
//! The oracle decides the order of two items from their recorded match ups
//! and falls back to the ELO ratings when the pair has never been compared.
//! Falling back is reported in the result so the caller can collect the pairs
//! that still need a real judgment.

use crate::history::MatchHistory;
use crate::rating::EloRatingModel;
use crate::types::ItemPair;
use std::cmp::Ordering;

/// Result of comparing two items
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comparison {
    /// Negative when the first item ranks first, positive when the second does
    pub order: i64,
    /// Set when no history exists for the pair and the order is a guess
    pub needed_battle: Option<ItemPair>,
}

impl Comparison {
    /// An order backed by recorded history
    pub fn known(order: i64) -> Self {
        Self {
            order,
            needed_battle: None,
        }
    }

    /// A provisional order for a pair that still needs a judgment
    pub fn guessed(order: i64, a: &str, b: &str) -> Self {
        Self {
            order,
            needed_battle: Some((a.to_string(), b.to_string())),
        }
    }

    pub fn ordering(&self) -> Ordering {
        self.order.cmp(&0)
    }

    pub fn is_known(&self) -> bool {
        self.needed_battle.is_none()
    }
}

/// Ordering function used by the sort scheduler
pub trait Comparator {
    fn compare(&self, a: &str, b: &str) -> Comparison;
}

/// Comparator over the current history and ratings
#[derive(Debug, Clone, Copy)]
pub struct ComparisonOracle<'a> {
    history: &'a MatchHistory,
    ratings: &'a EloRatingModel,
}

impl<'a> ComparisonOracle<'a> {
    pub fn new(history: &'a MatchHistory, ratings: &'a EloRatingModel) -> Self {
        Self { history, ratings }
    }
}

impl Comparator for ComparisonOracle<'_> {
    fn compare(&self, a: &str, b: &str) -> Comparison {
        let battles = self.history.query(a, b);

        if battles.is_empty() {
            // Higher rating comes first
            let order = match self.ratings.rating(a).total_cmp(&self.ratings.rating(b)) {
                Ordering::Greater => -1,
                Ordering::Less => 1,
                Ordering::Equal => 0,
            };
            return Comparison::guessed(order, a, b);
        }

        let tally: i64 = battles
            .iter()
            .map(|battle| {
                if battle.winner == b {
                    1
                } else if battle.winner == a {
                    -1
                } else {
                    0
                }
            })
            .sum();

        Comparison::known(tally)
    }
}
