//! Common types used throughout the ranking core

use serde::{Deserialize, Serialize};

/// Unique identifier for a ranked item (a song)
pub type ItemId = String;

/// Two items shown side by side, in display order
pub type ItemPair = (ItemId, ItemId);

/// One recorded pairwise outcome
///
/// Serialized as `{"players": [a, b], "winner": w}`, which is the persisted
/// history layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchUp {
    pub players: [ItemId; 2],
    pub winner: ItemId,
}

impl MatchUp {
    /// Create a match up where `winner` beat `loser`
    pub fn new(winner: impl Into<ItemId>, loser: impl Into<ItemId>) -> Self {
        let winner = winner.into();
        Self {
            players: [winner.clone(), loser.into()],
            winner,
        }
    }

    /// The player that did not win, if the winner is one of the players
    pub fn loser(&self) -> Option<&ItemId> {
        let [a, b] = &self.players;
        if *a == self.winner {
            Some(b)
        } else if *b == self.winner {
            Some(a)
        } else {
            None
        }
    }

    /// Order-independent key of the two players
    pub fn key(&self) -> PairKey {
        let [a, b] = &self.players;
        PairKey::new(a, b)
    }

    /// Check that the winner is one of two distinct players
    pub fn is_well_formed(&self) -> bool {
        self.players[0] != self.players[1] && self.loser().is_some()
    }
}

/// Unordered pair of item identifiers, used to index history
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PairKey(ItemId, ItemId);

impl PairKey {
    pub fn new(a: &str, b: &str) -> Self {
        if a <= b {
            Self(a.to_string(), b.to_string())
        } else {
            Self(b.to_string(), a.to_string())
        }
    }
}

/// Observable state of a ranking session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankingState {
    /// Fewer than two items are known, so there is nothing to compare
    AwaitingPair,
    /// A next pair is available
    HasPair,
}

impl std::fmt::Display for RankingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RankingState::AwaitingPair => write!(f, "AwaitingPair"),
            RankingState::HasPair => write!(f, "HasPair"),
        }
    }
}
