//! Capacity-bounded match history
//!
//! The history is an append-only log of [`MatchUp`]s. When it grows past its
//! capacity the oldest entry is evicted. An index keyed by the unordered pair of
//! players keeps `query` proportional to the number of matches between those
//! two items instead of the length of the whole log.

use crate::error::{RankingError, Result};
use crate::history::store::HistoryStore;
use crate::types::{MatchUp, PairKey};
use std::collections::{HashMap, VecDeque};
use tracing::{debug, warn};

/// Default number of match ups kept
pub const DEFAULT_HISTORY_CAPACITY: usize = 30_000;

/// Append-only log of pairwise outcomes
#[derive(Debug, Clone)]
pub struct MatchHistory {
    entries: VecDeque<MatchUp>,
    /// Sequence numbers of the entries for each pair, oldest first
    index: HashMap<PairKey, VecDeque<u64>>,
    /// Sequence number of `entries[0]`
    first_seq: u64,
    capacity: usize,
}

impl Default for MatchHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl MatchHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            index: HashMap::new(),
            first_seq: 0,
            capacity: capacity.max(1),
        }
    }

    /// Build a history from entries in insertion order
    ///
    /// Only the newest `capacity` entries are kept.
    pub fn from_entries(entries: impl IntoIterator<Item = MatchUp>, capacity: usize) -> Self {
        let mut history = Self::new(capacity);
        for match_up in entries {
            history.append(match_up);
        }
        history
    }

    /// Add a match up to the end of the log, returning the evicted entry if
    /// the log was already full
    pub fn append(&mut self, match_up: MatchUp) -> Option<MatchUp> {
        let seq = self.first_seq + self.entries.len() as u64;
        self.index.entry(match_up.key()).or_default().push_back(seq);
        self.entries.push_back(match_up);

        if self.entries.len() > self.capacity {
            self.evict_oldest()
        } else {
            None
        }
    }

    fn evict_oldest(&mut self) -> Option<MatchUp> {
        let oldest = self.entries.pop_front()?;
        let key = oldest.key();
        if let Some(seqs) = self.index.get_mut(&key) {
            seqs.pop_front();
            if seqs.is_empty() {
                self.index.remove(&key);
            }
        }
        self.first_seq += 1;
        Some(oldest)
    }

    /// Every match up between `a` and `b`, in insertion order
    pub fn query(&self, a: &str, b: &str) -> Vec<&MatchUp> {
        self.index
            .get(&PairKey::new(a, b))
            .map(|seqs| {
                seqs.iter()
                    .filter_map(|seq| self.entries.get((seq - self.first_seq) as usize))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether `a` and `b` have ever been compared
    pub fn contains_pair(&self, a: &str, b: &str) -> bool {
        self.index.contains_key(&PairKey::new(a, b))
    }

    pub fn iter(&self) -> impl Iterator<Item = &MatchUp> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest entry still kept
    pub fn oldest(&self) -> Option<&MatchUp> {
        self.entries.front()
    }

    /// Load the full log stored under `key`
    ///
    /// A missing record is an empty history. A record that cannot be parsed,
    /// or that holds a malformed match up, is a `CorruptHistoryStore` error.
    pub fn load_all(store: &dyn HistoryStore, key: &str, capacity: usize) -> Result<Self> {
        let Some(raw) = store.load(key)? else {
            debug!("No stored history under '{}'", key);
            return Ok(Self::new(capacity));
        };

        let entries: Vec<MatchUp> =
            serde_json::from_str(&raw).map_err(|e| RankingError::CorruptHistoryStore {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        if let Some(position) = entries.iter().position(|m| !m.is_well_formed()) {
            return Err(RankingError::CorruptHistoryStore {
                key: key.to_string(),
                reason: format!("malformed match up at position {}", position),
            }
            .into());
        }

        if entries.len() > capacity {
            warn!(
                "Stored history under '{}' holds {} match ups, keeping the newest {}",
                key,
                entries.len(),
                capacity
            );
        }

        Ok(Self::from_entries(entries, capacity))
    }

    /// Write the full log under `key`
    pub fn persist(&self, store: &dyn HistoryStore, key: &str) -> Result<()> {
        let serialized = serde_json::to_string(&self.entries)?;
        store.save(key, &serialized)
    }
}
