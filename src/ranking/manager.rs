//! Ranking session facade
//!
//! The [`RankingManager`] owns the ratings, the match history and the history
//! store for one session. It replays stored history on construction, records
//! every judgment reported through [`RankingManager::select_item`], persists the
//! history and recomputes the ranking and the next pair.

use crate::config::RankingConfig;
use crate::error::{RankingError, Result};
use crate::history::{HistoryStore, MatchHistory};
use crate::metrics::MetricsCollector;
use crate::ranking::oracle::ComparisonOracle;
use crate::ranking::scheduler::{AdaptiveSortScheduler, SortReport};
use crate::ranking::selector::{PairSelector, Selection};
use crate::rating::EloRatingModel;
use crate::types::{ItemId, ItemPair, MatchUp, RankingState};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// One ranking session over a fixed catalog of items
pub struct RankingManager<R: Rng = StdRng> {
    /// Catalog in the order it was supplied
    items: Vec<ItemId>,
    known: HashSet<ItemId>,
    ratings: EloRatingModel,
    history: MatchHistory,
    store: Arc<dyn HistoryStore>,
    config: RankingConfig,
    scheduler: AdaptiveSortScheduler,
    selector: PairSelector,
    rng: R,
    metrics: Arc<MetricsCollector>,
    /// Latest sort pass
    report: SortReport,
    /// Pair to show next
    next: Option<Selection>,
}

impl RankingManager<StdRng> {
    /// Create a session with an entropy-seeded random source
    pub fn new<I, S>(items: I, store: Arc<dyn HistoryStore>, config: RankingConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        let rng = StdRng::try_from_os_rng().map_err(|e| RankingError::RandomSourceError {
            message: e.to_string(),
        })?;
        Self::with_rng(items, store, config, rng)
    }
}

impl<R: Rng> RankingManager<R> {
    /// Create a session with a caller-provided random source
    pub fn with_rng<I, S>(
        items: I,
        store: Arc<dyn HistoryStore>,
        config: RankingConfig,
        rng: R,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        let metrics = Arc::new(MetricsCollector::new()?);
        Self::with_metrics(items, store, config, rng, metrics)
    }

    /// Create a session that records into an existing metrics collector
    pub fn with_metrics<I, S>(
        items: I,
        store: Arc<dyn HistoryStore>,
        config: RankingConfig,
        rng: R,
        metrics: Arc<MetricsCollector>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<ItemId>,
    {
        crate::config::validate_config(&config)?;

        let items: Vec<ItemId> = items.into_iter().map(Into::into).collect();
        let mut known = HashSet::with_capacity(items.len());
        for item in &items {
            if !known.insert(item.clone()) {
                return Err(RankingError::DuplicateItem {
                    item_id: item.clone(),
                }
                .into());
            }
        }

        let history = Self::load_history(store.as_ref(), &config)?;
        metrics.record_history_loaded(history.len());

        let mut ratings = EloRatingModel::new(&config.rating);
        for match_up in history.iter() {
            if let Some(loser) = match_up.loser() {
                ratings.record_outcome(&match_up.winner, loser);
            }
        }
        for item in &items {
            ratings.ensure_item(item);
        }

        info!(
            "Ranking session started with {} items, replayed {} match ups",
            items.len(),
            history.len()
        );

        let mut manager = Self {
            items,
            known,
            ratings,
            history,
            store,
            scheduler: AdaptiveSortScheduler::new(),
            selector: PairSelector::new(config.exploration.clone()),
            config,
            rng,
            metrics,
            report: SortReport {
                simple_ranking: Vec::new(),
                total_comparisons: 0,
                needed_battles: Vec::new(),
                progress: 1.0,
            },
            next: None,
        };
        manager.refresh();

        Ok(manager)
    }

    fn load_history(store: &dyn HistoryStore, config: &RankingConfig) -> Result<MatchHistory> {
        let key = &config.history.storage_key;
        let capacity = config.history.capacity;

        match MatchHistory::load_all(store, key, capacity) {
            Ok(history) => Ok(history),
            Err(e) if config.history.discard_corrupt && is_corrupt(&e) => {
                warn!("Discarding stored history: {}", e);
                Ok(MatchHistory::new(capacity))
            }
            Err(e) => Err(e),
        }
    }

    /// Record that `winner` beat `loser`
    ///
    /// Both items must be in the catalog and distinct; otherwise nothing
    /// changes and `InvalidSelection` is returned. A failed history write is
    /// returned after the in-memory state has been updated.
    pub fn select_item(&mut self, winner: &str, loser: &str) -> Result<()> {
        if winner == loser {
            return Err(RankingError::InvalidSelection {
                reason: format!("'{}' cannot be compared against itself", winner),
            }
            .into());
        }
        for item in [winner, loser] {
            if !self.known.contains(item) {
                return Err(RankingError::InvalidSelection {
                    reason: format!("'{}' is not in the catalog", item),
                }
                .into());
            }
        }

        let update = self.ratings.record_outcome(winner, loser);
        debug!(
            "{} beat {}: {:.2} -> {:.2}, {:.2} -> {:.2}",
            winner,
            loser,
            update.winner_before,
            update.winner_after,
            update.loser_before,
            update.loser_after
        );

        let evicted = self.history.append(MatchUp::new(winner, loser));
        self.metrics.record_match_up(evicted.is_some(), self.history.len());

        let persisted = self
            .history
            .persist(self.store.as_ref(), &self.config.history.storage_key);
        if let Err(e) = &persisted {
            error!("Failed to persist match history: {}", e);
            self.metrics.record_persist_error();
        }

        self.refresh();
        persisted
    }

    /// Re-run the sort pass and choose the next pair
    fn refresh(&mut self) {
        let timer = self.metrics.start_timer();
        let oracle = ComparisonOracle::new(&self.history, &self.ratings);
        let report = self.scheduler.run(&self.items, &oracle);
        self.metrics.record_sort_pass(&report, timer.stop());

        debug!(
            "Sort pass: {} comparisons, {} needed battles, progress {:.3}",
            report.total_comparisons,
            report.needed_battles.len(),
            report.progress
        );

        let next = self
            .selector
            .select(&report, &self.items, &self.ratings, &mut self.rng);
        if let Some(selection) = &next {
            self.metrics.record_selection(selection.strategy);
        }

        self.report = report;
        self.next = next;
    }

    /// Pair to show next, `None` while awaiting a second item
    pub fn next_pair(&self) -> Option<&ItemPair> {
        self.next.as_ref().map(|selection| &selection.pair)
    }

    /// Next pair together with the heuristic that chose it
    pub fn next_selection(&self) -> Option<&Selection> {
        self.next.as_ref()
    }

    pub fn state(&self) -> RankingState {
        if self.next.is_some() {
            RankingState::HasPair
        } else {
            RankingState::AwaitingPair
        }
    }

    /// Rating of every known item
    pub fn scores(&self) -> HashMap<ItemId, f64> {
        self.ratings.scores()
    }

    pub fn score(&self, item: &str) -> f64 {
        self.ratings.rating(item)
    }

    /// Catalog in merge-sort order, best first
    pub fn simple_ranking(&self) -> &[ItemId] {
        &self.report.simple_ranking
    }

    /// Share of the latest sort pass backed by history, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        self.report.progress
    }

    pub fn needed_battles(&self) -> &[ItemPair] {
        &self.report.needed_battles
    }

    pub fn report(&self) -> &SortReport {
        &self.report
    }

    /// Catalog ordered by rating, best first
    pub fn leaderboard(&self) -> Vec<(ItemId, f64)> {
        self.ratings.leaderboard(&self.items)
    }

    pub fn comparison_count(&self, item: &str) -> u64 {
        self.ratings.comparison_count(item)
    }

    pub fn history(&self) -> &MatchHistory {
        &self.history
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn config(&self) -> &RankingConfig {
        &self.config
    }

    pub fn metrics(&self) -> Arc<MetricsCollector> {
        self.metrics.clone()
    }
}

fn is_corrupt(error: &anyhow::Error) -> bool {
    matches!(
        error.downcast_ref::<RankingError>(),
        Some(RankingError::CorruptHistoryStore { .. })
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::store::{InMemoryHistoryStore, MockHistoryStore};
    use crate::ranking::selector::SelectionStrategy;

    fn seeded(
        items: &[&str],
        store: Arc<dyn HistoryStore>,
        config: RankingConfig,
    ) -> Result<RankingManager<StdRng>> {
        RankingManager::with_rng(
            items.iter().copied(),
            store,
            config,
            StdRng::seed_from_u64(17),
        )
    }

    fn pair(a: &str, b: &str) -> ItemPair {
        (a.to_string(), b.to_string())
    }

    #[test]
    fn test_awaiting_pair_with_fewer_than_two_items() {
        for items in [&[][..], &["A"][..]] {
            let store = Arc::new(InMemoryHistoryStore::new());
            let manager = seeded(items, store, RankingConfig::default()).unwrap();

            assert_eq!(manager.state(), RankingState::AwaitingPair);
            assert!(manager.next_pair().is_none());
            assert_eq!(manager.progress(), 1.0);
            assert_eq!(manager.simple_ranking().len(), items.len());
        }
    }

    #[test]
    fn test_fresh_session_starts_with_needed_battle() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let manager = seeded(&["A", "B", "C"], store, RankingConfig::default()).unwrap();

        assert_eq!(manager.state(), RankingState::HasPair);
        assert_eq!(manager.next_pair(), Some(&pair("B", "C")));
        assert_eq!(
            manager.next_selection().map(|s| s.strategy),
            Some(SelectionStrategy::NeededBattle)
        );
        assert!(manager.progress() < 1.0);
        assert_eq!(manager.scores().len(), 3);
    }

    #[test]
    fn test_entropy_seeded_session_starts() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let manager =
            RankingManager::new(["A", "B", "C"], store, RankingConfig::default()).unwrap();

        assert_eq!(manager.state(), RankingState::HasPair);
        assert_eq!(manager.next_pair(), Some(&pair("B", "C")));
    }

    #[test]
    fn test_random_source_error_message() {
        let err: anyhow::Error = RankingError::RandomSourceError {
            message: "no entropy".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Random source unavailable: no entropy");
    }

    #[test]
    fn test_duplicate_items_are_rejected() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let err = seeded(&["A", "B", "A"], store, RankingConfig::default())
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<RankingError>(),
            Some(RankingError::DuplicateItem { item_id }) if item_id == "A"
        ));
    }

    #[test]
    fn test_invalid_selection_mutates_nothing() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let mut manager = seeded(&["A", "B"], store.clone(), RankingConfig::default()).unwrap();

        for (winner, loser) in [("A", "A"), ("A", "Z"), ("Z", "B")] {
            let err = manager.select_item(winner, loser).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<RankingError>(),
                Some(RankingError::InvalidSelection { .. })
            ));
        }

        assert!(manager.history().is_empty());
        assert_eq!(manager.score("A"), 1000.0);
        assert_eq!(manager.comparison_count("A"), 0);
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_every_selection_is_persisted() {
        let mut store = MockHistoryStore::new();
        store.expect_load().times(1).returning(|_| Ok(None));
        store
            .expect_save()
            .times(2)
            .withf(|key, _| key.to_string() == "matchUps")
            .returning(|_, _| Ok(()));

        let mut manager = seeded(&["A", "B"], Arc::new(store), RankingConfig::default()).unwrap();
        manager.select_item("A", "B").unwrap();
        manager.select_item("B", "A").unwrap();
    }

    #[test]
    fn test_persist_failure_is_reported_after_update() {
        let mut store = MockHistoryStore::new();
        store.expect_load().returning(|_| Ok(None));
        store
            .expect_save()
            .returning(|_, _| Err(anyhow::anyhow!("disk full")));

        let mut manager = seeded(&["A", "B"], Arc::new(store), RankingConfig::default()).unwrap();
        let err = manager.select_item("A", "B").unwrap_err();

        assert!(err.to_string().contains("disk full"));
        assert_eq!(manager.history().len(), 1);
        assert_eq!(manager.score("A"), 1016.0);
        assert_eq!(manager.progress(), 1.0);
        assert_eq!(
            manager
                .metrics()
                .history()
                .persist_errors_total
                .get(),
            1
        );
    }

    #[test]
    fn test_load_failure_propagates() {
        let mut store = MockHistoryStore::new();
        store
            .expect_load()
            .returning(|_| Err(anyhow::anyhow!("permission denied")));

        let result = seeded(&["A", "B"], Arc::new(store), RankingConfig::default());
        assert!(result.is_err());
    }

    #[test]
    fn test_corrupt_history_is_fatal_by_default() {
        let store = Arc::new(InMemoryHistoryStore::with_record("matchUps", "[{"));
        let err = seeded(&["A", "B"], store, RankingConfig::default())
            .err()
            .unwrap();
        assert!(is_corrupt(&err));
    }

    #[test]
    fn test_corrupt_history_can_be_discarded() {
        let store = Arc::new(InMemoryHistoryStore::with_record("matchUps", "[{"));
        let mut config = RankingConfig::default();
        config.history.discard_corrupt = true;

        let manager = seeded(&["A", "B"], store, config).unwrap();
        assert!(manager.history().is_empty());
        assert_eq!(manager.next_pair(), Some(&pair("A", "B")));
    }

    #[test]
    fn test_replay_restores_ratings() {
        let store = Arc::new(InMemoryHistoryStore::new());
        {
            let mut manager =
                seeded(&["A", "B", "C"], store.clone(), RankingConfig::default()).unwrap();
            manager.select_item("A", "B").unwrap();
            manager.select_item("C", "A").unwrap();
        }

        let original = {
            let mut ratings = EloRatingModel::default();
            ratings.record_outcome("A", "B");
            ratings.record_outcome("C", "A");
            ratings
        };

        let restored = seeded(&["A", "B", "C"], store, RankingConfig::default()).unwrap();
        assert_eq!(restored.history().len(), 2);
        for item in ["A", "B", "C"] {
            assert_eq!(restored.score(item), original.rating(item));
            assert_eq!(restored.comparison_count(item), original.comparison_count(item));
        }
    }

    #[test]
    fn test_history_only_items_get_scores() {
        let store = Arc::new(InMemoryHistoryStore::with_record(
            "matchUps",
            r#"[{"players":["Old Song","A"],"winner":"Old Song"}]"#,
        ));
        let mut manager = seeded(&["A", "B"], store, RankingConfig::default()).unwrap();

        assert_eq!(manager.scores().get("Old Song"), Some(&1016.0));
        assert_eq!(manager.simple_ranking().len(), 2);

        // Items outside the catalog cannot be selected
        assert!(manager.select_item("Old Song", "B").is_err());
    }

    #[test]
    fn test_custom_storage_key() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let mut config = RankingConfig::default();
        config.history.storage_key = "session-2".to_string();

        let mut manager = seeded(&["A", "B"], store.clone(), config).unwrap();
        manager.select_item("B", "A").unwrap();

        assert!(store.get("matchUps").is_none());
        assert!(store.get("session-2").unwrap().contains("\"winner\":\"B\""));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let store = Arc::new(InMemoryHistoryStore::new());
        let mut config = RankingConfig::default();
        config.exploration.mode_probability = 2.0;
        assert!(seeded(&["A", "B"], store, config).is_err());
    }
}
