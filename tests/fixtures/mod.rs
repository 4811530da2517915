//! Test fixtures shared by the integration tests
#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::{Arc, Once};
use tracklist_ranker::{HistoryStore, InMemoryHistoryStore, RankingConfig, RankingManager};

static LOGGING: Once = Once::new();

/// Install a test subscriber once, filtered by `RUST_LOG`
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Song titles used as a small catalog
pub const SONGS: [&str; 8] = [
    "Cruel Summer",
    "All Too Well",
    "Cornelia Street",
    "Style",
    "Delicate",
    "Clean",
    "Mirrorball",
    "Enchanted",
];

pub fn catalog(size: usize) -> Vec<String> {
    (0..size).map(|i| format!("song-{:03}", i)).collect()
}

/// A manager over `items` with a fixed seed
pub fn seeded_manager(
    items: &[String],
    store: Arc<dyn HistoryStore>,
    config: RankingConfig,
) -> RankingManager<StdRng> {
    init_test_logging();
    RankingManager::with_rng(
        items.to_vec(),
        store,
        config,
        StdRng::seed_from_u64(2024),
    )
    .expect("Failed to create ranking manager")
}

/// A manager with default config and a fresh in-memory store
pub fn fresh_manager(items: &[&str]) -> (RankingManager<StdRng>, Arc<InMemoryHistoryStore>) {
    let store = Arc::new(InMemoryHistoryStore::new());
    let items: Vec<String> = items.iter().map(|s| s.to_string()).collect();
    let manager = seeded_manager(&items, store.clone(), RankingConfig::default());
    (manager, store)
}

/// Judge that prefers items earlier in its hidden order
pub struct HiddenOrderJudge {
    order: Vec<String>,
}

impl HiddenOrderJudge {
    pub fn new(order: &[String]) -> Self {
        Self {
            order: order.to_vec(),
        }
    }

    fn position(&self, item: &str) -> usize {
        self.order
            .iter()
            .position(|candidate| candidate == item)
            .unwrap_or(usize::MAX)
    }

    /// Returns `(winner, loser)` for the pair
    pub fn judge(&self, a: &str, b: &str) -> (String, String) {
        if self.position(a) <= self.position(b) {
            (a.to_string(), b.to_string())
        } else {
            (b.to_string(), a.to_string())
        }
    }
}

/// Scratch directory removed when dropped
pub struct ScratchDir {
    path: PathBuf,
}

impl ScratchDir {
    pub fn new(name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "tracklist-ranker-{}-{}",
            name,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&path);
        Self { path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}
