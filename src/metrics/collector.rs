//! Metrics collection using Prometheus
//!
//! This module records what a ranking session is doing: how many match ups
//! were recorded, how much of the order is backed by history, and which
//! heuristics choose the pairs that are shown.

use crate::ranking::scheduler::SortReport;
use crate::ranking::selector::SelectionStrategy;
use anyhow::Result;
use prometheus::{
    Gauge, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Metrics collector for a ranking session
#[derive(Clone)]
pub struct MetricsCollector {
    /// Prometheus registry
    registry: Arc<Registry>,

    /// Match history metrics
    history_metrics: HistoryMetrics,

    /// Sort pass metrics
    sort_metrics: SortMetrics,

    /// Pair selection metrics
    selection_metrics: SelectionMetrics,
}

/// Match history metrics
#[derive(Clone)]
pub struct HistoryMetrics {
    /// Total match ups recorded by `select_item`
    pub match_ups_recorded_total: IntCounter,

    /// Total match ups evicted by the capacity limit
    pub match_ups_evicted_total: IntCounter,

    /// Match ups currently kept
    pub history_size: IntGauge,

    /// Failed history writes
    pub persist_errors_total: IntCounter,
}

/// Sort pass metrics
#[derive(Clone)]
pub struct SortMetrics {
    /// Pairs of the latest pass that were ordered by guesswork
    pub needed_battles: IntGauge,

    /// Share of the latest pass backed by history (0.0 to 1.0)
    pub progress: Gauge,

    /// Comparator invocations of the latest pass
    pub comparisons: IntGauge,

    /// Sort pass duration
    pub sort_duration_seconds: Histogram,
}

/// Pair selection metrics
#[derive(Clone)]
pub struct SelectionMetrics {
    /// Pairs chosen, by strategy
    pub selections_total: IntCounterVec,
}

impl MetricsCollector {
    /// Create a new metrics collector with its own registry
    pub fn new() -> Result<Self> {
        let registry = Arc::new(Registry::new());
        Self::with_registry(registry)
    }

    /// Create a new metrics collector with custom registry
    pub fn with_registry(registry: Arc<Registry>) -> Result<Self> {
        let history_metrics = HistoryMetrics::new(&registry)?;
        let sort_metrics = SortMetrics::new(&registry)?;
        let selection_metrics = SelectionMetrics::new(&registry)?;

        Ok(Self {
            registry,
            history_metrics,
            sort_metrics,
            selection_metrics,
        })
    }

    /// Get the Prometheus registry
    pub fn registry(&self) -> Arc<Registry> {
        self.registry.clone()
    }

    pub fn history(&self) -> &HistoryMetrics {
        &self.history_metrics
    }

    pub fn sort(&self) -> &SortMetrics {
        &self.sort_metrics
    }

    pub fn selection(&self) -> &SelectionMetrics {
        &self.selection_metrics
    }

    /// Record a match up appended to the history
    pub fn record_match_up(&self, evicted: bool, history_size: usize) {
        self.history_metrics.match_ups_recorded_total.inc();
        if evicted {
            self.history_metrics.match_ups_evicted_total.inc();
        }
        self.history_metrics.history_size.set(history_size as i64);
    }

    /// Record the size of a freshly loaded history
    pub fn record_history_loaded(&self, history_size: usize) {
        self.history_metrics.history_size.set(history_size as i64);
    }

    /// Record a failed history write
    pub fn record_persist_error(&self) {
        self.history_metrics.persist_errors_total.inc();
    }

    /// Record the outcome of a sort pass
    pub fn record_sort_pass(&self, report: &SortReport, duration: Duration) {
        self.sort_metrics
            .needed_battles
            .set(report.needed_battles.len() as i64);
        self.sort_metrics.progress.set(report.progress);
        self.sort_metrics
            .comparisons
            .set(report.total_comparisons as i64);
        self.sort_metrics
            .sort_duration_seconds
            .observe(duration.as_secs_f64());
    }

    /// Record which heuristic chose the next pair
    pub fn record_selection(&self, strategy: SelectionStrategy) {
        self.selection_metrics
            .selections_total
            .with_label_values(&[strategy.as_str()])
            .inc();
    }

    /// Create a timer for measuring operation duration
    pub fn start_timer(&self) -> MetricsTimer {
        MetricsTimer::new()
    }
}

/// Timer for measuring operation durations
pub struct MetricsTimer {
    start: Instant,
}

impl MetricsTimer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Get the elapsed duration
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    /// Stop the timer and return the duration
    pub fn stop(self) -> Duration {
        self.elapsed()
    }
}

impl HistoryMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let match_ups_recorded_total = IntCounter::new(
            "tracklist_ranker_match_ups_recorded_total",
            "Total match ups recorded",
        )?;
        registry.register(Box::new(match_ups_recorded_total.clone()))?;

        let match_ups_evicted_total = IntCounter::new(
            "tracklist_ranker_match_ups_evicted_total",
            "Total match ups evicted by the history capacity",
        )?;
        registry.register(Box::new(match_ups_evicted_total.clone()))?;

        let history_size = IntGauge::new(
            "tracklist_ranker_history_size",
            "Match ups currently kept in history",
        )?;
        registry.register(Box::new(history_size.clone()))?;

        let persist_errors_total = IntCounter::new(
            "tracklist_ranker_persist_errors_total",
            "Total failed history writes",
        )?;
        registry.register(Box::new(persist_errors_total.clone()))?;

        Ok(Self {
            match_ups_recorded_total,
            match_ups_evicted_total,
            history_size,
            persist_errors_total,
        })
    }
}

impl SortMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let needed_battles = IntGauge::new(
            "tracklist_ranker_needed_battles",
            "Pairs of the latest sort pass ordered without history",
        )?;
        registry.register(Box::new(needed_battles.clone()))?;

        let progress = Gauge::new(
            "tracklist_ranker_progress",
            "Share of the latest sort pass backed by history",
        )?;
        registry.register(Box::new(progress.clone()))?;

        let comparisons = IntGauge::new(
            "tracklist_ranker_sort_comparisons",
            "Comparator invocations of the latest sort pass",
        )?;
        registry.register(Box::new(comparisons.clone()))?;

        let sort_duration_seconds = Histogram::with_opts(
            HistogramOpts::new(
                "tracklist_ranker_sort_duration_seconds",
                "Time spent in a full sort pass",
            )
            .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        )?;
        registry.register(Box::new(sort_duration_seconds.clone()))?;

        Ok(Self {
            needed_battles,
            progress,
            comparisons,
            sort_duration_seconds,
        })
    }
}

impl SelectionMetrics {
    fn new(registry: &Registry) -> Result<Self> {
        let selections_total = IntCounterVec::new(
            Opts::new(
                "tracklist_ranker_selections_total",
                "Total next pairs chosen, by strategy",
            ),
            &["strategy"],
        )?;
        registry.register(Box::new(selections_total.clone()))?;

        Ok(Self { selections_total })
    }
}
