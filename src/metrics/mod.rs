//! Metrics for a ranking session
//!
//! This module provides Prometheus metrics collection for history growth,
//! sort pass progress and pair selection.

pub mod collector;

pub use collector::{
    HistoryMetrics, MetricsCollector, MetricsTimer, SelectionMetrics, SortMetrics,
};
