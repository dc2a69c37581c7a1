//! Per-turn metrics.
//!
//! The conversational core emits exactly one [`MetricEvent`] per turn through
//! a [`MetricsSink`]. Recording is infallible from the caller's side: sinks
//! swallow and log their own failures so a turn never fails on metrics.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::Tier;

/// How a turn ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnKind {
    Answer,
    Clarification,
    Error,
}

/// Immutable record of one processed turn.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MetricEvent {
    pub kind: TurnKind,
    pub latency_ms: f64,
    /// Tier that produced the answer, if any.
    pub tier: Option<Tier>,
    /// Rows in the produced result set.
    pub rows: usize,
    pub at: DateTime<Utc>,
}

impl MetricEvent {
    pub fn new(kind: TurnKind, latency_ms: f64) -> Self {
        Self {
            kind,
            latency_ms,
            tier: None,
            rows: 0,
            at: Utc::now(),
        }
    }

    pub fn with_result(mut self, tier: Tier, rows: usize) -> Self {
        self.tier = Some(tier);
        self.rows = rows;
        self
    }

    pub fn is_clarification(&self) -> bool {
        self.kind == TurnKind::Clarification
    }

    pub fn is_error(&self) -> bool {
        self.kind == TurnKind::Error
    }
}

/// Destination for metric events.
pub trait MetricsSink: Send + Sync {
    /// Record an event. Must not block for long and must not panic.
    fn record(&self, event: MetricEvent);
}

/// Sink that discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl MetricsSink for NoopSink {
    fn record(&self, _event: MetricEvent) {}
}

/// Aggregated view of all recorded turns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub total_queries: u64,
    pub clarifications_triggered: u64,
    pub errors: u64,
    pub avg_latency_ms: f64,
}

#[derive(Debug, Default)]
struct TrackerState {
    summary: MetricsSummary,
    latency_total_ms: f64,
}

/// Process-wide metrics aggregate.
///
/// Create one at startup and hand out references; there is no global
/// instance.
#[derive(Debug, Default)]
pub struct MetricsTracker {
    state: Mutex<TrackerState>,
}

impl MetricsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the aggregate counters.
    pub fn summary(&self) -> MetricsSummary {
        match self.state.lock() {
            Ok(state) => state.summary.clone(),
            Err(poisoned) => poisoned.into_inner().summary.clone(),
        }
    }
}

impl MetricsSink for MetricsTracker {
    fn record(&self, event: MetricEvent) {
        let mut state = match self.state.lock() {
            Ok(state) => state,
            Err(e) => {
                warn!("Metrics lock poisoned, dropping event: {}", e);
                return;
            }
        };

        state.summary.total_queries += 1;
        if event.is_clarification() {
            state.summary.clarifications_triggered += 1;
        }
        if event.is_error() {
            state.summary.errors += 1;
        }
        state.latency_total_ms += event.latency_ms;
        state.summary.avg_latency_ms =
            state.latency_total_ms / state.summary.total_queries as f64;
    }
}
