pub mod config;
pub mod dataset;
pub mod error;
pub mod metrics;
pub mod types;

pub use config::UnicornConfig;
pub use dataset::Dataset;
pub use error::{Result, UnicornError};
pub use metrics::{MetricEvent, MetricsSink, MetricsSummary, MetricsTracker, NoopSink, TurnKind};
pub use types::*;
