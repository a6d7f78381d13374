//! Prometheus collection and exposition for a qBittorrent daemon.

pub mod handlers;
pub mod metrics;
pub mod router;

pub use metrics::{MetricKind, MetricRecord, MetricsAggregator};
pub use router::{ExporterState, exporter_router};
