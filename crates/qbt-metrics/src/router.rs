use std::sync::Arc;

use axum::{Router, routing::get};

use crate::{handlers, metrics::MetricsAggregator};

pub struct ExporterState {
    pub aggregator: MetricsAggregator,
}

impl ExporterState {
    pub fn new(aggregator: MetricsAggregator) -> Self {
        Self { aggregator }
    }
}

/// Every path other than the health probe serves the scrape.
pub fn exporter_router(state: Arc<ExporterState>) -> Router {
    Router::new()
        .route("/health/live", get(handlers::health::health_live))
        .route("/metrics", get(handlers::metrics::prometheus_metrics))
        .fallback(handlers::metrics::prometheus_metrics)
        .with_state(state)
}
