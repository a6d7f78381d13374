use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::{metrics::CONTENT_TYPE, router::ExporterState};

/// Scrapes the daemon and answers with whatever could be gathered. Always 200.
pub async fn prometheus_metrics(State(state): State<Arc<ExporterState>>) -> impl IntoResponse {
    let payload = state.aggregator.render().await;
    debug!(bytes = payload.len(), "scrape rendered");

    let mut response = Response::new(Body::from(payload));
    *response.status_mut() = StatusCode::OK;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE));

    response
}
