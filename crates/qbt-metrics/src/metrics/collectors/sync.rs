use async_trait::async_trait;
use qbt_client::ServerState;
use tracing::{debug, error};

use crate::metrics::{
    collectors::{Collector, Scrape},
    types::{MetricKind, MetricRecord},
};

/// Disk, cache and connection counters from the `server_state` section of
/// the sync snapshot.
pub struct SyncCollector;

#[async_trait]
impl Collector for SyncCollector {
    fn name(&self) -> &'static str {
        "sync"
    }

    async fn collect(&self, scrape: &mut Scrape<'_>) -> Vec<MetricRecord> {
        let main_data = match scrape.client().sync_main_data().await {
            Ok(main_data) => main_data,
            Err(err) => {
                error!(error = %err, "couldn't fetch sync maindata");
                return Vec::new();
            }
        };

        let Some(server_state) = main_data.server_state.filter(|state| !state.is_empty()) else {
            debug!("sync maindata carried no server state");
            return Vec::new();
        };

        server_state_records(scrape.prefix(), &server_state)
    }
}

fn server_state_records(prefix: &str, state: &ServerState) -> Vec<MetricRecord> {
    let fields = [
        (
            "average_time_queue",
            state.average_time_queue,
            MetricKind::Gauge,
            "Average disk job time in ms",
        ),
        (
            "read_cache_hits",
            state.read_cache_hits,
            MetricKind::Gauge,
            "Read cache hits in percent",
        ),
        (
            "total_buffers_size",
            state.total_buffers_size,
            MetricKind::Gauge,
            "Total buffer size in bytes",
        ),
        (
            "total_peer_connections",
            state.total_peer_connections,
            MetricKind::Gauge,
            "Total peer connections",
        ),
        (
            "total_wasted",
            state.total_wasted_session,
            MetricKind::Counter,
            "Total wasted in bytes",
        ),
        (
            "write_cache_overload",
            state.write_cache_overload,
            MetricKind::Gauge,
            "Write cache overload in percent",
        ),
    ];

    fields
        .into_iter()
        .filter_map(|(suffix, value, kind, help)| {
            value.map(|value| MetricRecord::new(prefix, suffix, value, kind, help))
        })
        .collect()
}
