use std::sync::Arc;

use qbt_client::TorrentApi;
use qbt_common::ExporterConfig;
use tracing::debug;

use crate::metrics::{
    collectors::{
        CategoryCollector, Collector, PeerCollector, Scrape, StatusCollector, SyncCollector,
        TorrentCollector,
    },
    render::render_prometheus,
    types::MetricRecord,
};

/// Runs every sub-collector against one fresh [`Scrape`] per request.
pub struct MetricsAggregator {
    client: Arc<dyn TorrentApi>,
    config: Arc<ExporterConfig>,
    collectors: Vec<Box<dyn Collector>>,
}

impl MetricsAggregator {
    pub fn new(client: Arc<dyn TorrentApi>, config: Arc<ExporterConfig>) -> Self {
        // Status runs first: it fills the torrent list the others read.
        let collectors: Vec<Box<dyn Collector>> = vec![
            Box::new(StatusCollector),
            Box::new(SyncCollector),
            Box::new(CategoryCollector),
            Box::new(TorrentCollector),
            Box::new(PeerCollector),
        ];

        Self {
            client,
            config,
            collectors,
        }
    }

    pub async fn collect(&self) -> Vec<MetricRecord> {
        let mut scrape = Scrape::new(self.client.as_ref(), self.config.as_ref());
        let mut records = Vec::new();

        for collector in &self.collectors {
            let collected = collector.collect(&mut scrape).await;
            debug!(
                collector = collector.name(),
                records = collected.len(),
                "collector finished"
            );
            records.extend(collected);
        }

        records
    }

    pub async fn render(&self) -> String {
        render_prometheus(&self.collect().await)
    }
}
