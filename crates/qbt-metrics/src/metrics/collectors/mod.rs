//! Sub-collectors translating one slice of daemon state each into
//! [`MetricRecord`]s.
//!
//! A collector never fails the scrape: fetch errors are logged and turn into
//! fewer (or no) records.

use async_trait::async_trait;
use qbt_client::{Torrent, TorrentApi};
use qbt_common::ExporterConfig;

use crate::metrics::types::MetricRecord;

pub mod category;
pub mod peers;
pub mod status;
pub mod sync;
pub mod torrents;

pub use category::{CategoryBucket, CategoryCollector};
pub use peers::PeerCollector;
pub use status::StatusCollector;
pub use sync::SyncCollector;
pub use torrents::TorrentCollector;

/// State shared by the collectors of a single scrape.
///
/// The torrent list is filled by [`StatusCollector`] and read by the
/// collectors that run after it. A fresh `Scrape` is built for every
/// request, so overlapping scrapes never observe each other's list.
pub struct Scrape<'a> {
    client: &'a dyn TorrentApi,
    config: &'a ExporterConfig,
    torrents: Option<Vec<Torrent>>,
}

impl<'a> Scrape<'a> {
    pub fn new(client: &'a dyn TorrentApi, config: &'a ExporterConfig) -> Self {
        Self {
            client,
            config,
            torrents: None,
        }
    }

    pub fn client(&self) -> &'a dyn TorrentApi {
        self.client
    }

    pub fn prefix(&self) -> &'a str {
        &self.config.metrics_prefix
    }

    pub fn torrents(&self) -> Option<&[Torrent]> {
        self.torrents.as_deref()
    }

    pub fn replace_torrents(&mut self, torrents: Vec<Torrent>) {
        self.torrents = Some(torrents);
    }
}

#[async_trait]
pub trait Collector: Send + Sync {
    fn name(&self) -> &'static str;

    async fn collect(&self, scrape: &mut Scrape<'_>) -> Vec<MetricRecord>;
}
