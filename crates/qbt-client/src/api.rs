use std::collections::BTreeMap;

use async_trait::async_trait;
use qbt_common::error::Result;

use crate::types::{Category, SyncMainData, Torrent, TorrentPeers, TransferInfo};

/// Read-only view of the daemon state the exporter translates into metrics.
///
/// Every operation is independent: a failure of one call says nothing about
/// the others, and callers are expected to degrade instead of aborting.
#[async_trait]
pub trait TorrentApi: Send + Sync {
    async fn list_torrents(&self) -> Result<Vec<Torrent>>;

    async fn transfer_info(&self) -> Result<TransferInfo>;

    async fn app_version(&self) -> Result<String>;

    async fn categories(&self) -> Result<BTreeMap<String, Category>>;

    async fn sync_main_data(&self) -> Result<SyncMainData>;

    async fn torrent_peers(&self, hash: &str) -> Result<TorrentPeers>;
}
