use std::{
    collections::{BTreeMap, HashMap},
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use qbt_client::{
    Category, Peer, ServerState, SyncMainData, Torrent, TorrentApi, TorrentPeers, TransferInfo,
};
use qbt_common::{ExporterConfig, ExporterError, RawConfig, Result};

/// In-memory daemon. A `None` field (or a hash missing from `peers`) makes
/// the matching call fail.
#[derive(Default)]
pub struct StubDaemon {
    pub torrents: Option<Vec<Torrent>>,
    pub transfer: Option<TransferInfo>,
    pub version: Option<String>,
    pub categories: Option<BTreeMap<String, Category>>,
    pub main_data: Option<SyncMainData>,
    pub peers: HashMap<String, TorrentPeers>,
    pub torrent_list_calls: AtomicUsize,
    pub peer_calls: AtomicUsize,
}

impl StubDaemon {
    pub fn healthy() -> Self {
        Self {
            torrents: Some(vec![
                torrent("aaa", "ubuntu.iso", "linux", "uploading"),
                torrent("bbb", "movie.mkv", "Movies", "downloading"),
            ]),
            transfer: Some(TransferInfo {
                connection_status: "connected".to_string(),
                dht_nodes: 312,
                dl_info_data: 1_048_576,
                up_info_data: 2_097_152,
            }),
            version: Some("v4.6.2".to_string()),
            categories: Some(categories(&["Movies", "linux"])),
            main_data: Some(SyncMainData {
                server_state: Some(ServerState {
                    average_time_queue: Some(14.0),
                    read_cache_hits: Some(37.5),
                    total_buffers_size: Some(262_144.0),
                    total_peer_connections: Some(41.0),
                    total_wasted_session: Some(5_120.0),
                    write_cache_overload: Some(0.0),
                }),
            }),
            peers: HashMap::from([
                (
                    "aaa".to_string(),
                    peers(&[peer("10.0.0.1", 6881), peer("10.0.0.2", 51413)]),
                ),
                ("bbb".to_string(), peers(&[peer("192.168.1.9", 6881)])),
            ]),
            ..Self::default()
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TorrentApi for StubDaemon {
    async fn list_torrents(&self) -> Result<Vec<Torrent>> {
        self.torrent_list_calls.fetch_add(1, Ordering::SeqCst);
        self.torrents.clone().ok_or_else(|| unavailable("torrents/info"))
    }

    async fn transfer_info(&self) -> Result<TransferInfo> {
        self.transfer.clone().ok_or_else(|| unavailable("transfer/info"))
    }

    async fn app_version(&self) -> Result<String> {
        self.version.clone().ok_or_else(|| unavailable("app/version"))
    }

    async fn categories(&self) -> Result<BTreeMap<String, Category>> {
        self.categories
            .clone()
            .ok_or_else(|| unavailable("torrents/categories"))
    }

    async fn sync_main_data(&self) -> Result<SyncMainData> {
        self.main_data.clone().ok_or_else(|| unavailable("sync/maindata"))
    }

    async fn torrent_peers(&self, hash: &str) -> Result<TorrentPeers> {
        self.peer_calls.fetch_add(1, Ordering::SeqCst);
        self.peers
            .get(hash)
            .cloned()
            .ok_or_else(|| unavailable("sync/torrentPeers"))
    }
}

fn unavailable(endpoint: &str) -> ExporterError {
    ExporterError::Request {
        endpoint: endpoint.to_string(),
        message: "connection refused".to_string(),
    }
}

pub fn config() -> ExporterConfig {
    ExporterConfig::from_parts(RawConfig {
        host: Some("localhost".to_string()),
        port: Some("8080".to_string()),
        exporter_port: 8000,
        log_level: "INFO".to_string(),
        metrics_prefix: "qbittorrent".to_string(),
        request_timeout_secs: 10,
        ..RawConfig::default()
    })
    .unwrap()
}

pub fn torrent(hash: &str, name: &str, category: &str, state: &str) -> Torrent {
    Torrent {
        hash: hash.to_string(),
        name: name.to_string(),
        category: category.to_string(),
        state: state.into(),
        added_on: 1_700_000_000,
        availability: 0.75,
        downloaded: 4_096,
        num_complete: 12,
        num_incomplete: 3,
        num_leechs: 1,
        num_seeds: 2,
        ratio: 1.5,
        seeding_time: 3_600,
        size: 8_192,
        total_size: 16_384,
        time_active: 7_200,
        uploaded: 6_144,
    }
}

pub fn categories(names: &[&str]) -> BTreeMap<String, Category> {
    names
        .iter()
        .map(|name| {
            (
                name.to_string(),
                Category {
                    name: name.to_string(),
                    save_path: format!("/downloads/{name}"),
                },
            )
        })
        .collect()
}

pub fn peer(ip: &str, port: u16) -> Peer {
    Peer {
        ip: ip.to_string(),
        port,
        country: "Netherlands".to_string(),
        country_code: "nl".to_string(),
        downloaded: 512,
        uploaded: 256,
        progress: 0.42,
        relevance: 1.0,
    }
}

pub fn peers(list: &[Peer]) -> TorrentPeers {
    TorrentPeers {
        peers: Some(
            list.iter()
                .map(|peer| (format!("{}:{}", peer.ip, peer.port), peer.clone()))
                .collect(),
        ),
    }
}
