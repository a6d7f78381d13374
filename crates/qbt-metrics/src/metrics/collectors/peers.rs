use async_trait::async_trait;
use qbt_client::{Peer, Torrent};
use tracing::error;

use crate::metrics::{
    collectors::{Collector, Scrape},
    types::MetricRecord,
};

/// Per-peer transfer series for every torrent in the scrape.
///
/// Peers are fetched one torrent at a time; a failed fetch only drops that
/// torrent's peers.
pub struct PeerCollector;

#[async_trait]
impl Collector for PeerCollector {
    fn name(&self) -> &'static str {
        "peers"
    }

    async fn collect(&self, scrape: &mut Scrape<'_>) -> Vec<MetricRecord> {
        let prefix = scrape.prefix();
        let client = scrape.client();
        let Some(torrents) = scrape.torrents() else {
            return Vec::new();
        };

        let mut records = Vec::new();
        for torrent in torrents {
            let torrent_peers = match client.torrent_peers(&torrent.hash).await {
                Ok(torrent_peers) => torrent_peers,
                Err(err) => {
                    error!(hash = %torrent.hash, error = %err, "couldn't fetch torrent peers");
                    continue;
                }
            };

            let Some(peers) = torrent_peers.peers.filter(|peers| !peers.is_empty()) else {
                continue;
            };

            for peer in peers.values() {
                records.extend(peer_records(prefix, torrent, peer));
            }
        }

        records
    }
}

fn peer_records(prefix: &str, torrent: &Torrent, peer: &Peer) -> [MetricRecord; 4] {
    let labels = vec![
        ("torrent_name".to_string(), torrent.name.clone()),
        ("torrent_hash".to_string(), torrent.hash.clone()),
        ("country".to_string(), peer.country.clone()),
        ("country_code".to_string(), peer.country_code.clone()),
        ("ip".to_string(), peer.ip.clone()),
        ("port".to_string(), peer.port.to_string()),
    ];

    [
        MetricRecord::counter(
            prefix,
            "peers_downloaded",
            peer.downloaded as f64,
            "Amount of data downloaded by peer",
        )
        .with_labels(&labels),
        MetricRecord::counter(
            prefix,
            "peers_uploaded",
            peer.uploaded as f64,
            "Amount of data uploaded by peer",
        )
        .with_labels(&labels),
        MetricRecord::gauge(prefix, "peers_progress", peer.progress, "Peer download progress")
            .with_labels(&labels),
        MetricRecord::gauge(prefix, "peers_relevance", peer.relevance, "Peer relevance")
            .with_labels(&labels),
    ]
}
