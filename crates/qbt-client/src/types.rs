use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};

use crate::state::TorrentState;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Torrent {
    pub hash: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub state: TorrentState,
    #[serde(default)]
    pub added_on: i64,
    #[serde(default)]
    pub availability: f64,
    #[serde(default)]
    pub downloaded: i64,
    #[serde(default)]
    pub num_complete: i64,
    #[serde(default)]
    pub num_incomplete: i64,
    #[serde(default)]
    pub num_leechs: i64,
    #[serde(default)]
    pub num_seeds: i64,
    #[serde(default)]
    pub ratio: f64,
    #[serde(default)]
    pub seeding_time: i64,
    #[serde(default)]
    pub size: i64,
    #[serde(default)]
    pub total_size: i64,
    #[serde(default)]
    pub time_active: i64,
    #[serde(default)]
    pub uploaded: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransferInfo {
    #[serde(default)]
    pub connection_status: String,
    #[serde(default)]
    pub dht_nodes: i64,
    #[serde(default)]
    pub dl_info_data: i64,
    #[serde(default)]
    pub up_info_data: i64,
}

impl TransferInfo {
    pub fn is_connected(&self) -> bool {
        self.connection_status == "connected"
    }

    pub fn is_firewalled(&self) -> bool {
        self.connection_status == "firewalled"
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Category {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "savePath", default)]
    pub save_path: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SyncMainData {
    #[serde(default)]
    pub server_state: Option<ServerState>,
}

/// Global counters from the `server_state` section of a sync snapshot.
///
/// Depending on the daemon version some of these arrive as JSON strings
/// (`"read_cache_hits": "0"`), so every field goes through [`lenient_f64`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ServerState {
    #[serde(default, deserialize_with = "lenient_f64")]
    pub average_time_queue: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub read_cache_hits: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_buffers_size: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_peer_connections: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub total_wasted_session: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    pub write_cache_overload: Option<f64>,
}

impl ServerState {
    pub fn is_empty(&self) -> bool {
        self.average_time_queue.is_none()
            && self.read_cache_hits.is_none()
            && self.total_buffers_size.is_none()
            && self.total_peer_connections.is_none()
            && self.total_wasted_session.is_none()
            && self.write_cache_overload.is_none()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TorrentPeers {
    #[serde(default)]
    pub peers: Option<BTreeMap<String, Peer>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Peer {
    #[serde(default)]
    pub ip: String,
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub country_code: String,
    #[serde(default)]
    pub downloaded: i64,
    #[serde(default)]
    pub uploaded: i64,
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub relevance: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(value) = Option::<NumberOrText>::deserialize(deserializer)? else {
        return Ok(None);
    };

    match value {
        NumberOrText::Number(number) => Ok(Some(number)),
        NumberOrText::Text(text) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("not a number: {text:?}"))),
    }
}
