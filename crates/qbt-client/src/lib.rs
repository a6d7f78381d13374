pub mod api;
pub mod client;
pub mod state;
pub mod types;

pub use api::TorrentApi;
pub use client::QbitClient;
pub use state::{LifecycleStatus, TorrentState};
pub use types::{Category, Peer, ServerState, SyncMainData, Torrent, TorrentPeers, TransferInfo};
