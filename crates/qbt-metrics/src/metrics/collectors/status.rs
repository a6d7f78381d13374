use async_trait::async_trait;
use qbt_client::{TorrentApi, TransferInfo};
use qbt_common::Result;
use tracing::error;

use crate::metrics::{
    collectors::{Collector, Scrape},
    types::MetricRecord,
};

/// Daemon liveness, connectivity and session transfer totals.
///
/// Also refreshes the scrape's torrent list for the collectors after it. The
/// list is kept whenever its own fetch succeeds, even if the daemon is then
/// reported down.
pub struct StatusCollector;

struct ServerInfo {
    transfer: TransferInfo,
    version: String,
}

#[async_trait]
impl Collector for StatusCollector {
    fn name(&self) -> &'static str {
        "status"
    }

    async fn collect(&self, scrape: &mut Scrape<'_>) -> Vec<MetricRecord> {
        let prefix = scrape.prefix();
        let client = scrape.client();

        if let Err(err) = refresh_torrents(scrape).await {
            error!(error = %err, "couldn't get server info");
            return vec![up_record(prefix, false, "")];
        }

        match fetch_server_info(client).await {
            Ok(info) => status_records(prefix, &info.transfer, &info.version),
            Err(err) => {
                error!(error = %err, "couldn't get server info");
                vec![up_record(prefix, false, "")]
            }
        }
    }
}

async fn refresh_torrents(scrape: &mut Scrape<'_>) -> Result<()> {
    let torrents = scrape.client().list_torrents().await?;
    scrape.replace_torrents(torrents);
    Ok(())
}

async fn fetch_server_info(client: &dyn TorrentApi) -> Result<ServerInfo> {
    let transfer = client.transfer_info().await?;
    let version = client.app_version().await?;

    Ok(ServerInfo { transfer, version })
}

fn up_record(prefix: &str, up: bool, version: &str) -> MetricRecord {
    MetricRecord::flag(prefix, "up", up, "Whether if server is alive or not")
        .with_label("version", version)
}

fn status_records(prefix: &str, transfer: &TransferInfo, version: &str) -> Vec<MetricRecord> {
    vec![
        up_record(prefix, true, version),
        MetricRecord::flag(
            prefix,
            "connected",
            transfer.is_connected(),
            "Whether if server is connected or not",
        ),
        MetricRecord::flag(
            prefix,
            "firewalled",
            transfer.is_firewalled(),
            "Whether if server is under a firewall or not",
        ),
        MetricRecord::gauge(
            prefix,
            "dht_nodes",
            transfer.dht_nodes as f64,
            "DHT nodes connected to",
        ),
        MetricRecord::counter(
            prefix,
            "dl_info_data",
            transfer.dl_info_data as f64,
            "Data downloaded this session (bytes)",
        ),
        MetricRecord::counter(
            prefix,
            "up_info_data",
            transfer.up_info_data as f64,
            "Data uploaded this session (bytes)",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{
        testing::{StubDaemon, config},
        types::MetricKind,
    };

    fn find<'a>(records: &'a [MetricRecord], name: &str) -> &'a MetricRecord {
        records
            .iter()
            .find(|record| record.name == name)
            .unwrap_or_else(|| panic!("missing {name}"))
    }

    #[tokio::test]
    async fn reachable_daemon_reports_up_with_version() {
        let daemon = StubDaemon::healthy();
        let config = config();
        let mut scrape = Scrape::new(&daemon, &config);

        let records = StatusCollector.collect(&mut scrape).await;

        assert_eq!(records.len(), 6);
        let up = find(&records, "qbittorrent_up");
        assert_eq!(up.value, 1.0);
        assert_eq!(up.label("version"), Some("v4.6.2"));
        assert_eq!(find(&records, "qbittorrent_connected").value, 1.0);
        assert_eq!(find(&records, "qbittorrent_firewalled").value, 0.0);
        assert_eq!(find(&records, "qbittorrent_dht_nodes").value, 312.0);

        let downloaded = find(&records, "qbittorrent_dl_info_data");
        assert_eq!(downloaded.kind, MetricKind::Counter);
        assert_eq!(downloaded.value, 1_048_576.0);
        assert_eq!(find(&records, "qbittorrent_up_info_data").kind, MetricKind::Counter);
    }

    #[tokio::test]
    async fn refreshes_scrape_torrent_list() {
        let daemon = StubDaemon::healthy();
        let config = config();
        let mut scrape = Scrape::new(&daemon, &config);
        assert!(scrape.torrents().is_none());

        StatusCollector.collect(&mut scrape).await;

        assert_eq!(scrape.torrents().map(<[_]>::len), Some(2));
    }

    #[tokio::test]
    async fn transfer_failure_yields_single_down_record() {
        let daemon = StubDaemon {
            transfer: None,
            ..StubDaemon::healthy()
        };
        let config = config();
        let mut scrape = Scrape::new(&daemon, &config);

        let records = StatusCollector.collect(&mut scrape).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "qbittorrent_up");
        assert_eq!(records[0].value, 0.0);
        assert_eq!(records[0].label("version"), Some(""));
        assert_eq!(scrape.torrents().map(<[_]>::len), Some(2));
    }

    #[tokio::test]
    async fn version_failure_yields_single_down_record() {
        let daemon = StubDaemon {
            version: None,
            ..StubDaemon::healthy()
        };
        let config = config();
        let mut scrape = Scrape::new(&daemon, &config);

        let records = StatusCollector.collect(&mut scrape).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 0.0);
        assert!(scrape.torrents().is_some());
    }

    #[tokio::test]
    async fn torrent_list_failure_also_marks_daemon_down() {
        let daemon = StubDaemon {
            torrents: None,
            ..StubDaemon::healthy()
        };
        let config = config();
        let mut scrape = Scrape::new(&daemon, &config);

        let records = StatusCollector.collect(&mut scrape).await;

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].value, 0.0);
        assert!(scrape.torrents().is_none());
    }

    #[tokio::test]
    async fn firewalled_daemon_is_not_connected() {
        let mut daemon = StubDaemon::healthy();
        if let Some(transfer) = daemon.transfer.as_mut() {
            transfer.connection_status = "firewalled".to_string();
        }
        let config = config();
        let mut scrape = Scrape::new(&daemon, &config);

        let records = StatusCollector.collect(&mut scrape).await;

        assert_eq!(find(&records, "qbittorrent_connected").value, 0.0);
        assert_eq!(find(&records, "qbittorrent_firewalled").value, 1.0);
    }
}
