use async_trait::async_trait;
use qbt_client::Torrent;

use crate::metrics::{
    collectors::{Collector, Scrape},
    types::{MetricKind, MetricRecord},
};

/// Per-torrent series labeled with `name`, `category` and `hash`.
pub struct TorrentCollector;

const TORRENT_FIELDS: [(&str, MetricKind, &str); 13] = [
    (
        "torrents_info_added_on",
        MetricKind::Gauge,
        "Time (Unix Epoch) when the torrent was added to the client",
    ),
    (
        "torrents_info_availability",
        MetricKind::Gauge,
        "Percentage of file pieces currently available",
    ),
    (
        "torrents_info_downloaded",
        MetricKind::Counter,
        "Amount of data downloaded",
    ),
    (
        "torrents_info_num_complete",
        MetricKind::Gauge,
        "Number of seeds in the swarm",
    ),
    (
        "torrents_info_num_incomplete",
        MetricKind::Gauge,
        "Number of leechers in the swarm",
    ),
    (
        "torrents_info_num_leechs",
        MetricKind::Gauge,
        "Number of leechers connected to",
    ),
    (
        "torrents_info_num_seeds",
        MetricKind::Gauge,
        "Number of seeds connected to",
    ),
    (
        "torrents_info_ratio",
        MetricKind::Gauge,
        "Torrent share ratio. Max ratio value: 9999.",
    ),
    (
        "torrents_seeding_time",
        MetricKind::Gauge,
        "Torrent elapsed time while complete (seconds)",
    ),
    (
        "torrents_info_size",
        MetricKind::Gauge,
        "Total size (bytes) of files selected for download",
    ),
    (
        "torrents_info_total_size",
        MetricKind::Gauge,
        "Total size (bytes) of all file in this torrent (including unselected ones)",
    ),
    (
        "torrents_info_time_active",
        MetricKind::Gauge,
        "Total active time (seconds)",
    ),
    (
        "torrents_info_uploaded",
        MetricKind::Counter,
        "Amount of data uploaded",
    ),
];

#[async_trait]
impl Collector for TorrentCollector {
    fn name(&self) -> &'static str {
        "torrents"
    }

    async fn collect(&self, scrape: &mut Scrape<'_>) -> Vec<MetricRecord> {
        let prefix = scrape.prefix();
        scrape
            .torrents()
            .unwrap_or_default()
            .iter()
            .flat_map(|torrent| torrent_records(prefix, torrent))
            .collect()
    }
}

fn torrent_records(prefix: &str, torrent: &Torrent) -> Vec<MetricRecord> {
    let labels = vec![
        ("name".to_string(), torrent.name.clone()),
        ("category".to_string(), torrent.category.clone()),
        ("hash".to_string(), torrent.hash.clone()),
    ];
    let values = [
        torrent.added_on as f64,
        torrent.availability,
        torrent.downloaded as f64,
        torrent.num_complete as f64,
        torrent.num_incomplete as f64,
        torrent.num_leechs as f64,
        torrent.num_seeds as f64,
        torrent.ratio,
        torrent.seeding_time as f64,
        torrent.size as f64,
        torrent.total_size as f64,
        torrent.time_active as f64,
        torrent.uploaded as f64,
    ];

    TORRENT_FIELDS
        .iter()
        .zip(values)
        .map(|(&(suffix, kind, help), value)| {
            MetricRecord::new(prefix, suffix, value, kind, help).with_labels(&labels)
        })
        .collect()
}
