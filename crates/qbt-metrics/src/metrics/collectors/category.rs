use std::collections::BTreeMap;

use async_trait::async_trait;
use qbt_client::{Category, LifecycleStatus, Torrent};
use tracing::{debug, error};

use crate::metrics::{
    collectors::{Collector, Scrape},
    types::MetricRecord,
};

/// Torrent counts for every category crossed with every lifecycle status.
pub struct CategoryCollector;

/// Row of the category x status table.
///
/// `Uncategorized` is not a daemon category: it collects torrents whose
/// category is empty. A daemon category that is literally named
/// `Uncategorized` folds into it, so that row counts both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryBucket {
    Named(String),
    Uncategorized,
}

impl CategoryBucket {
    pub const UNCATEGORIZED: &'static str = "Uncategorized";

    pub fn label(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Uncategorized => Self::UNCATEGORIZED,
        }
    }

    pub fn contains(&self, torrent: &Torrent) -> bool {
        match self {
            Self::Named(name) => torrent.category == *name,
            Self::Uncategorized => {
                torrent.category.is_empty() || torrent.category == Self::UNCATEGORIZED
            }
        }
    }
}

/// Daemon categories in name order followed by the `Uncategorized` sentinel.
pub fn category_buckets(categories: &BTreeMap<String, Category>) -> Vec<CategoryBucket> {
    categories
        .keys()
        .filter(|name| name.as_str() != CategoryBucket::UNCATEGORIZED)
        .map(|name| CategoryBucket::Named(name.clone()))
        .chain(std::iter::once(CategoryBucket::Uncategorized))
        .collect()
}

#[async_trait]
impl Collector for CategoryCollector {
    fn name(&self) -> &'static str {
        "category"
    }

    async fn collect(&self, scrape: &mut Scrape<'_>) -> Vec<MetricRecord> {
        let categories = match scrape.client().categories().await {
            Ok(categories) => categories,
            Err(err) => {
                error!(error = %err, "couldn't fetch categories");
                return Vec::new();
            }
        };

        let Some(torrents) = scrape.torrents() else {
            debug!("no torrent list for this scrape, skipping category counts");
            return Vec::new();
        };

        category_records(scrape.prefix(), &category_buckets(&categories), torrents)
    }
}

fn category_records(
    prefix: &str,
    buckets: &[CategoryBucket],
    torrents: &[Torrent],
) -> Vec<MetricRecord> {
    let mut records = Vec::with_capacity(buckets.len() * LifecycleStatus::ALL.len());

    for bucket in buckets {
        let members: Vec<&Torrent> = torrents
            .iter()
            .filter(|torrent| bucket.contains(torrent))
            .collect();

        for status in LifecycleStatus::ALL {
            let count = members
                .iter()
                .filter(|torrent| torrent.state.lifecycle() == status)
                .count();

            records.push(
                MetricRecord::gauge(
                    prefix,
                    "torrents_count",
                    count as f64,
                    "Number of torrents by lifecycle status and category",
                )
                .with_label("status", status.as_str())
                .with_label("category", bucket.label()),
            );
        }
    }

    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::testing::{StubDaemon, categories, config, torrent};

    async fn collect(daemon: &StubDaemon, torrents: Option<Vec<Torrent>>) -> Vec<MetricRecord> {
        let config = config();
        let mut scrape = Scrape::new(daemon, &config);
        if let Some(torrents) = torrents {
            scrape.replace_torrents(torrents);
        }
        CategoryCollector.collect(&mut scrape).await
    }

    fn count(records: &[MetricRecord], category: &str, status: &str) -> f64 {
        records
            .iter()
            .find(|record| {
                record.label("category") == Some(category) && record.label("status") == Some(status)
            })
            .map(|record| record.value)
            .unwrap_or_else(|| panic!("missing row {category}/{status}"))
    }

    #[tokio::test]
    async fn counts_movies_downloading() {
        let daemon = StubDaemon {
            categories: Some(categories(&["Movies"])),
            ..StubDaemon::healthy()
        };
        let torrents = vec![
            torrent("a", "one.mkv", "Movies", "downloading"),
            torrent("b", "two.mkv", "Movies", "downloading"),
        ];

        let records = collect(&daemon, Some(torrents)).await;

        assert_eq!(records.len(), 12);
        assert_eq!(count(&records, "Movies", "downloading"), 2.0);
        for status in ["uploading", "complete", "checking", "errored", "paused"] {
            assert_eq!(count(&records, "Movies", status), 0.0);
        }
        for status in LifecycleStatus::ALL {
            assert_eq!(count(&records, "Uncategorized", status.as_str()), 0.0);
        }
    }

    #[tokio::test]
    async fn empty_torrent_list_still_emits_zero_rows() {
        let daemon = StubDaemon {
            categories: Some(categories(&["Movies", "linux"])),
            ..StubDaemon::healthy()
        };

        let records = collect(&daemon, Some(Vec::new())).await;

        assert_eq!(records.len(), 18);
        assert!(records.iter().all(|record| record.value == 0.0));
    }

    #[tokio::test]
    async fn counts_partition_each_category() {
        let daemon = StubDaemon {
            categories: Some(categories(&["Movies", "linux"])),
            ..StubDaemon::healthy()
        };
        let torrents = vec![
            torrent("a", "a", "Movies", "downloading"),
            torrent("b", "b", "Movies", "pausedUP"),
            torrent("c", "c", "Movies", "checkingDL"),
            torrent("d", "d", "linux", "stalledUP"),
            torrent("e", "e", "linux", "missingFiles"),
            torrent("f", "f", "", "pausedDL"),
            torrent("g", "g", "", "someFutureState"),
        ];

        let records = collect(&daemon, Some(torrents.clone())).await;

        for bucket in ["Movies", "linux", "Uncategorized"] {
            let total: f64 = records
                .iter()
                .filter(|record| record.label("category") == Some(bucket))
                .map(|record| record.value)
                .sum();
            let expected = torrents
                .iter()
                .filter(|torrent| match bucket {
                    "Uncategorized" => torrent.category.is_empty(),
                    name => torrent.category == name,
                })
                .count();
            assert_eq!(total, expected as f64, "{bucket}");
        }
        assert_eq!(count(&records, "Movies", "complete"), 1.0);
        assert_eq!(count(&records, "linux", "errored"), 1.0);
        assert_eq!(count(&records, "Uncategorized", "paused"), 1.0);
        assert_eq!(count(&records, "Uncategorized", "errored"), 1.0);
    }

    #[tokio::test]
    async fn daemon_category_named_uncategorized_shares_the_sentinel_row() {
        let daemon = StubDaemon {
            categories: Some(categories(&["Uncategorized", "linux"])),
            ..StubDaemon::healthy()
        };
        let torrents = vec![
            torrent("a", "a", "Uncategorized", "downloading"),
            torrent("b", "b", "", "downloading"),
        ];

        let records = collect(&daemon, Some(torrents)).await;

        let uncategorized_rows = records
            .iter()
            .filter(|record| record.label("category") == Some("Uncategorized"))
            .count();
        assert_eq!(uncategorized_rows, 6);
        assert_eq!(records.len(), 12);
        assert_eq!(count(&records, "Uncategorized", "downloading"), 2.0);
    }

    #[tokio::test]
    async fn no_torrent_list_emits_nothing() {
        let records = collect(&StubDaemon::healthy(), None).await;

        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn category_fetch_failure_emits_nothing() {
        let daemon = StubDaemon {
            categories: None,
            ..StubDaemon::healthy()
        };

        let records = collect(&daemon, Some(vec![torrent("a", "a", "", "uploading")])).await;

        assert!(records.is_empty());
    }

    #[test]
    fn sentinel_bucket_comes_last() {
        let buckets = category_buckets(&categories(&["b", "a"]));

        assert_eq!(
            buckets,
            [
                CategoryBucket::Named("a".to_string()),
                CategoryBucket::Named("b".to_string()),
                CategoryBucket::Uncategorized,
            ]
        );
        assert_eq!(buckets[2].label(), "Uncategorized");
    }
}
