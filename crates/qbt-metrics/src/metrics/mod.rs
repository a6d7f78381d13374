pub mod aggregator;
pub mod collectors;
pub mod render;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::MetricsAggregator;
pub use collectors::{CategoryBucket, Collector, Scrape};
pub use render::{CONTENT_TYPE, render_prometheus};
pub use types::{MetricKind, MetricRecord};
