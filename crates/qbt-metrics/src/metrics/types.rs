#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MetricKind {
    #[default]
    Gauge,
    Counter,
}

impl MetricKind {
    pub fn as_prometheus_type(&self) -> &'static str {
        match self {
            Self::Counter => "counter",
            Self::Gauge => "gauge",
        }
    }
}

pub type Labels = Vec<(String, String)>;

/// One rendering-ready series value produced by a sub-collector.
///
/// Records are rebuilt on every scrape. Label values are kept verbatim; the
/// renderer is the only place that escapes them.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRecord {
    pub name: String,
    pub value: f64,
    pub kind: MetricKind,
    pub help: String,
    pub labels: Labels,
}

impl MetricRecord {
    pub fn new(prefix: &str, suffix: &str, value: f64, kind: MetricKind, help: &str) -> Self {
        Self {
            name: metric_name(prefix, suffix),
            value,
            kind,
            help: help.to_string(),
            labels: Vec::new(),
        }
    }

    pub fn gauge(prefix: &str, suffix: &str, value: f64, help: &str) -> Self {
        Self::new(prefix, suffix, value, MetricKind::Gauge, help)
    }

    pub fn counter(prefix: &str, suffix: &str, value: f64, help: &str) -> Self {
        Self::new(prefix, suffix, value, MetricKind::Counter, help)
    }

    pub fn flag(prefix: &str, suffix: &str, value: bool, help: &str) -> Self {
        Self::gauge(prefix, suffix, if value { 1.0 } else { 0.0 }, help)
    }

    pub fn with_label(mut self, key: &str, value: impl Into<String>) -> Self {
        self.labels.push((key.to_string(), value.into()));
        self
    }

    pub fn with_labels(mut self, labels: &[(String, String)]) -> Self {
        self.labels.extend_from_slice(labels);
        self
    }

    pub fn label(&self, key: &str) -> Option<&str> {
        self.labels
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    pub fn label_keys(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(|(name, _)| name.as_str())
    }
}

pub fn metric_name(prefix: &str, suffix: &str) -> String {
    format!("{prefix}_{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_prefixed() {
        let record = MetricRecord::counter("qbittorrent", "dl_info_data", 42.0, "bytes");

        assert_eq!(record.name, "qbittorrent_dl_info_data");
        assert_eq!(record.kind, MetricKind::Counter);
        assert!(record.labels.is_empty());
    }

    #[test]
    fn flags_coerce_to_zero_or_one() {
        assert_eq!(MetricRecord::flag("p", "up", true, "").value, 1.0);
        assert_eq!(MetricRecord::flag("p", "up", false, "").value, 0.0);
        assert_eq!(MetricRecord::flag("p", "up", false, "").kind, MetricKind::Gauge);
    }

    #[test]
    fn labels_keep_insertion_order() {
        let shared = vec![("hash".to_string(), "abc".to_string())];
        let record = MetricRecord::gauge("p", "ratio", 0.5, "")
            .with_label("name", "ubuntu.iso")
            .with_labels(&shared);

        assert_eq!(record.label_keys().collect::<Vec<_>>(), ["name", "hash"]);
        assert_eq!(record.label("hash"), Some("abc"));
        assert_eq!(record.label("category"), None);
    }
}
