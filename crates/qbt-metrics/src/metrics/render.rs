use std::collections::{BTreeMap, btree_map::Entry};

use tracing::warn;

use crate::metrics::types::{MetricKind, MetricRecord};

pub const CONTENT_TYPE: &str = "text/plain; version=0.0.4; charset=utf-8";

struct Family<'a> {
    help: &'a str,
    kind: MetricKind,
    label_keys: Vec<&'a str>,
    samples: Vec<&'a MetricRecord>,
}

/// Renders records in the Prometheus text exposition format, one family per
/// metric name, families sorted by name.
pub fn render_prometheus(records: &[MetricRecord]) -> String {
    let mut output = String::new();

    for (name, family) in group_families(records) {
        let family_name = match family.kind {
            MetricKind::Counter => counter_name(name),
            MetricKind::Gauge => name.to_string(),
        };

        output.push_str("# HELP ");
        output.push_str(&family_name);
        output.push(' ');
        output.push_str(&escape_help(family.help));
        output.push('\n');

        output.push_str("# TYPE ");
        output.push_str(&family_name);
        output.push(' ');
        output.push_str(family.kind.as_prometheus_type());
        output.push('\n');

        for sample in family.samples {
            output.push_str(&render_sample_line(&family_name, &sample.labels, sample.value));
        }
    }

    output
}

/// Groups records by name. The first record of a name fixes the family's type
/// and label names; later records that disagree are dropped.
fn group_families(records: &[MetricRecord]) -> BTreeMap<&str, Family<'_>> {
    let mut families: BTreeMap<&str, Family<'_>> = BTreeMap::new();

    for record in records {
        match families.entry(record.name.as_str()) {
            Entry::Vacant(entry) => {
                entry.insert(Family {
                    help: &record.help,
                    kind: record.kind,
                    label_keys: record.label_keys().collect(),
                    samples: vec![record],
                });
            }
            Entry::Occupied(mut entry) => {
                let family = entry.get_mut();
                if family.kind != record.kind
                    || !family.label_keys.iter().copied().eq(record.label_keys())
                {
                    warn!(
                        metric = %record.name,
                        "dropping sample whose type or label names conflict with its family"
                    );
                    continue;
                }
                family.samples.push(record);
            }
        }
    }

    families
}

/// Counter families are exposed under their `_total` name, on the HELP and
/// TYPE lines as well as on every sample.
fn counter_name(name: &str) -> String {
    if name.ends_with("_total") {
        name.to_string()
    } else {
        format!("{name}_total")
    }
}

fn render_sample_line(name: &str, labels: &[(String, String)], value: f64) -> String {
    let mut rendered = String::new();
    rendered.push_str(name);

    if !labels.is_empty() {
        rendered.push('{');
        for (index, (key, value)) in labels.iter().enumerate() {
            if index > 0 {
                rendered.push(',');
            }
            rendered.push_str(key);
            rendered.push_str("=\"");
            rendered.push_str(&escape_label_value(value));
            rendered.push('"');
        }
        rendered.push('}');
    }

    rendered.push(' ');
    rendered.push_str(&format_metric_value(value));
    rendered.push('\n');
    rendered
}

fn format_metric_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value == f64::INFINITY {
        "+Inf".to_string()
    } else if value == f64::NEG_INFINITY {
        "-Inf".to_string()
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}

fn escape_help(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\n', "\\n")
}

fn escape_label_value(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('\n', "\\n")
        .replace('"', "\\\"")
}
