//! Label extraction
//!
//! Turns a decoded [`TimeSeries`] into a label map plus normalized samples.
//! Unparsable values become `None` and missing or invalid timestamps are
//! replaced by the supplied `now`; neither is an error.

use crate::batch::{RawSample, TimeSeries};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::warn;

/// Label carrying the metric name
pub const METRIC_NAME_LABEL: &str = "__name__";

/// Label identifying the ingestion source
pub const JOB_LABEL: &str = "job";

/// Label name → value, last write wins
pub type Labels = BTreeMap<String, String>;

/// Normalized sample
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub metric_name: String,
    /// `None` when the received value was missing, NaN or not numeric
    pub value: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

/// Series after extraction
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSeries {
    pub labels: Labels,
    pub samples: Vec<Sample>,
}

impl ExtractedSeries {
    pub fn job(&self) -> Option<&str> {
        self.labels.get(JOB_LABEL).map(String::as_str)
    }

    pub fn metric_name(&self) -> &str {
        self.labels
            .get(METRIC_NAME_LABEL)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Extract labels and samples from one series
pub fn extract(series: &TimeSeries, now: DateTime<Utc>) -> ExtractedSeries {
    let labels: Labels = series
        .labels
        .iter()
        .map(|label| (label.name.clone(), label.value.clone()))
        .collect();

    let metric_name = labels
        .get(METRIC_NAME_LABEL)
        .cloned()
        .unwrap_or_default();

    let samples = series
        .samples
        .iter()
        .map(|raw| normalize_sample(&metric_name, raw, now))
        .collect();

    ExtractedSeries { labels, samples }
}

fn normalize_sample(metric_name: &str, raw: &RawSample, now: DateTime<Utc>) -> Sample {
    let timestamp = match raw.timestamp.as_ref().and_then(parse_timestamp) {
        Some(ts) => ts,
        None => {
            warn!(
                "Invalid or missing timestamp for metric {}. Using current time.",
                metric_name
            );
            now
        }
    };

    Sample {
        metric_name: metric_name.to_string(),
        value: raw.value.as_ref().and_then(parse_value),
        timestamp,
    }
}

fn parse_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;

    // NaN and infinities carry no usable observation
    parsed.is_finite().then_some(parsed)
}

/// Milliseconds since epoch; zero counts as missing
fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let millis = match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }?;

    if millis == 0 {
        return None;
    }

    Utc.timestamp_millis_opt(millis).single()
}
