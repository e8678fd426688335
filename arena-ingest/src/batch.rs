//! Ingested batch model
//!
//! A batch arrives already decompressed, as the JSON rendering of a
//! remote-write request. Sample values and timestamps are kept raw here;
//! interpreting them is the extractor's job so that a bad sample never
//! fails the whole batch.

use arena_common::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One ingested collection of time series delivered together
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WriteBatch {
    #[serde(default)]
    pub timeseries: Vec<TimeSeries>,
}

/// Labeled stream of timestamped samples
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub samples: Vec<RawSample>,
}

/// Name/value string pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub value: String,
}

/// Sample as received: value and timestamp may be numbers, strings or missing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawSample {
    #[serde(default)]
    pub value: Option<Value>,
    /// Milliseconds since the Unix epoch
    #[serde(default)]
    pub timestamp: Option<Value>,
}

impl WriteBatch {
    /// Decode a batch body
    ///
    /// Any structural problem rejects the whole batch with [`Error::Decode`].
    pub fn decode(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::Decode(format!("invalid batch: {}", e)))
    }
}

impl Label {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl RawSample {
    pub fn new(value: f64, timestamp_ms: i64) -> Self {
        Self {
            value: serde_json::Number::from_f64(value).map(Value::Number),
            timestamp: Some(Value::from(timestamp_ms)),
        }
    }
}
