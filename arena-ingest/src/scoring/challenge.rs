//! Challenge names and the metric each one scores

use std::fmt;

/// Monotonic request counter exported by the monitored service
pub const REQUEST_COUNT_METRIC: &str = "http_request_duration_ms_count";

/// Process start time in seconds since epoch
pub const PROCESS_START_METRIC: &str = "process_start_time_seconds";

/// Challenge assigned to series that are received but not scored
pub const DEFAULT_CHALLENGE: &str = "default-challenge";

/// Named competition category
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Challenge {
    RobustService,
    CrashChallenge,
    LongestUpkeep,
    /// Any unrecognized name; scored by the random filler
    Other(String),
}

impl Challenge {
    pub fn parse(name: &str) -> Self {
        match name {
            "robust-service" => Challenge::RobustService,
            "crash-challenge" => Challenge::CrashChallenge,
            "longest-upkeep" => Challenge::LongestUpkeep,
            other => Challenge::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Challenge::RobustService => "robust-service",
            Challenge::CrashChallenge => "crash-challenge",
            Challenge::LongestUpkeep => "longest-upkeep",
            Challenge::Other(name) => name,
        }
    }

    /// Metric this challenge scores, `None` for unrecognized challenges
    pub fn metric(&self) -> Option<&'static str> {
        match self {
            Challenge::RobustService | Challenge::CrashChallenge => Some(REQUEST_COUNT_METRIC),
            Challenge::LongestUpkeep => Some(PROCESS_START_METRIC),
            Challenge::Other(_) => None,
        }
    }

    /// Whether `metric_name` is the metric this challenge is scored on
    pub fn scores_metric(&self, metric_name: &str) -> bool {
        self.metric() == Some(metric_name)
    }

    /// Absolute challenges overwrite the persisted score instead of adding to it
    pub fn is_absolute(&self) -> bool {
        matches!(self, Challenge::LongestUpkeep)
    }
}

impl fmt::Display for Challenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Challenge {
    fn from(name: &str) -> Self {
        Challenge::parse(name)
    }
}
