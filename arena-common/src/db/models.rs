//! Durable record models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Durable score record, unique per (user_id, challenge_type)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionEntry {
    pub user_id: String,
    pub challenge_type: String,
    /// Authoritative ranking field
    pub score: f64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Most recent sample's metric name, value and labels
    pub details: serde_json::Value,
}

/// Contestant currently credited for a challenge by the fan-out source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveInfluencer {
    pub challenge_type: String,
    pub user_id: String,
}

impl ActiveInfluencer {
    pub fn new(challenge_type: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            challenge_type: challenge_type.into(),
            user_id: user_id.into(),
        }
    }
}
