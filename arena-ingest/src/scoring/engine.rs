//! Scoring engine
//!
//! Applies the challenge rules to samples and persists the resulting score.
//! Each (contestant, challenge) step runs under that key's lock:
//! read score → load state → apply rule → save state → upsert score.
//! Concurrent batches touching the same key are serialized, different keys
//! proceed independently.

use super::challenge::Challenge;
use super::rules::{self, Points};
use super::state::{ScoringState, StateKey, StateStore};
use crate::extractor::{Labels, Sample};
use crate::store::ScoreStore;
use arena_common::db::CompetitionEntry;
use arena_common::Result;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

/// Result of one persisted scoring step
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreUpdate {
    pub user_id: String,
    pub challenge: Challenge,
    pub points: Points,
    pub previous_score: f64,
    pub new_score: f64,
}

pub struct ScoringEngine {
    scores: Arc<dyn ScoreStore>,
    states: Arc<dyn StateStore>,
    /// Per-key serialization of read-modify-write steps
    locks: Mutex<HashMap<StateKey, Arc<Mutex<()>>>>,
}

impl ScoringEngine {
    pub fn new(scores: Arc<dyn ScoreStore>, states: Arc<dyn StateStore>) -> Self {
        Self {
            scores,
            states,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Score one sample for `user_id` in `challenge`
    ///
    /// Returns `Ok(None)` when the sample is not relevant (metric mismatch or
    /// absent value). On a score read failure nothing is mutated. On an
    /// upsert failure the scoring state has already advanced; that window is
    /// accepted and not rolled back.
    pub async fn score(
        &self,
        user_id: &str,
        challenge: &Challenge,
        sample: &Sample,
        labels: &Labels,
    ) -> Result<Option<ScoreUpdate>> {
        if let Some(metric) = challenge.metric() {
            if metric != sample.metric_name {
                debug!(
                    "Skipping metric {} for {} ({}): challenge scores {}",
                    sample.metric_name, user_id, challenge, metric
                );
                return Ok(None);
            }
        }

        let value = match sample.value {
            Some(value) => value,
            None => {
                debug!(
                    "Skipping absent value of {} for {} ({})",
                    sample.metric_name, user_id, challenge
                );
                return Ok(None);
            }
        };

        let key = StateKey::new(user_id, challenge);
        let lock = self.key_lock(&key).await;
        let _guard = lock.lock().await;

        let previous_score = self.scores.read_score(user_id, challenge.as_str()).await?;

        let mut state = self
            .states
            .load(&key)
            .await?
            .filter(|state| state.fits(challenge))
            .unwrap_or_else(|| ScoringState::initial_for(challenge));

        let points = rules::apply(challenge, &mut state, value, sample.timestamp);
        self.states.save(&key, &state).await?;

        let new_score = points.combine(previous_score);
        let entry = CompetitionEntry {
            user_id: user_id.to_string(),
            challenge_type: challenge.as_str().to_string(),
            score: new_score,
            start_time: sample.timestamp,
            end_time: sample.timestamp,
            details: json!({
                "metric": sample.metric_name,
                "value": value,
                "labels": labels,
            }),
        };
        self.scores.upsert_score(&entry).await?;

        info!("Score for {} ({}) updated: {}", user_id, challenge, new_score);

        Ok(Some(ScoreUpdate {
            user_id: user_id.to_string(),
            challenge: challenge.clone(),
            points,
            previous_score,
            new_score,
        }))
    }

    /// Drop all scoring state
    ///
    /// Waits for in-flight steps on every key and blocks new ones until the
    /// reset is done. The next observation for every key starts from the
    /// initial state.
    pub async fn reset_state(&self) -> Result<()> {
        let locks = self.locks.lock().await;
        let key_locks: Vec<_> = locks.values().cloned().collect();

        let mut guards = Vec::with_capacity(key_locks.len());
        for lock in &key_locks {
            guards.push(lock.lock().await);
        }

        self.states.reset().await?;
        info!("Scoring state reset ({} keys)", key_locks.len());
        Ok(())
    }

    async fn key_lock(&self, key: &StateKey) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().await;
        locks.entry(key.clone()).or_default().clone()
    }
}
