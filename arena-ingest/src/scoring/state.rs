//! Scoring state stores
//!
//! [`ScoringState`] is derived data needed to compute the next score update
//! for one (contestant, challenge) pair. It is not the score itself. An entry
//! is created lazily on the first observed sample and never removed except by
//! an explicit [`StateStore::reset`].

use super::challenge::Challenge;
use arena_common::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// State key: one entry per (user_id, challenge_type)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StateKey {
    pub user_id: String,
    pub challenge_type: String,
}

impl StateKey {
    pub fn new(user_id: impl Into<String>, challenge: &Challenge) -> Self {
        Self {
            user_id: user_id.into(),
            challenge_type: challenge.as_str().to_string(),
        }
    }
}

/// Challenge-dependent auxiliary state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringState {
    /// Request counter challenges
    Counter { last_observed: f64 },
    /// Longest uptime challenge
    Upkeep {
        current_up_start_time: Option<f64>,
        max_up_duration: f64,
    },
    /// Challenges without a rule; nothing to remember
    Unscored,
}

impl ScoringState {
    /// State before any observation
    pub fn initial_for(challenge: &Challenge) -> Self {
        match challenge {
            Challenge::RobustService | Challenge::CrashChallenge => {
                ScoringState::Counter { last_observed: 0.0 }
            }
            Challenge::LongestUpkeep => ScoringState::Upkeep {
                current_up_start_time: None,
                max_up_duration: 0.0,
            },
            Challenge::Other(_) => ScoringState::Unscored,
        }
    }

    /// Whether this state has the shape `challenge` needs
    pub fn fits(&self, challenge: &Challenge) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(&Self::initial_for(challenge))
    }
}

/// Keyed storage for [`ScoringState`]
///
/// Implementations need not serialize access per key; the scoring engine
/// does that.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn load(&self, key: &StateKey) -> Result<Option<ScoringState>>;

    async fn save(&self, key: &StateKey, state: &ScoringState) -> Result<()>;

    /// Forget every entry
    async fn reset(&self) -> Result<()>;
}

/// Process-memory state; lost on restart
#[derive(Default)]
pub struct MemoryStateStore {
    entries: RwLock<HashMap<StateKey, ScoringState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn load(&self, key: &StateKey) -> Result<Option<ScoringState>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &StateKey, state: &ScoringState) -> Result<()> {
        self.entries.write().await.insert(key.clone(), state.clone());
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}

/// State persisted as JSON in the `scoring_state` table
///
/// Survives restarts, so the first observation after a restart is scored
/// against the real previous baseline.
#[derive(Clone)]
pub struct SqliteStateStore {
    pool: SqlitePool,
}

impl SqliteStateStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StateStore for SqliteStateStore {
    async fn load(&self, key: &StateKey) -> Result<Option<ScoringState>> {
        let raw: Option<String> = sqlx::query_scalar(
            "SELECT state FROM scoring_state WHERE user_id = ? AND challenge_type = ?",
        )
        .bind(&key.user_id)
        .bind(&key.challenge_type)
        .fetch_optional(&self.pool)
        .await?;

        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn save(&self, key: &StateKey, state: &ScoringState) -> Result<()> {
        let json = serde_json::to_string(state)?;

        sqlx::query(
            r#"
            INSERT INTO scoring_state (user_id, challenge_type, state, updated_at)
            VALUES (?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(user_id, challenge_type) DO UPDATE SET
                state = excluded.state,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&key.user_id)
        .bind(&key.challenge_type)
        .bind(json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        sqlx::query("DELETE FROM scoring_state")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
