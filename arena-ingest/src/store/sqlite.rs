//! SQLite-backed score store

use super::{InfluencerDirectory, ScoreStore};
use arena_common::db::{ActiveInfluencer, CompetitionEntry};
use arena_common::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

/// Score store over the `competition_entries` and `active_influencers` tables
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Register `user_id` as the active influencer for a challenge
    ///
    /// At most one contestant per challenge; the last registration wins.
    pub async fn register_influencer(&self, challenge_type: &str, user_id: &str) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO active_influencers (challenge_type, user_id, timestamp)
            VALUES (?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(challenge_type) DO UPDATE SET
                user_id = excluded.user_id,
                timestamp = CURRENT_TIMESTAMP
            "#,
        )
        .bind(challenge_type)
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Top `limit` entries of a challenge by score, highest first
    pub async fn leaderboard(
        &self,
        challenge_type: &str,
        limit: u32,
    ) -> Result<Vec<CompetitionEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT user_id, challenge_type, score, start_time, end_time, details
            FROM competition_entries
            WHERE challenge_type = ?
            ORDER BY score DESC
            LIMIT ?
            "#,
        )
        .bind(challenge_type)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<CompetitionEntry> {
                let details: Option<String> = row.try_get("details")?;
                Ok(CompetitionEntry {
                    user_id: row.try_get("user_id")?,
                    challenge_type: row.try_get("challenge_type")?,
                    score: row.try_get("score")?,
                    start_time: row.try_get::<DateTime<Utc>, _>("start_time")?,
                    end_time: row.try_get::<DateTime<Utc>, _>("end_time")?,
                    details: details
                        .and_then(|d| serde_json::from_str(&d).ok())
                        .unwrap_or(serde_json::Value::Null),
                })
            })
            .collect()
    }
}

#[async_trait]
impl ScoreStore for SqliteStore {
    async fn read_score(&self, user_id: &str, challenge_type: &str) -> Result<f64> {
        let score: Option<f64> = sqlx::query_scalar(
            "SELECT score FROM competition_entries WHERE user_id = ? AND challenge_type = ?",
        )
        .bind(user_id)
        .bind(challenge_type)
        .fetch_optional(&self.pool)
        .await?;

        Ok(score.unwrap_or(0.0))
    }

    async fn upsert_score(&self, entry: &CompetitionEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO competition_entries
                (user_id, challenge_type, score, start_time, end_time, details, timestamp)
            VALUES (?, ?, ?, ?, ?, ?, CURRENT_TIMESTAMP)
            ON CONFLICT(user_id, challenge_type) DO UPDATE SET
                score = excluded.score,
                start_time = excluded.start_time,
                end_time = excluded.end_time,
                details = excluded.details,
                timestamp = CURRENT_TIMESTAMP
            "#,
        )
        .bind(&entry.user_id)
        .bind(&entry.challenge_type)
        .bind(entry.score)
        .bind(entry.start_time)
        .bind(entry.end_time)
        .bind(entry.details.to_string())
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl InfluencerDirectory for SqliteStore {
    async fn list_active_influencers(&self) -> Result<Vec<ActiveInfluencer>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT challenge_type, user_id FROM active_influencers ORDER BY challenge_type",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(challenge_type, user_id)| ActiveInfluencer {
                challenge_type,
                user_id,
            })
            .collect())
    }
}
