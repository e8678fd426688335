//! Score store and influencer directory contracts
//!
//! The durable store is owned elsewhere; the ingestion core only reads the
//! current score before writing and upserts the new total.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use arena_common::db::{ActiveInfluencer, CompetitionEntry};
use arena_common::Result;
use async_trait::async_trait;

/// Read-before-write access to [`CompetitionEntry`] rows
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Current score for the pair, `0.0` when no entry exists
    async fn read_score(&self, user_id: &str, challenge_type: &str) -> Result<f64>;

    /// Create or replace the entry keyed by (user_id, challenge_type)
    ///
    /// The record's `timestamp` is refreshed to now on every call.
    async fn upsert_score(&self, entry: &CompetitionEntry) -> Result<()>;
}

/// Read-only view of the challenge → contestant registrations
#[async_trait]
pub trait InfluencerDirectory: Send + Sync {
    async fn list_active_influencers(&self) -> Result<Vec<ActiveInfluencer>>;
}
