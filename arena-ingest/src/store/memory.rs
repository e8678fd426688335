//! In-process score store
//!
//! Used for dry runs and tests. Each operation can be switched into a
//! failing mode to exercise the store-unavailable paths.

use super::{InfluencerDirectory, ScoreStore};
use arena_common::db::{ActiveInfluencer, CompetitionEntry};
use arena_common::{Error, Result};
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<(String, String), CompetitionEntry>>,
    influencers: RwLock<BTreeMap<String, String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    fail_influencers: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last registration for a challenge wins
    pub async fn register_influencer(&self, challenge_type: &str, user_id: &str) {
        self.influencers
            .write()
            .await
            .insert(challenge_type.to_string(), user_id.to_string());
    }

    pub async fn entry(&self, user_id: &str, challenge_type: &str) -> Option<CompetitionEntry> {
        self.entries
            .read()
            .await
            .get(&(user_id.to_string(), challenge_type.to_string()))
            .cloned()
    }

    pub async fn entry_count(&self) -> usize {
        self.entries.read().await.len()
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_influencers(&self, fail: bool) {
        self.fail_influencers.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ScoreStore for MemoryStore {
    async fn read_score(&self, user_id: &str, challenge_type: &str) -> Result<f64> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(Error::Internal("score store unavailable".to_string()));
        }

        Ok(self
            .entry(user_id, challenge_type)
            .await
            .map(|e| e.score)
            .unwrap_or(0.0))
    }

    async fn upsert_score(&self, entry: &CompetitionEntry) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Error::Internal("score store unavailable".to_string()));
        }

        self.entries.write().await.insert(
            (entry.user_id.clone(), entry.challenge_type.clone()),
            entry.clone(),
        );
        Ok(())
    }
}

#[async_trait]
impl InfluencerDirectory for MemoryStore {
    async fn list_active_influencers(&self) -> Result<Vec<ActiveInfluencer>> {
        if self.fail_influencers.load(Ordering::SeqCst) {
            return Err(Error::Internal("influencer directory unavailable".to_string()));
        }

        Ok(self
            .influencers
            .read()
            .await
            .iter()
            .map(|(challenge, user)| ActiveInfluencer::new(challenge.clone(), user.clone()))
            .collect())
    }
}
