//! Contestant resolution
//!
//! Maps a series' labels to the (contestant, challenge) pairs its samples are
//! scored against. The strategy is chosen by the `job` label: the fan-out
//! source credits every active influencer, any other source yields a single
//! unscored pair.

use crate::extractor::{Labels, JOB_LABEL};
use crate::scoring::challenge::{Challenge, DEFAULT_CHALLENGE};
use crate::store::InfluencerDirectory;
use arena_common::config::ScoringConfig;
use std::sync::Arc;
use tracing::warn;

/// One scoring target; `user_id` is `None` for "received, not scored"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringTarget {
    pub user_id: Option<String>,
    pub challenge: Challenge,
}

impl ScoringTarget {
    pub fn new(user_id: Option<String>, challenge: Challenge) -> Self {
        Self { user_id, challenge }
    }
}

/// Resolution strategy selected by the source label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceStrategy {
    /// Not scored toward the leaderboard
    Default,
    /// Scored on behalf of all active influencers
    InfluencerFanout,
}

pub struct ContestantResolver {
    directory: Arc<dyn InfluencerDirectory>,
    fanout_job: String,
    fallback_user: String,
    fallback_challenge: Challenge,
}

impl ContestantResolver {
    pub fn new(directory: Arc<dyn InfluencerDirectory>, config: &ScoringConfig) -> Self {
        Self {
            directory,
            fanout_job: config.fanout_job.clone(),
            fallback_user: config.fallback_user.clone(),
            fallback_challenge: Challenge::parse(&config.fallback_challenge),
        }
    }

    pub fn strategy_for(&self, labels: &Labels) -> SourceStrategy {
        match labels.get(JOB_LABEL) {
            Some(job) if *job == self.fanout_job => SourceStrategy::InfluencerFanout,
            _ => SourceStrategy::Default,
        }
    }

    /// Resolve scoring targets for a series
    ///
    /// Never fails: directory errors and empty registrations both degrade to
    /// the configured fallback contestant. Holds no state, so resolving the
    /// same labels twice gives the same answer for the same directory.
    pub async fn resolve(&self, labels: &Labels) -> Vec<ScoringTarget> {
        match self.strategy_for(labels) {
            SourceStrategy::Default => vec![ScoringTarget::new(
                None,
                Challenge::parse(DEFAULT_CHALLENGE),
            )],
            SourceStrategy::InfluencerFanout => self.resolve_fanout().await,
        }
    }

    async fn resolve_fanout(&self) -> Vec<ScoringTarget> {
        match self.directory.list_active_influencers().await {
            Ok(influencers) if !influencers.is_empty() => influencers
                .into_iter()
                .map(|influencer| {
                    ScoringTarget::new(
                        Some(influencer.user_id),
                        Challenge::parse(&influencer.challenge_type),
                    )
                })
                .collect(),
            Ok(_) => vec![self.fallback()],
            Err(e) => {
                warn!(
                    "Error fetching active influencers for {}, crediting {}: {}",
                    self.fanout_job, self.fallback_user, e
                );
                vec![self.fallback()]
            }
        }
    }

    fn fallback(&self) -> ScoringTarget {
        ScoringTarget::new(
            Some(self.fallback_user.clone()),
            self.fallback_challenge.clone(),
        )
    }
}
