//! Ingestion coordinator
//!
//! Drives one batch through extract → resolve → score → persist, strictly in
//! batch order. Only an undecodable batch is reported to the caller; store
//! failures and bad samples are logged and skipped.

use crate::batch::WriteBatch;
use crate::extractor::{self, ExtractedSeries};
use crate::resolver::ContestantResolver;
use crate::scoring::ScoringEngine;
use arena_common::config::ScoringConfig;
use arena_common::Result;
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info};

/// Work done for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Series from a recognized source
    pub series: usize,
    /// Samples visited in those series
    pub samples: usize,
    /// Scoring steps persisted
    pub scored: usize,
    /// Scoring steps abandoned after a store failure
    pub failed: usize,
}

pub struct IngestionCoordinator {
    resolver: ContestantResolver,
    engine: ScoringEngine,
    fanout_job: String,
    contributor_job: String,
}

impl IngestionCoordinator {
    pub fn new(resolver: ContestantResolver, engine: ScoringEngine, config: &ScoringConfig) -> Self {
        Self {
            resolver,
            engine,
            fanout_job: config.fanout_job.clone(),
            contributor_job: config.contributor_job.clone(),
        }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Decode and ingest a batch body
    ///
    /// A decode failure aborts before any state is touched.
    pub async fn ingest_bytes(&self, body: &[u8]) -> Result<BatchSummary> {
        let batch = WriteBatch::decode(body)?;
        Ok(self.ingest(&batch).await)
    }

    /// Ingest a decoded batch
    pub async fn ingest(&self, batch: &WriteBatch) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for series in &batch.timeseries {
            let extracted = extractor::extract(series, Utc::now());

            if !self.is_recognized(&extracted) {
                debug!(
                    "Ignoring series {} from job {:?}",
                    extracted.metric_name(),
                    extracted.job()
                );
                continue;
            }

            summary.series += 1;
            self.ingest_series(&extracted, &mut summary).await;
        }

        if summary.scored > 0 || summary.failed > 0 {
            info!(
                "Batch processed: {} series, {} samples, {} scored, {} failed",
                summary.series, summary.samples, summary.scored, summary.failed
            );
        }

        summary
    }

    fn is_recognized(&self, series: &ExtractedSeries) -> bool {
        matches!(series.job(), Some(job) if job == self.fanout_job || job == self.contributor_job)
    }

    async fn ingest_series(&self, series: &ExtractedSeries, summary: &mut BatchSummary) {
        for sample in &series.samples {
            summary.samples += 1;

            let targets = self.resolver.resolve(&series.labels).await;

            for target in targets {
                let Some(user_id) = target.user_id.as_deref() else {
                    debug!(
                        "Received unscored metric {} = {:?} from job {:?}",
                        sample.metric_name,
                        sample.value,
                        series.job()
                    );
                    continue;
                };

                if !target.challenge.scores_metric(&sample.metric_name) {
                    continue;
                }

                match self
                    .engine
                    .score(user_id, &target.challenge, sample, &series.labels)
                    .await
                {
                    Ok(Some(_)) => summary.scored += 1,
                    Ok(None) => {}
                    Err(e) => {
                        summary.failed += 1;
                        error!(
                            "Error scoring {} for {} ({}): {}",
                            sample.metric_name, user_id, target.challenge, e
                        );
                    }
                }
            }
        }
    }
}
