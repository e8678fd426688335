//! End-to-end ingestion tests
//!
//! Batches go through the coordinator into in-process or SQLite stores.
//! Covers batch ordering, source filtering, fallback resolution, store
//! failures that must not abort a batch, and restart behavior of the two
//! state backends.

use arena_common::config::ScoringConfig;
use arena_ingest::batch::{Label, RawSample, TimeSeries, WriteBatch};
use arena_ingest::coordinator::{BatchSummary, IngestionCoordinator};
use arena_ingest::resolver::ContestantResolver;
use arena_ingest::scoring::{MemoryStateStore, ScoringEngine, SqliteStateStore, StateStore};
use arena_ingest::store::{MemoryStore, ScoreStore, SqliteStore};
use sqlx::sqlite::SqlitePoolOptions;
use std::sync::Arc;

const REQUESTS: &str = "http_request_duration_ms_count";
const START_TIME: &str = "process_start_time_seconds";

fn coordinator(store: Arc<MemoryStore>) -> IngestionCoordinator {
    coordinator_with_states(store, Arc::new(MemoryStateStore::new()))
}

fn coordinator_with_states(
    store: Arc<MemoryStore>,
    states: Arc<dyn StateStore>,
) -> IngestionCoordinator {
    let config = ScoringConfig::default();
    let resolver = ContestantResolver::new(store.clone(), &config);
    let engine = ScoringEngine::new(store, states);
    IngestionCoordinator::new(resolver, engine, &config)
}

fn series(job: &str, metric: &str, samples: &[(f64, i64)]) -> TimeSeries {
    TimeSeries {
        labels: vec![Label::new("__name__", metric), Label::new("job", job)],
        samples: samples
            .iter()
            .map(|(value, secs)| RawSample::new(*value, secs * 1000))
            .collect(),
    }
}

fn batch(series: Vec<TimeSeries>) -> WriteBatch {
    WriteBatch { timeseries: series }
}

async fn score(store: &MemoryStore, user: &str, challenge: &str) -> f64 {
    store.read_score(user, challenge).await.unwrap()
}

#[tokio::test]
async fn test_counter_scenario_zero_to_120() {
    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(store.clone());

    let summary = coordinator
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(120.0, 1_000)])]))
        .await;

    assert_eq!(
        summary,
        BatchSummary {
            series: 1,
            samples: 1,
            scored: 1,
            failed: 0
        }
    );
    assert!((score(&store, "url-anvil-user", "robust-service").await - 12.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_samples_scored_in_batch_order_across_batches() {
    let store = Arc::new(MemoryStore::new());
    store.register_influencer("robust-service", "alice").await;
    let coordinator = coordinator(store.clone());

    coordinator
        .ingest(&batch(vec![
            series("url-anvil", REQUESTS, &[(10.0, 1), (40.0, 2)]),
            series("url-anvil", REQUESTS, &[(5.0, 3)]),
        ]))
        .await;
    coordinator
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(25.0, 4)])]))
        .await;

    // 10 → +1, 40 → +3, reset to 5 → +0, 25 → +2
    assert!((score(&store, "alice", "robust-service").await - 6.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_longest_upkeep_scenario() {
    let store = Arc::new(MemoryStore::new());
    store.register_influencer("longest-upkeep", "carol").await;
    let coordinator = coordinator(store.clone());

    coordinator
        .ingest(&batch(vec![series(
            "url-anvil",
            START_TIME,
            &[(1000.0, 1000), (1000.0, 1050)],
        )]))
        .await;
    assert_eq!(score(&store, "carol", "longest-upkeep").await, 50.0);

    coordinator
        .ingest(&batch(vec![series("url-anvil", START_TIME, &[(1100.0, 1110)])]))
        .await;
    assert_eq!(score(&store, "carol", "longest-upkeep").await, 50.0);
}

#[tokio::test]
async fn test_only_matching_metric_scores_each_challenge() {
    let store = Arc::new(MemoryStore::new());
    store.register_influencer("robust-service", "alice").await;
    store.register_influencer("longest-upkeep", "carol").await;
    let coordinator = coordinator(store.clone());

    let summary = coordinator
        .ingest(&batch(vec![
            series("url-anvil", REQUESTS, &[(200.0, 1_000)]),
            series("url-anvil", START_TIME, &[(900.0, 1_000)]),
            series("url-anvil", "process_cpu_seconds_total", &[(3.0, 1_000)]),
        ]))
        .await;

    assert_eq!(summary.samples, 3);
    assert_eq!(summary.scored, 2);
    assert!((score(&store, "alice", "robust-service").await - 20.0).abs() < 1e-9);
    assert_eq!(score(&store, "carol", "longest-upkeep").await, 100.0);
    assert_eq!(store.entry_count().await, 2);
}

#[tokio::test]
async fn test_unrecognized_jobs_ignored() {
    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(store.clone());

    let mut unlabeled = series("url-anvil", REQUESTS, &[(10.0, 1)]);
    unlabeled.labels.retain(|l| l.name != "job");

    let summary = coordinator
        .ingest(&batch(vec![
            series("node-exporter", REQUESTS, &[(10.0, 1)]),
            unlabeled,
            series("contributor-apps", REQUESTS, &[(10.0, 1)]),
            TimeSeries::default(),
        ]))
        .await;

    assert_eq!(summary.series, 1);
    assert_eq!(summary.samples, 1);
    assert_eq!(summary.scored, 0);
    assert_eq!(store.entry_count().await, 0);
}

#[tokio::test]
async fn test_absent_values_skipped() {
    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(store.clone());

    let mut ts = series("url-anvil", REQUESTS, &[(50.0, 1)]);
    ts.samples.insert(
        0,
        RawSample {
            value: Some(serde_json::json!("NaN")),
            timestamp: None,
        },
    );

    let summary = coordinator.ingest(&batch(vec![ts])).await;

    assert_eq!(summary.samples, 2);
    assert_eq!(summary.scored, 1);
    assert!((score(&store, "url-anvil-user", "robust-service").await - 5.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_store_failure_does_not_abort_batch() {
    let store = Arc::new(MemoryStore::new());
    store.register_influencer("robust-service", "alice").await;
    let coordinator = coordinator(store.clone());

    store.set_fail_writes(true);
    let failed = coordinator
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(100.0, 1), (120.0, 2)])]))
        .await;
    assert_eq!(failed.failed, 2);
    assert_eq!(failed.scored, 0);

    store.set_fail_writes(false);
    let recovered = coordinator
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(150.0, 3)])]))
        .await;
    assert_eq!(recovered.scored, 1);
    // Unpersisted steps still advanced the baseline to 120
    assert!((score(&store, "alice", "robust-service").await - 3.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_influencer_directory_failure_uses_fallback() {
    let store = Arc::new(MemoryStore::new());
    store.register_influencer("robust-service", "alice").await;
    store.set_fail_influencers(true);
    let coordinator = coordinator(store.clone());

    let summary = coordinator
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(30.0, 1)])]))
        .await;

    assert_eq!(summary.scored, 1);
    assert!((score(&store, "url-anvil-user", "robust-service").await - 3.0).abs() < 1e-9);
    assert_eq!(score(&store, "alice", "robust-service").await, 0.0);
}

#[tokio::test]
async fn test_ingest_bytes_rejects_malformed_batch() {
    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(store.clone());

    let result = coordinator.ingest_bytes(b"{\"timeseries\": [").await;

    assert!(matches!(result, Err(arena_common::Error::Decode(_))));
    assert_eq!(store.entry_count().await, 0);
}

#[tokio::test]
async fn test_memory_state_lost_across_restart() {
    let store = Arc::new(MemoryStore::new());

    coordinator(store.clone())
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(100.0, 1)])]))
        .await;
    coordinator(store.clone())
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(110.0, 2)])]))
        .await;

    // Second process starts from baseline 0 and credits the whole counter again
    assert!((score(&store, "url-anvil-user", "robust-service").await - 21.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_database_state_survives_restart() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    arena_common::db::create_schema(&pool).await.unwrap();
    let store = Arc::new(MemoryStore::new());

    coordinator_with_states(store.clone(), Arc::new(SqliteStateStore::new(pool.clone())))
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(100.0, 1)])]))
        .await;
    coordinator_with_states(store.clone(), Arc::new(SqliteStateStore::new(pool)))
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(110.0, 2)])]))
        .await;

    assert!((score(&store, "url-anvil-user", "robust-service").await - 11.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_sqlite_store_end_to_end() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    arena_common::db::create_schema(&pool).await.unwrap();
    let store = SqliteStore::new(pool);
    store.register_influencer("robust-service", "alice").await.unwrap();
    store.register_influencer("robust-service", "bob").await.unwrap();

    let config = ScoringConfig::default();
    let store = Arc::new(store);
    let coordinator = IngestionCoordinator::new(
        ContestantResolver::new(store.clone(), &config),
        ScoringEngine::new(store.clone(), Arc::new(MemoryStateStore::new())),
        &config,
    );

    coordinator
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(70.0, 1)])]))
        .await;

    let board = store.leaderboard("robust-service", 20).await.unwrap();
    assert_eq!(board.len(), 1);
    assert_eq!(board[0].user_id, "bob");
    assert!((board[0].score - 7.0).abs() < 1e-9);
    assert_eq!(board[0].start_time.timestamp(), 1);
}

#[tokio::test]
async fn test_explicit_state_reset() {
    let store = Arc::new(MemoryStore::new());
    let coordinator = coordinator(store.clone());

    coordinator
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(100.0, 1)])]))
        .await;
    coordinator.engine().reset_state().await.unwrap();
    coordinator
        .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(100.0, 2)])]))
        .await;

    assert!((score(&store, "url-anvil-user", "robust-service").await - 20.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_infinite_value_does_not_poison_persisted_state() {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    arena_common::db::create_schema(&pool).await.unwrap();
    let store = Arc::new(MemoryStore::new());
    let coordinator =
        coordinator_with_states(store.clone(), Arc::new(SqliteStateStore::new(pool)));

    let body = r#"{"timeseries": [{
        "labels": [
            {"name": "__name__", "value": "http_request_duration_ms_count"},
            {"name": "job", "value": "url-anvil"}
        ],
        "samples": [{"value": "Infinity", "timestamp": 1000}]
    }]}"#;
    let summary = coordinator.ingest_bytes(body.as_bytes()).await.unwrap();
    assert_eq!(summary.scored, 0);
    assert_eq!(store.entry_count().await, 0);

    for (value, secs) in [(10.0, 2), (20.0, 3), (30.0, 4)] {
        let summary = coordinator
            .ingest(&batch(vec![series("url-anvil", REQUESTS, &[(value, secs)])]))
            .await;
        assert_eq!(summary.scored, 1);
        assert_eq!(summary.failed, 0);
    }

    let total = score(&store, "url-anvil-user", "robust-service").await;
    assert!(total.is_finite());
    assert!((total - 3.0).abs() < 1e-9);
}
