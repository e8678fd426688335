//! arena-ingest library
//!
//! Metrics ingestion and incremental scoring: decoded batches of time series
//! are resolved to (contestant, challenge) pairs and scored into the
//! leaderboard store.

pub mod api;
pub mod batch;
pub mod coordinator;
pub mod error;
pub mod extractor;
pub mod resolver;
pub mod scoring;
pub mod store;

pub use crate::error::{ApiError, ApiResult};

use arena_common::config::{ScoringConfig, StateBackend};
use axum::Router;
use chrono::{DateTime, Utc};
use coordinator::IngestionCoordinator;
use resolver::ContestantResolver;
use scoring::{MemoryStateStore, ScoringEngine, SqliteStateStore, StateStore};
use std::sync::Arc;
use store::SqliteStore;
use tower_http::trace::TraceLayer;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<IngestionCoordinator>,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(coordinator: Arc<IngestionCoordinator>) -> Self {
        Self {
            coordinator,
            startup_time: Utc::now(),
        }
    }

    /// Wire the coordinator to a SQLite store
    pub fn from_store(store: SqliteStore, config: &ScoringConfig) -> Self {
        let states: Arc<dyn StateStore> = match config.state_backend {
            StateBackend::Memory => Arc::new(MemoryStateStore::new()),
            StateBackend::Database => Arc::new(SqliteStateStore::new(store.pool().clone())),
        };
        let store = Arc::new(store);

        let resolver = ContestantResolver::new(store.clone(), config);
        let engine = ScoringEngine::new(store, states);
        Self::new(Arc::new(IngestionCoordinator::new(resolver, engine, config)))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::metrics_routes())
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
