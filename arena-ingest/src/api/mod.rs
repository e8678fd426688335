//! HTTP API handlers for arena-ingest

pub mod health;
pub mod metrics;

pub use health::health_routes;
pub use metrics::metrics_routes;
