//! arena-ingest - Metrics ingestion and scoring service
//!
//! Receives decoded metric batches from the monitoring pipeline and keeps
//! the challenge leaderboard scores current.

use anyhow::Result;
use arena_common::config::TomlConfig;
use arena_common::db::init_database;
use arena_ingest::store::SqliteStore;
use arena_ingest::{build_router, AppState};
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "arena-ingest")]
#[command(about = "Metrics ingestion and scoring service")]
#[command(version)]
struct Args {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "arena.toml", env = "ARENA_CONFIG")]
    config: PathBuf,

    /// Port to listen on (overrides config)
    #[arg(short, long, env = "ARENA_PORT")]
    port: Option<u16>,

    /// SQLite database path (overrides config)
    #[arg(short, long, env = "ARENA_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = TomlConfig::load(&args.config)?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(database) = args.database {
        config.database_path = database;
    }

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .init();

    info!(
        "Starting arena-ingest v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    if !args.config.exists() {
        warn!("Config file {} not found, using defaults", args.config.display());
    }

    info!("Database path: {}", config.database_path.display());
    let pool = init_database(&config.database_path).await?;

    info!(
        "Fan-out source '{}', fallback {} ({}), state backend {:?}",
        config.scoring.fanout_job,
        config.scoring.fallback_user,
        config.scoring.fallback_challenge,
        config.scoring.state_backend
    );

    let state = AppState::from_store(SqliteStore::new(pool), &config.scoring);
    let app = build_router(state);

    let addr = format!("{}:{}", config.bind_address, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("arena-ingest listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
