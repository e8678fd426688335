//! Bootstrap configuration loaded from TOML
//!
//! Settings sources priority (highest first):
//! 1. Command-line arguments (--port, --database)
//! 2. Environment variables (ARENA_PORT, ARENA_DATABASE, ARENA_CONFIG)
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! Priorities 1 and 2 are applied by the binary on top of the [`TomlConfig`]
//! returned here. A missing TOML file is not an error.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Challenge name used by the fan-out fallback when no influencer is registered
pub const DEFAULT_FALLBACK_CHALLENGE: &str = "robust-service";

/// Bootstrap configuration
///
/// These settings cannot change during runtime. The service must restart
/// to pick up changes to the TOML file.
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Path to SQLite database file (relative or absolute)
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// HTTP bind address
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Ingestion and scoring configuration (optional)
    #[serde(default)]
    pub scoring: ScoringConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Ingestion source names and resolver fallback
#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    /// `job` label of the source that scores on behalf of active influencers
    #[serde(default = "default_fanout_job")]
    pub fanout_job: String,

    /// `job` label of contestant-owned apps (received, never scored)
    #[serde(default = "default_contributor_job")]
    pub contributor_job: String,

    /// Contestant credited when no active influencer can be resolved
    #[serde(default = "default_fallback_user")]
    pub fallback_user: String,

    /// Challenge credited when no active influencer can be resolved
    #[serde(default = "default_fallback_challenge")]
    pub fallback_challenge: String,

    /// Where per-contestant scoring state lives
    #[serde(default)]
    pub state_backend: StateBackend,
}

/// Scoring state backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StateBackend {
    /// Process memory; lost on restart
    #[default]
    Memory,
    /// `scoring_state` table; survives restarts
    Database,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("arena.db")
}

fn default_port() -> u16 {
    3001
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_fanout_job() -> String {
    "url-anvil".to_string()
}

fn default_contributor_job() -> String {
    "contributor-apps".to_string()
}

fn default_fallback_user() -> String {
    "url-anvil-user".to_string()
}

fn default_fallback_challenge() -> String {
    DEFAULT_FALLBACK_CHALLENGE.to_string()
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            port: default_port(),
            bind_address: default_bind_address(),
            logging: LoggingConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            fanout_job: default_fanout_job(),
            contributor_job: default_contributor_job(),
            fallback_user: default_fallback_user(),
            fallback_challenge: default_fallback_challenge(),
            state_backend: StateBackend::default(),
        }
    }
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))
    }

    /// Load configuration from a TOML file
    ///
    /// A missing file logs a warning and yields built-in defaults.
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!(
                "Config file {} not found, using built-in defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config = TomlConfig::from_toml_str("").unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.database_path, PathBuf::from("arena.db"));
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.scoring.fanout_job, "url-anvil");
        assert_eq!(config.scoring.contributor_job, "contributor-apps");
        assert_eq!(config.scoring.fallback_user, "url-anvil-user");
        assert_eq!(config.scoring.fallback_challenge, "robust-service");
        assert_eq!(config.scoring.state_backend, StateBackend::Memory);
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = TomlConfig::from_toml_str(
            r#"
            port = 8080

            [scoring]
            fallback_user = "house"
            state_backend = "database"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_address, "0.0.0.0");
        assert_eq!(config.scoring.fallback_user, "house");
        assert_eq!(config.scoring.fanout_job, "url-anvil");
        assert_eq!(config.scoring.state_backend, StateBackend::Database);
    }

    #[test]
    fn test_invalid_backend_rejected() {
        let result = TomlConfig::from_toml_str("[scoring]\nstate_backend = \"redis\"\n");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
