//! Backend configuration module.
//!
//! Configuration is loaded from environment variables with fallback to defaults.

use sales_db::DbConfig;
use serde::{Deserialize, Serialize};
use std::env;

/// Default `RUST_LOG` filter when none is set.
pub const DEFAULT_LOG_FILTER: &str = "info,sales=debug,sqlx=warn";

/// Backend configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file
    pub db_path: String,

    /// Pool size
    pub db_max_connections: u32,

    /// Apply embedded migrations on startup
    pub run_migrations: bool,

    /// Prefix for event topics, e.g. `sales` gives `sales.sale.created`
    pub event_topic_prefix: String,

    /// tracing-subscriber filter directive
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AppConfig {
            db_path: lookup("SALES_DB_PATH").unwrap_or_else(|| "./sales.db".to_string()),

            db_max_connections: lookup("SALES_DB_MAX_CONNECTIONS")
                .unwrap_or_else(|| "5".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SALES_DB_MAX_CONNECTIONS".to_string()))?,

            run_migrations: lookup("SALES_RUN_MIGRATIONS")
                .unwrap_or_else(|| "true".to_string())
                .parse()
                .map_err(|_| ConfigError::InvalidValue("SALES_RUN_MIGRATIONS".to_string()))?,

            event_topic_prefix: lookup("SALES_EVENT_TOPIC_PREFIX")
                .unwrap_or_else(|| "sales".to_string()),

            log_filter: lookup("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string()),
        };

        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "SALES_DB_MAX_CONNECTIONS".to_string(),
            ));
        }

        if config.event_topic_prefix.trim().is_empty() {
            return Err(ConfigError::InvalidValue(
                "SALES_EVENT_TOPIC_PREFIX".to_string(),
            ));
        }

        Ok(config)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.db_path)
            .max_connections(self.db_max_connections)
            .run_migrations(self.run_migrations)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
