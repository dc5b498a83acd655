//! Match engine configuration loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::outbound::persistence::PoolConfig;

const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_MIN_IDLE: u32 = 2;
const DEFAULT_CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Configuration values for the match engine, read once at startup.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CATS_MATCH")]
pub struct MatchEngineSettings {
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_max_size: Option<u32>,
    /// Idle connections the pool keeps open.
    pub pool_min_idle: Option<u32>,
    /// Seconds to wait for a pooled connection.
    pub connection_timeout_secs: Option<u64>,
    /// Apply embedded migrations before running the command.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
}

impl MatchEngineSettings {
    /// Return the configured pool size, falling back to the default.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Return the configured idle floor, never above the pool size.
    pub fn pool_min_idle(&self) -> u32 {
        self.pool_min_idle
            .unwrap_or(DEFAULT_POOL_MIN_IDLE)
            .min(self.pool_max_size())
    }

    /// Return the configured checkout timeout, falling back to the default.
    pub fn connection_timeout(&self) -> Duration {
        Duration::from_secs(
            self.connection_timeout_secs
                .unwrap_or(DEFAULT_CONNECTION_TIMEOUT_SECS),
        )
    }

    /// Pick the database URL: explicit override first, then the configured
    /// value, then `fallback` (usually `DATABASE_URL`). Blank values are
    /// skipped.
    pub fn resolve_database_url(
        &self,
        explicit: Option<String>,
        fallback: Option<String>,
    ) -> Option<String> {
        [explicit, self.database_url.clone(), fallback]
            .into_iter()
            .flatten()
            .find(|url| !url.trim().is_empty())
    }

    /// Build the pool configuration for `database_url`.
    pub fn pool_config(&self, database_url: impl Into<String>) -> PoolConfig {
        PoolConfig::new(database_url)
            .with_max_size(self.pool_max_size())
            .with_min_idle(Some(self.pool_min_idle()))
            .with_connection_timeout(self.connection_timeout())
    }
}
