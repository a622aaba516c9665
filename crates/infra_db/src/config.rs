//! Database settings loaded from the environment

use serde::Deserialize;
use std::time::Duration;

use crate::pool::DatabaseConfig;

/// Database settings, read from `LEDGER_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// PostgreSQL connection string
    pub database_url: String,
    /// Maximum number of pooled connections
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of pooled connections
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    /// Connection acquire timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    2
}

fn default_connect_timeout_secs() -> u64 {
    30
}

impl DatabaseSettings {
    /// Loads settings from the environment, honoring a `.env` file
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        config::Config::builder()
            .add_source(config::Environment::with_prefix("LEDGER"))
            .build()?
            .try_deserialize()
    }

    /// Converts the settings into a pool configuration
    pub fn pool_config(&self) -> DatabaseConfig {
        DatabaseConfig::new(&self.database_url)
            .max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_config_carries_settings() {
        let settings = DatabaseSettings {
            database_url: "postgres://localhost/ledger_test".to_string(),
            max_connections: 7,
            min_connections: 1,
            connect_timeout_secs: 5,
        };

        let config = settings.pool_config();
        assert_eq!(config.url, "postgres://localhost/ledger_test");
        assert_eq!(config.max_connections, 7);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
    }
}
