//! Service configuration.
//!
//! Configuration is loaded from environment variables with fallback to defaults.
//!
//! | Variable                 | Default     |
//! |--------------------------|-------------|
//! | `DATABASE_PATH`          | `tempo.db`  |
//! | `DATABASE_URL`           | unset       |
//! | `DB_MAX_CONNECTIONS`     | `5`         |
//! | `LOCK_TIMEOUT_MS`        | `5000`      |
//! | `TRANSACTION_TIMEOUT_MS` | `10000`     |
//!
//! `DATABASE_URL` selects the PostgreSQL backend
//! ([`AppConfig::connect_postgres`]); without it the SQLite file at
//! `DATABASE_PATH` is used ([`AppConfig::db_config`]).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::error::DbResult;
use crate::invoice::InvoiceConfig;
use crate::pool::DbConfig;
use crate::store::postgres::PgProductStore;

/// Service configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite database file
    pub database_path: PathBuf,

    /// PostgreSQL connection string (optional)
    pub database_url: Option<String>,

    /// Pool size for either backend
    pub max_connections: u32,

    /// Lock wait bound: SQLite busy timeout, PostgreSQL lock_timeout
    pub lock_timeout: Duration,

    /// Bound on one whole invoice transaction
    pub transaction_timeout: Duration,
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
            database_path: lookup("DATABASE_PATH")
                .unwrap_or_else(|| "tempo.db".to_string())
                .into(),

            database_url: lookup("DATABASE_URL")
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty()),

            max_connections: parse(&lookup, "DB_MAX_CONNECTIONS", 5)?,

            lock_timeout: Duration::from_millis(parse(&lookup, "LOCK_TIMEOUT_MS", 5_000)?),

            transaction_timeout: Duration::from_millis(parse(
                &lookup,
                "TRANSACTION_TIMEOUT_MS",
                10_000,
            )?),
        };

        if config.max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        if config.lock_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("LOCK_TIMEOUT_MS".to_string()));
        }

        if config.transaction_timeout.is_zero() {
            return Err(ConfigError::InvalidValue("TRANSACTION_TIMEOUT_MS".to_string()));
        }

        Ok(config)
    }

    /// SQLite pool settings. Writers wait up to `lock_timeout` for the
    /// database write lock.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(self.database_path.clone())
            .max_connections(self.max_connections)
            .busy_timeout(self.lock_timeout)
    }

    /// PostgreSQL store sized by `max_connections`, with every row lock
    /// wait bounded by `lock_timeout`. `None` when `DATABASE_URL` is unset.
    pub async fn connect_postgres(&self) -> DbResult<Option<PgProductStore>> {
        let Some(url) = self.database_url.as_deref() else {
            return Ok(None);
        };

        info!(
            max_connections = self.max_connections,
            lock_timeout_ms = self.lock_timeout.as_millis() as u64,
            "Using PostgreSQL backend"
        );

        PgProductStore::connect(url, self.max_connections, self.lock_timeout)
            .await
            .map(Some)
    }

    pub fn invoice_config(&self) -> InvoiceConfig {
        InvoiceConfig::default().transaction_timeout(self.transaction_timeout)
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.database_path, PathBuf::from("tempo.db"));
        assert!(config.database_url.is_none());
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.lock_timeout, Duration::from_secs(5));
        assert_eq!(config.transaction_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_overrides_flow_into_sub_configs() {
        let config = load(&[
            ("DATABASE_PATH", "/var/lib/tempo/shop.db"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("LOCK_TIMEOUT_MS", "750"),
            ("TRANSACTION_TIMEOUT_MS", "3000"),
        ])
        .unwrap();

        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/var/lib/tempo/shop.db"));
        assert_eq!(db.max_connections, 12);
        assert_eq!(db.busy_timeout, Duration::from_millis(750));

        let invoice = config.invoice_config();
        assert_eq!(invoice.transaction_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            load(&[("DB_MAX_CONNECTIONS", "many")]),
            Err(ConfigError::InvalidValue(ref key)) if key == "DB_MAX_CONNECTIONS"
        ));
        assert!(load(&[("DB_MAX_CONNECTIONS", "0")]).is_err());
        assert!(load(&[("LOCK_TIMEOUT_MS", "-5")]).is_err());
        assert!(load(&[("TRANSACTION_TIMEOUT_MS", "0")]).is_err());
    }

    #[tokio::test]
    async fn test_blank_database_url_is_ignored() {
        let config = load(&[("DATABASE_URL", "  ")]).unwrap();
        assert!(config.database_url.is_none());
        assert!(config.connect_postgres().await.unwrap().is_none());
    }

    #[test]
    fn test_database_url_is_trimmed_and_kept() {
        let config = load(&[("DATABASE_URL", " postgres://tempo@db/tempo ")]).unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://tempo@db/tempo"));
    }
}
