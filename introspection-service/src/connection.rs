//! Connection factory.
//!
//! Turns validated credentials into a live engine adapter. Dispatch happens
//! once, on the credential tag; no retries are performed here, any retry
//! policy belongs to callers.

use std::time::Duration;

use async_trait::async_trait;

use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::models::datasource::{DataSourceCredentials, EngineKind};

use crate::adapters::{
    ClickHouseAdapter, EngineAdapter, MySqlAdapter, PostgresAdapter, SqliteAdapter,
};

/// Opens engine adapters from credentials. Implemented by the real
/// [`ConnectionFactory`] and by test doubles.
#[async_trait]
pub trait AdapterFactory: Send + Sync {
    /// Opens a verified connection and returns the matching adapter, or a
    /// classified error. Credentials are validated before any I/O.
    async fn open(&self, credentials: &DataSourceCredentials) -> AppResult<Box<dyn EngineAdapter>>;
}

/// Production factory for the four supported engines.
pub struct ConnectionFactory {
    connect_timeout: Duration,
}

impl ConnectionFactory {
    /// Creates a factory using the configured connection timeout.
    pub fn new(config: &AppConfig) -> Self {
        Self {
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
        }
    }
}

#[async_trait]
impl AdapterFactory for ConnectionFactory {
    async fn open(&self, credentials: &DataSourceCredentials) -> AppResult<Box<dyn EngineAdapter>> {
        credentials.validate_for_engine()?;

        match credentials.engine {
            EngineKind::MySQL => Ok(Box::new(
                MySqlAdapter::open(credentials, self.connect_timeout).await?,
            )),
            EngineKind::Postgres => Ok(Box::new(
                PostgresAdapter::open(credentials, self.connect_timeout).await?,
            )),
            EngineKind::SQLite => Ok(Box::new(SqliteAdapter::open(credentials).await?)),
            EngineKind::ClickHouse => Ok(Box::new(
                ClickHouseAdapter::open(credentials, self.connect_timeout).await?,
            )),
            EngineKind::MongoDB => Err(AppError::UnsupportedDatabaseType(
                credentials.engine.to_string(),
            )),
        }
    }
}
