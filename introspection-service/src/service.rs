//! Introspection service façade.
//!
//! Ties credential lookup, connection opening and the engine adapters
//! together. Every public operation owns exactly one connection and releases
//! it on every exit path.

use std::sync::Arc;

use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::models::datasource::DataSourceCredentials;
use common::models::introspect::{TableDefinition, TableList};

use crate::adapters::EngineAdapter;
use crate::connection::{AdapterFactory, ConnectionFactory};
use crate::credential_store::CredentialStore;

/// Schema introspection over registered data sources.
pub struct IntrospectionService {
    store: Arc<dyn CredentialStore>,
    factory: Arc<dyn AdapterFactory>,
}

impl IntrospectionService {
    /// Creates a service over the given store and factory.
    pub fn new(store: Arc<dyn CredentialStore>, factory: Arc<dyn AdapterFactory>) -> Self {
        Self { store, factory }
    }

    /// Creates a service using the production connection factory.
    pub fn with_config(config: &AppConfig, store: Arc<dyn CredentialStore>) -> Self {
        Self::new(store, Arc::new(ConnectionFactory::new(config)))
    }

    /// Lists the tables of the data source's active database.
    pub async fn list_tables(&self, id: &str) -> AppResult<TableList> {
        let credentials = self.resolve(id).await?;
        let mut adapter = self.factory.open(&credentials).await?;
        let result = adapter.list_tables().await;
        let table_names = Self::release(adapter, result, id).await?;
        tracing::info!(id = %id, count = table_names.len(), "listed tables");
        Ok(TableList { table_names })
    }

    /// Fetches the structural definition of one table. The name should come
    /// from a prior [`IntrospectionService::list_tables`] call against the
    /// same data source.
    pub async fn fetch_table_definition(
        &self,
        id: &str,
        table_name: &str,
    ) -> AppResult<TableDefinition> {
        let credentials = self.resolve(id).await?;
        let mut adapter = self.factory.open(&credentials).await?;
        let result = adapter.fetch_table_definition(table_name).await;
        let definition = Self::release(adapter, result, id).await?;
        Ok(TableDefinition { definition })
    }

    /// Verifies the data source is reachable and answers a trivial query.
    pub async fn test_connection(&self, id: &str) -> AppResult<()> {
        let credentials = self.resolve(id).await?;
        let mut adapter = self.factory.open(&credentials).await?;
        let result = adapter.test_connection().await;
        Self::release(adapter, result, id).await?;
        tracing::info!(id = %id, "connection test succeeded");
        Ok(())
    }

    async fn resolve(&self, id: &str) -> AppResult<DataSourceCredentials> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::DataSourceNotFound(id.to_string()))
    }

    /// Releases the connection unconditionally. A release failure is logged
    /// and never overrides the operation's result or error; with a failed
    /// operation it is reported as a secondary field on the log event.
    async fn release<T>(
        adapter: Box<dyn EngineAdapter>,
        result: AppResult<T>,
        id: &str,
    ) -> AppResult<T> {
        if let Err(close_err) = adapter.close().await {
            match &result {
                Ok(_) => tracing::warn!(
                    id = %id,
                    error = %close_err,
                    "connection release failed after successful operation"
                ),
                Err(op_err) => tracing::warn!(
                    id = %id,
                    error = %close_err,
                    operation_error = %op_err,
                    "connection release failed after failed operation"
                ),
            }
        }
        result
    }
}
