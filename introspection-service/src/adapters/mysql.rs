//! MySQL adapter.
//!
//! Table listing and definitions come from `SHOW` statements; the engine
//! echoes its own DDL.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::{ConnectOptions, Connection, Row};

use common::errors::{AppError, AppResult};
use common::models::datasource::DataSourceCredentials;

use super::{backtick_quote, EngineAdapter};

/// Introspection over one MySQL connection.
pub struct MySqlAdapter {
    conn: MySqlConnection,
}

impl MySqlAdapter {
    /// Opens a single connection (no pool) and verifies it with an explicit
    /// ping. A failed ping converts to a connection error even though the
    /// handle was nominally constructed.
    pub async fn open(
        credentials: &DataSourceCredentials,
        connect_timeout: Duration,
    ) -> AppResult<Self> {
        let host = credentials
            .host
            .as_deref()
            .ok_or_else(|| AppError::Configuration("mysql data source requires host".into()))?;
        let port = credentials.port_or_default().unwrap_or(3306);
        let username = credentials.username.as_deref().unwrap_or("root");
        let password = credentials.password.as_deref().unwrap_or("");
        let database = credentials.database.as_deref().unwrap_or("");

        let options = MySqlConnectOptions::new()
            .host(host)
            .port(port)
            .username(username)
            .password(password)
            .database(database);

        let mut conn = tokio::time::timeout(connect_timeout, options.connect())
            .await
            .map_err(|_| {
                AppError::DatabaseConnection(format!("connection to {}:{} timed out", host, port))
            })?
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;

        conn.ping()
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl EngineAdapter for MySqlAdapter {
    async fn list_tables(&mut self) -> AppResult<Vec<String>> {
        let rows = sqlx::query("SHOW TABLES")
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        // The result column is named after the active database; take the
        // first column of each row.
        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row
                .try_get(0)
                .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;
            tables.push(name);
        }
        Ok(tables)
    }

    async fn fetch_table_definition(&mut self, table_name: &str) -> AppResult<String> {
        let statement = format!("SHOW CREATE TABLE {}", backtick_quote(table_name));
        let rows = sqlx::query(&statement)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| AppError::TableNotFound(table_name.to_string()))?;
        row.try_get("Create Table")
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))
    }

    async fn test_connection(&mut self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&mut self.conn)
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> AppResult<()> {
        self.conn
            .close()
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))
    }
}
