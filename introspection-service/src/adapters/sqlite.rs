//! SQLite adapter.
//!
//! The master catalog table holds both the table list and the verbatim
//! creation SQL of every table.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Connection, Row};

use common::errors::{AppError, AppResult};
use common::models::datasource::DataSourceCredentials;

use super::EngineAdapter;

/// Introspection over one SQLite database file.
pub struct SqliteAdapter {
    conn: SqliteConnection,
}

impl SqliteAdapter {
    /// Opens the database file. The path must be present and non-empty
    /// before any filesystem access is attempted; the file is never created
    /// by this layer, so a nonexistent path is a connection error.
    pub async fn open(credentials: &DataSourceCredentials) -> AppResult<Self> {
        let path = credentials
            .file_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| {
                AppError::Configuration("sqlite data source requires file_path".into())
            })?;

        let options = SqliteConnectOptions::new().filename(path);
        let conn = options
            .connect()
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl EngineAdapter for SqliteAdapter {
    async fn list_tables(&mut self) -> AppResult<Vec<String>> {
        // sqlite_% names are catalog-internal and never user tables.
        let rows = sqlx::query(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )
        .fetch_all(&mut self.conn)
        .await
        .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row
                .try_get("name")
                .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;
            tables.push(name);
        }
        Ok(tables)
    }

    async fn fetch_table_definition(&mut self, table_name: &str) -> AppResult<String> {
        let rows = sqlx::query("SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?")
            .bind(table_name)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        let row = rows
            .first()
            .ok_or_else(|| AppError::TableNotFound(table_name.to_string()))?;
        row.try_get("sql")
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
