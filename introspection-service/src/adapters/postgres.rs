//! PostgreSQL adapter.
//!
//! The engine has no single DDL-echo statement, so table definitions are
//! reconstructed from catalog rows. The result is engine-approximated: it
//! reflects column names, formatted types and nullability, not the full
//! original DDL.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgConnection};
use sqlx::{ConnectOptions, Connection, Row};

use common::errors::{AppError, AppResult};
use common::models::datasource::DataSourceCredentials;

use super::EngineAdapter;

const LIST_TABLES_SQL: &str = "SELECT table_name FROM information_schema.tables \
     WHERE table_schema = 'public' AND table_type = 'BASE TABLE'";

const TABLE_COLUMNS_SQL: &str = "\
SELECT a.attname AS column_name,
       pg_catalog.format_type(a.atttypid, a.atttypmod) AS data_type,
       a.attnotnull AS not_null
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace
JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid
WHERE n.nspname = 'public'
  AND c.relname = $1
  AND a.attnum > 0
  AND NOT a.attisdropped
ORDER BY a.attnum";

/// Introspection over one PostgreSQL connection.
pub struct PostgresAdapter {
    conn: PgConnection,
}

struct ColumnDef {
    name: String,
    data_type: String,
    not_null: bool,
}

impl PostgresAdapter {
    /// Opens a single connection (no pool) and verifies it with an explicit
    /// ping.
    pub async fn open(
        credentials: &DataSourceCredentials,
        connect_timeout: Duration,
    ) -> AppResult<Self> {
        let host = credentials
            .host
            .as_deref()
            .ok_or_else(|| AppError::Configuration("postgres data source requires host".into()))?;
        let port = credentials.port_or_default().unwrap_or(5432);
        let username = credentials.username.as_deref().unwrap_or("postgres");
        let password = credentials.password.as_deref().unwrap_or("");
        let database = credentials.database.as_deref().unwrap_or("postgres");

        let options = PgConnectOptions::new()
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
impl EngineAdapter for PostgresAdapter {
    async fn list_tables(&mut self) -> AppResult<Vec<String>> {
        let rows = sqlx::query(LIST_TABLES_SQL)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let name: String = row
                .try_get("table_name")
                .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;
            tables.push(name);
        }
        Ok(tables)
    }

    async fn fetch_table_definition(&mut self, table_name: &str) -> AppResult<String> {
        let rows = sqlx::query(TABLE_COLUMNS_SQL)
            .bind(table_name)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| AppError::DatabaseQuery(e.to_string()))?;

        if rows.is_empty() {
            return Err(AppError::TableNotFound(table_name.to_string()));
        }

        let mut columns = Vec::with_capacity(rows.len());
        for row in &rows {
            columns.push(ColumnDef {
                name: row
                    .try_get("column_name")
                    .map_err(|e| AppError::DatabaseQuery(e.to_string()))?,
                data_type: row
                    .try_get("data_type")
                    .map_err(|e| AppError::DatabaseQuery(e.to_string()))?,
                not_null: row
                    .try_get("not_null")
                    .map_err(|e| AppError::DatabaseQuery(e.to_string()))?,
            });
        }
        Ok(synthesize_definition(table_name, &columns))
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

/// Builds a CREATE-TABLE-shaped description from catalog rows, in column
/// ordinal order.
fn synthesize_definition(table_name: &str, columns: &[ColumnDef]) -> String {
    let body = columns
        .iter()
        .map(|column| {
            format!(
                "    {} {} {}",
                column.name,
                column.data_type,
                if column.not_null { "NOT NULL" } else { "NULL" }
            )
        })
        .collect::<Vec<_>>()
        .join(",\n");
    format!("CREATE TABLE {} (\n{}\n);", table_name, body)
}
