//! ClickHouse adapter.
//!
//! Speaks the HTTP interface directly: statements are POSTed with a
//! JSON-lines output format and responses are decoded line by line. The
//! format interleaves progress and metadata frames with data rows; those
//! frames are filtered here and never reach callers.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use common::errors::{AppError, AppResult};
use common::models::datasource::DataSourceCredentials;

use super::{backtick_quote, EngineAdapter};

/// Introspection over the ClickHouse HTTP interface.
pub struct ClickHouseAdapter {
    http: reqwest::Client,
    base_url: String,
    database: String,
    username: String,
    password: String,
}

impl ClickHouseAdapter {
    /// Builds the HTTP client and verifies the server with the engine's
    /// explicit liveness probe. Callers never receive an unverified handle.
    pub async fn open(
        credentials: &DataSourceCredentials,
        connect_timeout: Duration,
    ) -> AppResult<Self> {
        let host = credentials
            .host
            .as_deref()
            .ok_or_else(|| AppError::Configuration("clickhouse data source requires host".into()))?;
        let port = credentials.port_or_default().unwrap_or(8123);
        let username = credentials.username.as_deref().unwrap_or("default");
        let password = credentials.password.as_deref().unwrap_or("");
        let database = credentials.database.as_deref().unwrap_or("default");

        let http = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;

        let adapter = Self {
            http,
            base_url: format!("http://{}:{}", host, port),
            database: database.to_string(),
            username: username.to_string(),
            password: password.to_string(),
        };
        adapter.ping().await?;
        Ok(adapter)
    }

    async fn ping(&self) -> AppResult<()> {
        let url = format!("{}/ping", self.base_url);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AppError::DatabaseConnection(format!(
                "ping returned status {}",
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;
        if body.trim() != "Ok." {
            return Err(AppError::DatabaseConnection(format!(
                "unexpected ping response: {}",
                body.trim()
            )));
        }
        Ok(())
    }

    /// Runs one statement and returns its decoded data rows.
    async fn query_rows(&self, sql: &str) -> AppResult<Vec<Value>> {
        let statement = format!("{} FORMAT JSONEachRowWithProgress", sql);
        let response = self
            .http
            .post(&self.base_url)
            .query(&[("database", self.database.as_str())])
            .basic_auth(&self.username, Some(&self.password))
            .body(statement)
            .send()
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::DatabaseConnection(e.to_string()))?;
        if !status.is_success() {
            return Err(AppError::DatabaseQuery(format!(
                "status {}: {}",
                status,
                body.trim()
            )));
        }
        decode_json_rows(&body)
    }
}

#[async_trait]
impl EngineAdapter for ClickHouseAdapter {
    async fn list_tables(&mut self) -> AppResult<Vec<String>> {
        let rows = self
            .query_rows("SELECT name FROM system.tables WHERE database = currentDatabase()")
            .await?;

        rows.iter()
            .map(|row| {
                row.get("name")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .ok_or_else(|| AppError::DatabaseQuery("table row missing name field".into()))
            })
            .collect()
    }

    async fn fetch_table_definition(&mut self, table_name: &str) -> AppResult<String> {
        let sql = format!("SHOW CREATE TABLE {}", backtick_quote(table_name));
        let rows = self.query_rows(&sql).await?;

        let row = rows
            .first()
            .ok_or_else(|| AppError::TableNotFound(table_name.to_string()))?;
        row.get("statement")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::DatabaseQuery("response missing statement field".into()))
    }

    async fn test_connection(&mut self) -> AppResult<()> {
        if let Err(err) = self.query_rows("SELECT 1").await {
            return Err(match err {
                AppError::DatabaseQuery(message) => AppError::DatabaseConnection(message),
                other => other,
            });
        }
        Ok(())
    }

    async fn close(self: Box<Self>) -> AppResult<()> {
        // The HTTP client holds no server-side session.
        Ok(())
    }
}

/// Decodes a JSON-lines response body into data rows.
///
/// Progress and metadata frames are dropped; wrapped `{"row": ...}` frames
/// are unwrapped; an exception frame surfaces as a query error.
fn decode_json_rows(body: &str) -> AppResult<Vec<Value>> {
    let mut rows = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let value: Value = serde_json::from_str(line)
            .map_err(|e| AppError::DatabaseQuery(format!("invalid response line: {}", e)))?;
        let Some(object) = value.as_object() else {
            return Err(AppError::DatabaseQuery(
                "response line is not a JSON object".into(),
            ));
        };

        if let Some(row) = object.get("row") {
            rows.push(row.clone());
            continue;
        }
        if let Some(exception) = object.get("exception") {
            return Err(AppError::DatabaseQuery(
                exception.as_str().unwrap_or("unknown exception").to_string(),
            ));
        }
        if object.contains_key("progress")
            || object.contains_key("meta")
            || object.contains_key("totals")
            || object.contains_key("rows_before_limit_at_least")
        {
            continue;
        }
        rows.push(value);
    }
    Ok(rows)
}
