//! Engine adapters.
//!
//! One capability interface, four implementations. The adapter for a data
//! source is selected once, when the connection is opened; the engine tag is
//! never re-inspected per call. Engine-specific response quirks (result
//! column layout, JSON framing, catalog shapes) stay inside the owning
//! adapter and never leak into the common result types.

use async_trait::async_trait;
use common::errors::AppResult;

mod clickhouse;
mod mysql;
mod postgres;
mod sqlite;

pub use clickhouse::ClickHouseAdapter;
pub use mysql::MySqlAdapter;
pub use postgres::PostgresAdapter;
pub use sqlite::SqliteAdapter;

/// Uniform introspection contract over one live connection.
///
/// An adapter exclusively owns its connection for the duration of one
/// operation and is released exactly once via [`EngineAdapter::close`].
#[async_trait]
pub trait EngineAdapter: Send {
    /// Lists the tables of the connection's active database, in whatever
    /// order the engine returns them.
    async fn list_tables(&mut self) -> AppResult<Vec<String>>;

    /// Fetches the structural definition of one table. A table the engine
    /// reports zero rows for yields `AppError::TableNotFound`.
    async fn fetch_table_definition(&mut self, table_name: &str) -> AppResult<String>;

    /// Issues the engine's cheapest no-op statement. Success is defined
    /// purely by absence of error; the returned value is not inspected.
    async fn test_connection(&mut self) -> AppResult<()>;

    /// Releases the underlying connection. Safe to call on a handle that
    /// never fully initialized.
    async fn close(self: Box<Self>) -> AppResult<()>;
}

/// Quotes an identifier for engines using backtick quoting (MySQL,
/// ClickHouse), escaping embedded backticks.
pub(crate) fn backtick_quote(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}
