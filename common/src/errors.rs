//! Unified application error type.
//!
//! Every failure is classified where it originates and propagated unchanged;
//! callers dispatch on the variant, never on message text.

use thiserror::Error;

/// Convenience alias used throughout the workspace.
pub type AppResult<T> = Result<T, AppError>;

/// Application error taxonomy.
#[derive(Debug, Error)]
pub enum AppError {
    /// No data source is registered under the given identifier.
    #[error("data source not found: {0}")]
    DataSourceNotFound(String),

    /// Stored credentials are missing fields required by the tagged engine.
    /// Raised before any I/O is attempted.
    #[error("invalid data source configuration: {0}")]
    Configuration(String),

    /// Establishing or probing a connection failed at the I/O level.
    #[error("database connection failed: {0}")]
    DatabaseConnection(String),

    /// The connection is live but a statement failed or the response had an
    /// unexpected shape.
    #[error("database query failed: {0}")]
    DatabaseQuery(String),

    /// The engine returned zero rows for a named table. Not-found
    /// sub-classification of query failures.
    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The engine tag has no adapter. A configuration bug, never retried.
    #[error("unsupported database type: {0}")]
    UnsupportedDatabaseType(String),

    /// The credential store itself could not be reached or queried.
    #[error("credential store error: {0}")]
    ExternalService(String),
}

impl AppError {
    /// True for the not-found classes (unknown data source or unknown table).
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::DataSourceNotFound(_) | AppError::TableNotFound(_)
        )
    }
}
