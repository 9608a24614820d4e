//! Introspection result models.

use serde::{Deserialize, Serialize};

/// Tables visible in a data source's active database.
///
/// Ordering is whatever the engine returned; callers must not assume it is
/// alphabetical.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableList {
    /// Table names, unique within the engine's active database.
    #[serde(rename = "tableNames")]
    pub table_names: Vec<String>,
}

/// Structural definition of one table, as produced by the owning engine.
///
/// For engines with a native DDL echo this is the engine's own text. For the
/// standards-catalog engine (PostgreSQL) it is reconstructed from catalog
/// metadata and therefore engine-approximated, not a byte-for-byte echo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDefinition {
    /// Human-readable structural description; passed through verbatim.
    pub definition: String,
}
