//! Data source credential models.
//!
//! A data source is a stored record describing one external database the
//! system can introspect. Records live in the credential store and are read
//! fresh for every operation; this layer never writes them.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::errors::{AppError, AppResult};

/// Engine type tag carried by every stored data source record.
///
/// All five tags can appear in stored records, but only four have an
/// introspection adapter; `MongoDB` sources are rejected as unsupported at
/// dispatch time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// MySQL database.
    MySQL,
    /// PostgreSQL database.
    Postgres,
    /// SQLite database file.
    SQLite,
    /// ClickHouse database (HTTP interface).
    ClickHouse,
    /// MongoDB deployment (stored tag without an adapter).
    MongoDB,
}

impl EngineKind {
    /// Parses a stored tag string. Unknown tags yield `None`; callers decide
    /// how to surface that (there is no fallback engine).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mysql" => Some(EngineKind::MySQL),
            "postgres" => Some(EngineKind::Postgres),
            "sqlite" => Some(EngineKind::SQLite),
            "clickhouse" => Some(EngineKind::ClickHouse),
            "mongodb" => Some(EngineKind::MongoDB),
            _ => None,
        }
    }

    /// Returns the default port for this engine, if it is network-based.
    pub fn default_port(&self) -> Option<u16> {
        match self {
            EngineKind::MySQL => Some(3306),
            EngineKind::Postgres => Some(5432),
            EngineKind::SQLite => None,
            EngineKind::ClickHouse => Some(8123),
            EngineKind::MongoDB => Some(27017),
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineKind::MySQL => write!(f, "mysql"),
            EngineKind::Postgres => write!(f, "postgres"),
            EngineKind::SQLite => write!(f, "sqlite"),
            EngineKind::ClickHouse => write!(f, "clickhouse"),
            EngineKind::MongoDB => write!(f, "mongodb"),
        }
    }
}

/// Connection credentials for one registered data source.
///
/// A read-only snapshot of the stored record. Network engines use
/// host/port/username/password/database; the embedded engine uses
/// `file_path`. Fields belonging to other engines are absent.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DataSourceCredentials {
    /// Store identifier of the record.
    pub id: String,
    /// Display name.
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    /// Engine type tag.
    pub engine: EngineKind,
    /// Database host (network engines).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Database port (network engines; engine default applies when absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// Database username.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Database password (never serialized in responses).
    #[serde(skip_serializing, default)]
    pub password: Option<String>,
    /// Database name to introspect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    /// SQLite file path (embedded engine only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    /// Creation timestamp of the stored record.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl DataSourceCredentials {
    /// Resolved port: the stored value, or the engine default.
    pub fn port_or_default(&self) -> Option<u16> {
        self.port.or_else(|| self.engine.default_port())
    }

    /// Validates that exactly the fields required by the tagged engine are
    /// present and non-empty. Applied uniformly to every engine before any
    /// I/O is attempted.
    pub fn validate_for_engine(&self) -> AppResult<()> {
        self.validate()
            .map_err(|e| AppError::Configuration(e.to_string()))?;

        match self.engine {
            EngineKind::MySQL | EngineKind::Postgres | EngineKind::ClickHouse => {
                self.require("host", &self.host)?;
                self.require("username", &self.username)?;
                self.require("password", &self.password)?;
                self.require("database", &self.database)?;
            }
            EngineKind::SQLite => self.require("file_path", &self.file_path)?,
            // No introspection adapter exists for this tag; dispatch rejects
            // it before any field is consulted.
            EngineKind::MongoDB => {}
        }
        Ok(())
    }

    fn require(&self, field: &str, value: &Option<String>) -> AppResult<()> {
        match value.as_deref() {
            Some(v) if !v.trim().is_empty() => Ok(()),
            _ => Err(AppError::Configuration(format!(
                "{} data source requires {}",
                self.engine, field
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network_credentials(engine: EngineKind) -> DataSourceCredentials {
        DataSourceCredentials {
            id: "65a1f0c2e4b0a1b2c3d4e5f6".to_string(),
            name: "orders-db".to_string(),
            engine,
            host: Some("db.internal".to_string()),
            port: None,
            username: Some("reader".to_string()),
            password: Some("secret".to_string()),
            database: Some("orders".to_string()),
            file_path: None,
            created_at: None,
        }
    }

    #[test]
    fn parse_known_tags() {
        assert_eq!(EngineKind::parse("mysql"), Some(EngineKind::MySQL));
        assert_eq!(EngineKind::parse("CLICKHOUSE"), Some(EngineKind::ClickHouse));
        assert_eq!(EngineKind::parse("sqlite"), Some(EngineKind::SQLite));
    }

    #[test]
    fn parse_unknown_tag_has_no_fallback() {
        assert_eq!(EngineKind::parse("oracle"), None);
        assert_eq!(EngineKind::parse(""), None);
    }

    #[test]
    fn default_ports() {
        assert_eq!(EngineKind::MySQL.default_port(), Some(3306));
        assert_eq!(EngineKind::Postgres.default_port(), Some(5432));
        assert_eq!(EngineKind::ClickHouse.default_port(), Some(8123));
        assert_eq!(EngineKind::SQLite.default_port(), None);
    }

    #[test]
    fn network_engine_requires_all_fields() {
        for engine in [EngineKind::MySQL, EngineKind::Postgres, EngineKind::ClickHouse] {
            assert!(network_credentials(engine).validate_for_engine().is_ok());

            let mut creds = network_credentials(engine);
            creds.host = None;
            assert!(matches!(
                creds.validate_for_engine(),
                Err(AppError::Configuration(_))
            ));

            let mut creds = network_credentials(engine);
            creds.database = Some("  ".to_string());
            assert!(matches!(
                creds.validate_for_engine(),
                Err(AppError::Configuration(_))
            ));
        }
    }

    #[test]
    fn sqlite_requires_file_path() {
        let mut creds = network_credentials(EngineKind::SQLite);
        creds.host = None;
        creds.username = None;
        creds.password = None;
        creds.database = None;
        assert!(matches!(
            creds.validate_for_engine(),
            Err(AppError::Configuration(_))
        ));

        creds.file_path = Some("/var/data/app.db".to_string());
        assert!(creds.validate_for_engine().is_ok());
    }

    #[test]
    fn port_defaults_by_engine() {
        let mut creds = network_credentials(EngineKind::Postgres);
        assert_eq!(creds.port_or_default(), Some(5432));
        creds.port = Some(6543);
        assert_eq!(creds.port_or_default(), Some(6543));
    }
}
