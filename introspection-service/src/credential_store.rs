//! Credential store access.
//!
//! Data source records live in a MongoDB collection; this layer only ever
//! reads them. Credentials are fetched fresh for every operation — there is
//! no caching.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Collection};
use tokio::sync::RwLock;

use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::models::datasource::{DataSourceCredentials, EngineKind};

/// Read-only lookup of stored data source credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the record for the identifier, or `None` when no such data
    /// source is registered.
    async fn find_by_id(&self, id: &str) -> AppResult<Option<DataSourceCredentials>>;
}

const DATASOURCE_COLLECTION: &str = "datasources";

/// Credential store backed by the `datasources` MongoDB collection.
pub struct MongoCredentialStore {
    collection: Collection<Document>,
}

impl MongoCredentialStore {
    /// Connects to the configured MongoDB deployment.
    pub async fn connect(config: &AppConfig) -> AppResult<Self> {
        let client = Client::with_uri_str(&config.mongodb_uri)
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;
        let collection = client
            .database(&config.mongodb_db)
            .collection::<Document>(DATASOURCE_COLLECTION);
        tracing::info!(db = %config.mongodb_db, "credential store connected");
        Ok(Self { collection })
    }

    /// Decodes a stored document into credentials, tolerating the loose
    /// field typing of historical records (ports stored as strings).
    fn decode(document: Document) -> AppResult<DataSourceCredentials> {
        let id = document
            .get_object_id("_id")
            .map(|oid| oid.to_hex())
            .or_else(|_| document.get_str("_id").map(str::to_string))
            .map_err(|_| AppError::ExternalService("data source record has no _id".into()))?;

        let engine_tag = document
            .get_str("type")
            .map_err(|_| AppError::ExternalService(format!("data source {} has no type", id)))?;
        let engine = EngineKind::parse(engine_tag)
            .ok_or_else(|| AppError::UnsupportedDatabaseType(engine_tag.to_string()))?;

        Ok(DataSourceCredentials {
            name: get_string(&document, "name").unwrap_or_default(),
            engine,
            host: get_string(&document, "host"),
            port: get_port(&document),
            username: get_string(&document, "username"),
            password: get_string(&document, "password"),
            database: get_string(&document, "database"),
            // Stored records call the SQLite file path `path`.
            file_path: get_string(&document, "path"),
            created_at: get_string(&document, "created_at"),
            id,
        })
    }
}

#[async_trait]
impl CredentialStore for MongoCredentialStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<DataSourceCredentials>> {
        // An identifier that is not a valid ObjectId cannot match any record.
        let Ok(object_id) = ObjectId::parse_str(id) else {
            return Ok(None);
        };

        let document = self
            .collection
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::ExternalService(e.to_string()))?;

        document.map(Self::decode).transpose()
    }
}

fn get_string(document: &Document, key: &str) -> Option<String> {
    document
        .get_str(key)
        .ok()
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

fn get_port(document: &Document) -> Option<u16> {
    match document.get("port") {
        Some(Bson::String(s)) => s.parse().ok(),
        Some(Bson::Int32(v)) => u16::try_from(*v).ok(),
        Some(Bson::Int64(v)) => u16::try_from(*v).ok(),
        _ => None,
    }
}

/// In-process credential store for tests and local development.
#[derive(Default)]
pub struct MemoryCredentialStore {
    records: RwLock<HashMap<String, DataSourceCredentials>>,
}

impl MemoryCredentialStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a record, stamping a creation time when absent.
    pub async fn insert(&self, mut credentials: DataSourceCredentials) {
        if credentials.created_at.is_none() {
            credentials.created_at = Some(Utc::now().to_rfc3339());
        }
        self.records
            .write()
            .await
            .insert(credentials.id.clone(), credentials);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_id(&self, id: &str) -> AppResult<Option<DataSourceCredentials>> {
        Ok(self.records.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_network_record_with_string_port() {
        let document = doc! {
            "_id": ObjectId::parse_str("65a1f0c2e4b0a1b2c3d4e5f6").unwrap(),
            "name": "orders-db",
            "type": "mysql",
            "host": "db.internal",
            "port": "3307",
            "username": "reader",
            "password": "secret",
            "database": "orders",
        };
        let creds = MongoCredentialStore::decode(document).unwrap();
        assert_eq!(creds.id, "65a1f0c2e4b0a1b2c3d4e5f6");
        assert_eq!(creds.engine, EngineKind::MySQL);
        assert_eq!(creds.port, Some(3307));
        assert_eq!(creds.database.as_deref(), Some("orders"));
    }

    #[test]
    fn decode_sqlite_record_uses_path_field() {
        let document = doc! {
            "_id": ObjectId::new(),
            "name": "local-db",
            "type": "sqlite",
            "path": "/var/data/app.db",
        };
        let creds = MongoCredentialStore::decode(document).unwrap();
        assert_eq!(creds.engine, EngineKind::SQLite);
        assert_eq!(creds.file_path.as_deref(), Some("/var/data/app.db"));
        assert_eq!(creds.port, None);
    }

    #[test]
    fn decode_integer_port() {
        let document = doc! {
            "_id": ObjectId::new(),
            "name": "analytics",
            "type": "clickhouse",
            "host": "ch.internal",
            "port": 8123_i32,
            "username": "default",
            "password": "",
            "database": "analytics",
        };
        let creds = MongoCredentialStore::decode(document).unwrap();
        assert_eq!(creds.port, Some(8123));
    }

    #[test]
    fn decode_unknown_engine_tag_is_unsupported() {
        let document = doc! {
            "_id": ObjectId::new(),
            "name": "legacy",
            "type": "oracle",
            "host": "ora.internal",
        };
        let err = MongoCredentialStore::decode(document).unwrap_err();
        assert!(matches!(err, AppError::UnsupportedDatabaseType(_)));
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryCredentialStore::new();
        store
            .insert(DataSourceCredentials {
                id: "ds-1".to_string(),
                name: "local".to_string(),
                engine: EngineKind::SQLite,
                host: None,
                port: None,
                username: None,
                password: None,
                database: None,
                file_path: Some("/tmp/app.db".to_string()),
                created_at: None,
            })
            .await;

        let found = store.find_by_id("ds-1").await.unwrap().unwrap();
        assert_eq!(found.name, "local");
        assert!(found.created_at.is_some());
        assert!(store.find_by_id("ds-2").await.unwrap().is_none());
    }
}
