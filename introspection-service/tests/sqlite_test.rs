//! End-to-end introspection against a real SQLite database file.

use std::path::PathBuf;
use std::sync::Arc;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{ConnectOptions, Connection};
use uuid::Uuid;

use common::config::AppConfig;
use common::errors::AppError;
use common::models::datasource::{DataSourceCredentials, EngineKind};
use introspection_service::{IntrospectionService, MemoryCredentialStore};

const USERS_DDL: &str = "CREATE TABLE users (id INTEGER PRIMARY KEY)";

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .try_init();
}

fn temp_db_path() -> PathBuf {
    std::env::temp_dir().join(format!("introspect-test-{}.db", Uuid::new_v4()))
}

async fn create_database(path: &PathBuf) -> anyhow::Result<()> {
    let mut conn = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .connect()
        .await?;
    sqlx::query(USERS_DDL).execute(&mut conn).await?;
    conn.close().await?;
    Ok(())
}

async fn service_for(path: &PathBuf) -> IntrospectionService {
    let store = MemoryCredentialStore::new();
    store
        .insert(DataSourceCredentials {
            id: "ds-sqlite-users".to_string(),
            name: "local-users".to_string(),
            engine: EngineKind::SQLite,
            host: None,
            port: None,
            username: None,
            password: None,
            database: None,
            file_path: Some(path.to_string_lossy().into_owned()),
            created_at: None,
        })
        .await;

    let config = AppConfig::load_with_service("sqlite-e2e");
    IntrospectionService::with_config(&config, Arc::new(store))
}

#[tokio::test]
async fn lists_tables_and_echoes_the_stored_ddl() -> anyhow::Result<()> {
    init_logging();
    let path = temp_db_path();
    create_database(&path).await?;
    let service = service_for(&path).await;

    let tables = service.list_tables("ds-sqlite-users").await?;
    assert_eq!(tables.table_names, vec!["users"]);

    let definition = service
        .fetch_table_definition("ds-sqlite-users", "users")
        .await?;
    assert_eq!(definition.definition, USERS_DDL);

    service.test_connection("ds-sqlite-users").await?;

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[tokio::test]
async fn listing_and_definition_fetch_are_round_trip_consistent() -> anyhow::Result<()> {
    let path = temp_db_path();
    create_database(&path).await?;
    let service = service_for(&path).await;

    // Every listed name must resolve to a definition without a not-found.
    let tables = service.list_tables("ds-sqlite-users").await?;
    assert!(!tables.table_names.is_empty());
    for name in &tables.table_names {
        let result = service.fetch_table_definition("ds-sqlite-users", name).await;
        match result {
            Ok(definition) => assert!(!definition.definition.is_empty()),
            Err(err) => {
                assert!(!err.is_not_found(), "round trip broke for table {}", name);
                panic!("definition fetch failed for {}: {}", name, err);
            }
        }
    }

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[tokio::test]
async fn unknown_table_is_the_not_found_query_error() -> anyhow::Result<()> {
    let path = temp_db_path();
    create_database(&path).await?;
    let service = service_for(&path).await;

    let err = service
        .fetch_table_definition("ds-sqlite-users", "missing")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::TableNotFound(_)));

    std::fs::remove_file(&path).ok();
    Ok(())
}

#[tokio::test]
async fn nonexistent_database_file_is_a_connection_error() {
    init_logging();
    // The introspection layer never creates database files.
    let path = temp_db_path();
    let service = service_for(&path).await;

    let err = service.test_connection("ds-sqlite-users").await.unwrap_err();
    assert!(matches!(err, AppError::DatabaseConnection(_)));
    assert!(!path.exists());
}

#[tokio::test]
async fn internal_catalog_tables_are_excluded() -> anyhow::Result<()> {
    let path = temp_db_path();
    create_database(&path).await?;

    // An index forces SQLite to materialize internal bookkeeping entries.
    let mut conn = SqliteConnectOptions::new()
        .filename(&path)
        .connect()
        .await?;
    sqlx::query("CREATE TABLE tagged (id INTEGER PRIMARY KEY AUTOINCREMENT, tag TEXT UNIQUE)")
        .execute(&mut conn)
        .await?;
    conn.close().await?;

    let service = service_for(&path).await;
    let tables = service.list_tables("ds-sqlite-users").await?;
    assert!(tables.table_names.contains(&"users".to_string()));
    assert!(tables.table_names.contains(&"tagged".to_string()));
    assert!(tables
        .table_names
        .iter()
        .all(|name| !name.starts_with("sqlite_")));

    std::fs::remove_file(&path).ok();
    Ok(())
}
