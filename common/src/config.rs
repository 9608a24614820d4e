//! Application configuration.
//!
//! Loaded from the environment with sensible defaults; every service passes
//! its own name so log lines can be attributed.

use std::env;

/// Runtime configuration shared by the introspection services.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Name of the service using this configuration.
    pub service_name: String,
    /// MongoDB connection string for the credential store.
    pub mongodb_uri: String,
    /// MongoDB database holding the `datasources` collection.
    pub mongodb_db: String,
    /// Upper bound in seconds for a single connection attempt.
    pub connect_timeout_secs: u64,
}

const DEFAULT_MONGODB_URI: &str = "mongodb://localhost:27017";
const DEFAULT_MONGODB_DB: &str = "research_db";
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

impl AppConfig {
    /// Loads configuration from the environment for the named service.
    pub fn load_with_service(service: &str) -> Self {
        Self {
            service_name: service.to_string(),
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| DEFAULT_MONGODB_URI.to_string()),
            mongodb_db: env::var("MONGODB_DB")
                .unwrap_or_else(|_| DEFAULT_MONGODB_DB.to_string()),
            connect_timeout_secs: env::var("CONNECT_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS),
        }
    }
}
