//! Multi-engine database introspection.
//!
//! Resolves stored data-source credentials, opens a connection to the tagged
//! engine and answers three questions uniformly regardless of engine: which
//! tables exist, what is a table's structural definition, and is the
//! connection healthy.
//!
//! Every operation is one unit of work: one credential lookup, one
//! connection, one adapter call, one release. Connections are never pooled or
//! shared across operations, so high-volume concurrent use pays full
//! connection setup per call; callers needing throughput must wrap this layer
//! themselves.

pub mod adapters;
pub mod connection;
pub mod credential_store;
pub mod service;

pub use adapters::EngineAdapter;
pub use connection::{AdapterFactory, ConnectionFactory};
pub use credential_store::{CredentialStore, MemoryCredentialStore, MongoCredentialStore};
pub use service::IntrospectionService;
