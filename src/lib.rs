//! # Blockdex - schema bootstrap for blockchain indexer storage
//!
//! Blockdex owns the relational layout an indexer writes into and makes sure
//! it exists before anything else touches the database:
//! - A closed set of indexer entities (blocks, transactions, logs, ...)
//! - Static descriptors rendered to `CREATE TABLE IF NOT EXISTS` DDL
//! - A fail-fast, idempotent registrar over any [`RelationCatalog`]
//! - A SQLite-backed catalog

pub mod entity;
pub mod registrar;
pub mod storage;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use entity::{EntityDescriptor, EntityKind};
pub use registrar::{CreateTableOptions, RelationCatalog, initialize_schema, register};
pub use storage::SqliteCatalog;

/// Result type alias for Blockdex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Blockdex operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to create relation {relation}: {source}")]
    RelationCreation {
        relation: String,
        source: Box<Error>,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Invalid entity descriptor: {0}")]
    InvalidDescriptor(String),

    #[error("Unknown entity: {0}")]
    UnknownEntity(String),
}
