//! Storage Layer - SQLite-backed relation catalog
//!
//! Relations created for the indexer entities:
//! - block_refs(number, hash, parent_hash)
//! - transaction_refs(hash, block_number, transaction_index)
//! - transactions(hash, block_number, block_hash, from_address, to_address, ...)
//! - continues_indexed_rounds(id, start_block, end_block, updated_at)
//! - blocks(number, hash, parent_hash, timestamp, ...)
//! - logs(id, transaction_hash, log_index, address, topics, data, removed)

pub mod schema;
pub mod sqlite;

pub use sqlite::{SqliteCatalog, SchemaStatus, RelationStatus};
