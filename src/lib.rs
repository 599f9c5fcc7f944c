//! # Unihandex - Unihan character property store
//!
//! SQLite-backed forward and reverse lookup over Unicode Han character data.
//!
//! Unihandex provides:
//! - Conversion between native characters and `U+XXXX` code point tags
//! - A static catalog of Unihan source files and the fields they contribute
//! - An importer that normalizes tab-delimited Unihan files into a long-format table
//! - A query engine for forward lookup (character -> properties) and
//!   reverse lookup (value pattern -> characters)

pub mod conversion;
pub mod catalog;
pub mod record;
pub mod storage;
pub mod importer;
pub mod query;
pub mod config;

// Re-exports for convenient access
pub use catalog::FieldCatalog;
pub use record::CharacterRecord;
pub use storage::UnihanStore;
pub use importer::{DirectorySource, Importer, SourceResolver};
pub use query::QueryEngine;

/// Result type alias for Unihandex operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Unihandex operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Malformed code point tag: {0}")]
    MalformedTag(String),

    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown dataset file: {0}")]
    UnknownDataset(String),

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Source file not found: {0}")]
    SourceNotFound(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
