//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - unihan_record(id, char, ucn, field, value) — long format, one row per
//!   (char, field) pair, filled by the importer and read by the queries
//! - unihan(char, ucn, <one column per catalog field>) — canonical wide
//!   shape, inspected by the bootstrap check

pub mod schema;
pub mod sqlite;

pub use sqlite::{StoreStats, UnihanStore};
