//! Character record - one `(char, field, value)` property in long format
//!
//! Unihan source lines look like:
//!
//! ```text
//! U+597D	kDefinition	good, excellent, fine; well
//! ```
//!
//! The first column is itself a code point tag; a record carries both the
//! native character and its canonical padded tag.

use crate::conversion;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// A single character property in long format.
///
/// Uniqueness is enforced at the storage layer: no duplicate
/// `(char, field, value)` triple, and at most one value per `(char, field)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// The native character
    pub character: char,
    /// Canonical `U+XXXX` tag for the character
    pub ucn: String,
    /// Property field name, e.g. `kDefinition`
    pub field: String,
    /// Raw property value as it appears in the source file
    pub value: String,
}

impl CharacterRecord {
    /// Create a record, deriving the canonical tag from the character
    pub fn new(character: char, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            character,
            ucn: conversion::to_ucn(character),
            field: field.into(),
            value: value.into(),
        }
    }

    /// Parse one tab-delimited source line.
    ///
    /// Expects exactly three fields `ucn\tfield\tvalue`; anything else is a
    /// malformed record. Comment and blank lines are the caller's concern.
    pub fn from_tsv(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split('\t').collect();
        let [ucn, field, value] = parts.as_slice() else {
            return Err(Error::MalformedRecord(format!(
                "expected 3 tab-delimited fields, found {}: {:?}",
                parts.len(),
                line
            )));
        };

        let character = conversion::from_ucn(ucn)?;
        Ok(Self {
            character,
            ucn: conversion::to_ucn(character),
            field: (*field).to_string(),
            value: (*value).to_string(),
        })
    }
}
