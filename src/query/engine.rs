//! Query engine implementation
//!
//! Provides the two read paths over the record table:
//! - Forward lookup: exact character -> field/value map
//! - Reverse lookup: value pattern -> characters carrying matching values
//!
//! The engine composes a store and a catalog handed to it at construction;
//! field filters are validated against the catalog before any storage I/O.

use crate::catalog::FieldCatalog;
use crate::conversion;
use crate::query::response::{DATASET_KEY, Response};
use crate::storage::UnihanStore;
use crate::{Error, Result};
use std::collections::BTreeMap;

/// Query engine for forward and reverse Unihan lookups
pub struct QueryEngine<'a> {
    store: &'a UnihanStore,
    catalog: &'a FieldCatalog,
}

impl<'a> QueryEngine<'a> {
    /// Create a new query engine
    pub fn new(store: &'a UnihanStore, catalog: &'a FieldCatalog) -> Self {
        Self { store, catalog }
    }

    /// Look up one character's property values.
    ///
    /// `request` is either the character itself or its `U+XXXX` tag. The
    /// field filter defaults to every field in the catalog; an unknown
    /// name fails with [`Error::UnknownField`]. A character with no
    /// matching rows yields an empty map - a valid result, not an error.
    pub fn lookup(
        &self,
        request: &str,
        fields: Option<&[&str]>,
    ) -> Result<BTreeMap<String, String>> {
        let filter = self.resolve_filter(fields)?;
        let character = Self::normalize_request(request)?;

        let records = self.store.records_for_char(character, &filter)?;
        Ok(records
            .into_iter()
            .map(|r| (r.field, r.value))
            .collect())
    }

    /// Find every character whose property value matches a pattern.
    ///
    /// `pattern` uses SQL `LIKE` semantics (`%` any run, `_` one
    /// character) and is passed through verbatim; matches are grouped by
    /// character, nesting field -> value.
    pub fn reverse_lookup(
        &self,
        pattern: &str,
        fields: Option<&[&str]>,
    ) -> Result<BTreeMap<char, BTreeMap<String, String>>> {
        let filter = self.resolve_filter(fields)?;

        let records = self.store.records_matching(pattern, &filter)?;
        let mut grouped: BTreeMap<char, BTreeMap<String, String>> = BTreeMap::new();
        for record in records {
            grouped
                .entry(record.character)
                .or_default()
                .insert(record.field, record.value);
        }
        Ok(grouped)
    }

    /// Characters that have a value for every one of the given fields
    pub fn chars_with_fields(&self, fields: &[&str]) -> Result<Vec<char>> {
        self.catalog.validate_fields(fields.iter().copied())?;
        self.store.chars_with_fields(fields)
    }

    /// [`QueryEngine::lookup`] wrapped in the response envelope
    pub fn lookup_response(&self, request: &str, fields: Option<&[&str]>) -> Result<Response> {
        let matches = self.lookup(request, fields)?;
        let mut response = Response::new();
        response.insert_non_empty(DATASET_KEY, serde_json::to_value(matches)?);
        Ok(response)
    }

    /// [`QueryEngine::reverse_lookup`] wrapped in the response envelope
    pub fn reverse_response(&self, pattern: &str, fields: Option<&[&str]>) -> Result<Response> {
        let matches = self.reverse_lookup(pattern, fields)?;
        let mut response = Response::new();
        response.insert_non_empty(DATASET_KEY, serde_json::to_value(matches)?);
        Ok(response)
    }

    /// Default the filter to the whole catalog; reject unknown names
    fn resolve_filter<'f>(&self, fields: Option<&'f [&'f str]>) -> Result<Vec<&'f str>> {
        match fields {
            Some(names) => {
                self.catalog.validate_fields(names.iter().copied())?;
                Ok(names.to_vec())
            }
            None => Ok(self.catalog.all_fields().into_iter().collect()),
        }
    }

    /// Accept a bare character or an already-tagged `U+XXXX` string
    fn normalize_request(request: &str) -> Result<char> {
        if request.starts_with("U+") {
            return conversion::from_ucn(request);
        }

        let mut chars = request.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Error::MalformedTag(format!(
                "expected a single character or U+XXXX tag, got {:?}",
                request
            ))),
        }
    }
}
