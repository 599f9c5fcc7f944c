//! Code point tag conversion - `U+XXXX` text form for every character
//!
//! Format: `U+` followed by uppercase hex, zero-padded to at least 4 digits.
//!
//! Examples:
//! - `好` -> `U+597D`
//! - `A` -> `U+0041`
//! - `𠀀` -> `U+20000`
//!
//! Some Unihan field values embed variant lists: whitespace-separated code
//! point tags, each optionally annotated with the attesting source after a
//! `<` (e.g. `U+4F34<kMatthews`). [`parse_tagged`] and [`parse_untagged`]
//! walk those lists lazily.

use crate::{Error, Result};
use regex::Regex;
use std::sync::OnceLock;

static UCN_RE: OnceLock<Regex> = OnceLock::new();

fn ucn_pattern() -> &'static Regex {
    UCN_RE.get_or_init(|| Regex::new(r"^U\+[0-9A-F]+$").expect("static pattern"))
}

/// Format a character as its `U+XXXX` code point tag.
///
/// Uppercase hex, zero-padded to at least 4 digits. Characters beyond the
/// BMP get 5 or 6 digits with no extra padding.
pub fn to_ucn(c: char) -> String {
    format!("U+{:04X}", c as u32)
}

/// Parse a `U+XXXX` code point tag back into its character.
///
/// Fails with [`Error::MalformedTag`] when the input does not match
/// `U+[0-9A-F]+` or names a code point that is not a Unicode scalar value.
pub fn from_ucn(tag: &str) -> Result<char> {
    if !ucn_pattern().is_match(tag) {
        return Err(Error::MalformedTag(tag.to_string()));
    }

    let code = u32::from_str_radix(&tag[2..], 16)
        .map_err(|_| Error::MalformedTag(tag.to_string()))?;

    char::from_u32(code).ok_or_else(|| Error::MalformedTag(tag.to_string()))
}

/// A variant character together with the source annotation that attests it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaggedVariant {
    /// The variant character itself
    pub character: char,
    /// Annotation after the `<` separator, e.g. `kMatthews`; absent for
    /// unannotated tokens
    pub tag: Option<String>,
}

/// Parse a variant-list value into `(character, annotation)` pairs.
///
/// Splits on whitespace, then each token on `<` into a code point tag and
/// its annotation. The iterator is lazy and finite; call again on the same
/// value to restart. An empty value yields an empty iterator.
pub fn parse_tagged(value: &str) -> impl Iterator<Item = Result<TaggedVariant>> + '_ {
    value.split_whitespace().map(|token| {
        let (ucn, tag) = match token.split_once('<') {
            Some((ucn, tag)) => (ucn, Some(tag)),
            None => (token, None),
        };
        Ok(TaggedVariant {
            character: from_ucn(ucn)?,
            tag: tag.map(str::to_string),
        })
    })
}

/// Parse a variant-list value into characters, discarding annotations.
///
/// Same tokenization as [`parse_tagged`]; an empty value yields an empty
/// iterator.
pub fn parse_untagged(value: &str) -> impl Iterator<Item = Result<char>> + '_ {
    value.split_whitespace().map(|token| {
        let ucn = match token.split_once('<') {
            Some((ucn, _)) => ucn,
            None => token,
        };
        from_ucn(ucn)
    })
}
