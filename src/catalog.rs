//! Field catalog - which Unihan source file contributes which fields
//!
//! The Unicode Unihan database ships as a handful of tab-delimited text
//! files, each carrying a fixed set of `k`-prefixed property fields. The
//! catalog is the static map from source file name to its fields; it is
//! fixed at build time and field names never repeat across files.

use crate::{Error, Result};
use std::collections::BTreeSet;

/// Source file name -> fields it contributes, as shipped by Unicode.
pub const UNIHAN_MANIFEST: &[(&str, &[&str])] = &[
    (
        "Unihan_DictionaryIndices.txt",
        &[
            "kCheungBauerIndex",
            "kCowles",
            "kDaeJaweon",
            "kFennIndex",
            "kGSR",
            "kHanYu",
            "kIRGDaeJaweon",
            "kIRGDaiKanwaZiten",
            "kIRGHanyuDaZidian",
            "kIRGKangXi",
            "kKangXi",
            "kKarlgren",
            "kLau",
            "kMatthews",
            "kMeyerWempe",
            "kMorohashi",
            "kNelson",
            "kSBGY",
        ],
    ),
    (
        "Unihan_DictionaryLikeData.txt",
        &[
            "kCangjie",
            "kCheungBauer",
            "kCihaiT",
            "kFenn",
            "kFourCornerCode",
            "kFrequency",
            "kGradeLevel",
            "kHDZRadBreak",
            "kHKGlyph",
            "kPhonetic",
            "kTotalStrokes",
        ],
    ),
    (
        "Unihan_IRGSources.txt",
        &[
            "kIICore",
            "kIRG_GSource",
            "kIRG_HSource",
            "kIRG_JSource",
            "kIRG_KPSource",
            "kIRG_KSource",
            "kIRG_MSource",
            "kIRG_TSource",
            "kIRG_USource",
            "kIRG_VSource",
        ],
    ),
    (
        "Unihan_NumericValues.txt",
        &["kAccountingNumeric", "kOtherNumeric", "kPrimaryNumeric"],
    ),
    (
        "Unihan_OtherMappings.txt",
        &[
            "kBigFive",
            "kCCCII",
            "kCNS1986",
            "kCNS1992",
            "kEACC",
            "kGB0",
            "kGB1",
            "kGB3",
            "kGB5",
            "kGB7",
            "kGB8",
            "kHKSCS",
            "kIBMJapan",
            "kJis0",
            "kJis1",
            "kJIS0213",
            "kKPS0",
            "kKPS1",
            "kKSC0",
            "kKSC1",
            "kMainlandTelegraph",
            "kPseudoGB1",
            "kTaiwanTelegraph",
            "kXerox",
        ],
    ),
    (
        "Unihan_RadicalStrokeCounts.txt",
        &[
            "kRSAdobe_Japan1_6",
            "kRSJapanese",
            "kRSKangXi",
            "kRSKanWa",
            "kRSKorean",
            "kRSUnicode",
        ],
    ),
    (
        "Unihan_Readings.txt",
        &[
            "kCantonese",
            "kDefinition",
            "kHangul",
            "kHanyuPinlu",
            "kHanyuPinyin",
            "kJapaneseKun",
            "kJapaneseOn",
            "kKorean",
            "kMandarin",
            "kTang",
            "kVietnamese",
            "kXHC1983",
        ],
    ),
    (
        "Unihan_Variants.txt",
        &[
            "kCompatibilityVariant",
            "kSemanticVariant",
            "kSimplifiedVariant",
            "kSpecializedSemanticVariant",
            "kTraditionalVariant",
            "kZVariant",
        ],
    ),
];

/// Static mapping from Unihan source files to the fields they contribute.
///
/// Immutable after construction. Field names are globally unique across
/// source files, so a field unambiguously identifies its file.
#[derive(Debug, Clone, Copy)]
pub struct FieldCatalog {
    manifest: &'static [(&'static str, &'static [&'static str])],
}

impl FieldCatalog {
    /// The catalog over the built-in Unihan manifest
    pub fn unihan() -> Self {
        Self {
            manifest: UNIHAN_MANIFEST,
        }
    }

    /// All source file names, in manifest order
    pub fn source_files(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.manifest.iter().map(|(file, _)| *file)
    }

    /// Union of fields across every source file
    pub fn all_fields(&self) -> BTreeSet<&'static str> {
        self.manifest
            .iter()
            .flat_map(|(_, fields)| fields.iter().copied())
            .collect()
    }

    /// Union of fields restricted to the given source files.
    ///
    /// Identifiers not present in the manifest contribute nothing; callers
    /// that need unknown ids rejected validate separately (the Importer
    /// does, via [`FieldCatalog::contains_source`]).
    pub fn fields_for(&self, sources: &[&str]) -> BTreeSet<&'static str> {
        self.manifest
            .iter()
            .filter(|(file, _)| sources.contains(file))
            .flat_map(|(_, fields)| fields.iter().copied())
            .collect()
    }

    /// Whether the manifest contains the given source file
    pub fn contains_source(&self, file: &str) -> bool {
        self.manifest.iter().any(|(f, _)| *f == file)
    }

    /// Whether any source file contributes the given field
    pub fn contains_field(&self, field: &str) -> bool {
        self.manifest
            .iter()
            .any(|(_, fields)| fields.contains(&field))
    }

    /// Reject any field name absent from the catalog.
    ///
    /// Runs before storage I/O is attempted; an unknown name in a filter is
    /// a caller mistake, not an empty result.
    pub fn validate_fields<'a, I>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        for field in fields {
            if !self.contains_field(field) {
                return Err(Error::UnknownField(field.to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_fields_is_union() {
        let catalog = FieldCatalog::unihan();
        let all = catalog.all_fields();
        assert!(all.contains("kDefinition"));
        assert!(all.contains("kSemanticVariant"));
        assert!(all.contains("kTotalStrokes"));

        let per_file: usize = UNIHAN_MANIFEST.iter().map(|(_, fs)| fs.len()).sum();
        assert_eq!(all.len(), per_file);
    }

    #[test]
    fn test_field_names_globally_unique() {
        let catalog = FieldCatalog::unihan();
        let mut seen = BTreeSet::new();
        for (file, fields) in UNIHAN_MANIFEST {
            for field in *fields {
                assert!(seen.insert(*field), "{} duplicated in {}", field, file);
            }
        }
        assert_eq!(seen, catalog.all_fields());
    }

    #[test]
    fn test_fields_for_subset() {
        let catalog = FieldCatalog::unihan();
        let fields = catalog.fields_for(&["Unihan_Readings.txt", "Unihan_Variants.txt"]);
        assert!(fields.contains("kDefinition"));
        assert!(fields.contains("kZVariant"));
        assert!(!fields.contains("kTotalStrokes"));
        assert_eq!(fields.len(), 12 + 6);
    }

    #[test]
    fn test_fields_for_unknown_source_is_empty() {
        let catalog = FieldCatalog::unihan();
        assert!(catalog.fields_for(&["NoSuchFile.txt"]).is_empty());
    }

    #[test]
    fn test_validate_fields() {
        let catalog = FieldCatalog::unihan();
        assert!(catalog.validate_fields(["kDefinition", "kMandarin"]).is_ok());

        let err = catalog
            .validate_fields(["kDefinition", "kNoSuchField"])
            .unwrap_err();
        assert!(matches!(err, Error::UnknownField(f) if f == "kNoSuchField"));
    }
}
