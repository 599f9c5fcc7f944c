//! Importer - normalize tab-delimited Unihan source files into the store
//!
//! Reads the selected source files as one logical stream, skips comments
//! and blank lines, parses each remaining line into a [`CharacterRecord`],
//! and bulk-inserts everything in a single transaction. A malformed line
//! aborts the import; the transaction never commits partial files.
//!
//! Acquiring the source files (download, unzip) is someone else's job:
//! the importer only asks a [`SourceResolver`] where a named file lives.

use crate::catalog::FieldCatalog;
use crate::record::CharacterRecord;
use crate::storage::UnihanStore;
use crate::{Error, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Comment marker at the start of non-data lines
const COMMENT_MARKER: char = '#';

/// Maps a source file name to its location on disk
pub trait SourceResolver {
    fn resolve(&self, file_name: &str) -> Result<PathBuf>;
}

/// Resolves source files against a single data directory
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl SourceResolver for DirectorySource {
    fn resolve(&self, file_name: &str) -> Result<PathBuf> {
        let path = self.root.join(file_name);
        if path.is_file() {
            Ok(path)
        } else {
            Err(Error::SourceNotFound(path.display().to_string()))
        }
    }
}

/// Outcome of one `install` run
#[derive(Debug, Clone)]
pub struct ImportReport {
    /// Source files read
    pub files: usize,
    /// Data lines parsed into records after field filtering
    pub records: usize,
    /// Rows actually inserted (the rest were duplicates of existing rows)
    pub inserted: usize,
}

impl ImportReport {
    /// Records that were already present and ignored on insert
    pub fn duplicates(&self) -> usize {
        self.records - self.inserted
    }
}

impl std::fmt::Display for ImportReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Import Report:")?;
        writeln!(f, "  Files: {}", self.files)?;
        writeln!(f, "  Records: {}", self.records)?;
        writeln!(f, "  Inserted: {}", self.inserted)?;
        writeln!(f, "  Duplicates ignored: {}", self.duplicates())
    }
}

/// Imports Unihan source files into a store
pub struct Importer<'a, R: SourceResolver> {
    store: &'a mut UnihanStore,
    catalog: &'a FieldCatalog,
    resolver: &'a R,
}

impl<'a, R: SourceResolver> Importer<'a, R> {
    pub fn new(store: &'a mut UnihanStore, catalog: &'a FieldCatalog, resolver: &'a R) -> Self {
        Self {
            store,
            catalog,
            resolver,
        }
    }

    /// Import the given source files, keeping only the given fields.
    ///
    /// `sources` defaults to every file in the catalog; `fields` defaults
    /// to the union of fields those files contribute. Both are validated
    /// against the catalog before any file or database I/O. Records whose
    /// field falls outside the selection are skipped, not errors.
    ///
    /// Ensures both table shapes exist, so a bootstrap check against the
    /// same field selection holds as soon as this returns.
    pub fn install(
        &mut self,
        sources: Option<&[&str]>,
        fields: Option<&[&str]>,
    ) -> Result<ImportReport> {
        let sources: Vec<&str> = match sources {
            Some(ids) => ids.to_vec(),
            None => self.catalog.source_files().collect(),
        };
        for id in &sources {
            if !self.catalog.contains_source(id) {
                return Err(Error::UnknownDataset((*id).to_string()));
            }
        }

        let selection: BTreeSet<&str> = match fields {
            Some(names) => {
                self.catalog.validate_fields(names.iter().copied())?;
                names.iter().copied().collect()
            }
            None => self.catalog.fields_for(&sources),
        };

        self.store.ensure_record_schema()?;
        self.store
            .ensure_canonical_schema(selection.iter().copied())?;

        let mut records = Vec::new();
        for source in &sources {
            let path = self.resolver.resolve(source)?;
            let read = Self::read_source(&path, &selection, &mut records)?;
            debug!("read {} records from {}", read, path.display());
        }

        let inserted = self.store.insert_records(&records)?;
        let report = ImportReport {
            files: sources.len(),
            records: records.len(),
            inserted,
        };
        info!(
            "imported {} files, {} records ({} new)",
            report.files, report.records, report.inserted
        );
        Ok(report)
    }

    /// Read one source file, appending records for selected fields.
    ///
    /// Returns how many records the file contributed. Fails fast on the
    /// first malformed line, naming the file and line number.
    fn read_source(
        path: &Path,
        selection: &BTreeSet<&str>,
        records: &mut Vec<CharacterRecord>,
    ) -> Result<usize> {
        let reader = BufReader::new(File::open(path)?);
        let mut read = 0;

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() || line.starts_with(COMMENT_MARKER) {
                continue;
            }

            let record = CharacterRecord::from_tsv(&line).map_err(|e| {
                Error::MalformedRecord(format!("{}:{}: {}", path.display(), index + 1, e))
            })?;

            if selection.contains(record.field.as_str()) {
                records.push(record);
                read += 1;
            }
        }

        Ok(read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(dir: &Path, name: &str, contents: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
    }

    fn readings_fixture(dir: &Path) {
        write_fixture(
            dir,
            "Unihan_Readings.txt",
            "# Unihan_Readings.txt\n\
             #\n\
             \n\
             U+597D\tkDefinition\tgood\n\
             U+597D\tkMandarin\thǎo\n\
             U+4F73\tkDefinition\tgood fortune\n",
        );
    }

    fn variants_fixture(dir: &Path) {
        write_fixture(
            dir,
            "Unihan_Variants.txt",
            "U+4F34\tkSemanticVariant\tU+4F34<kMatthews\n",
        );
    }

    #[test]
    fn test_install_reads_and_inserts() {
        let dir = tempfile::tempdir().unwrap();
        readings_fixture(dir.path());

        let mut store = UnihanStore::open_in_memory().unwrap();
        let catalog = FieldCatalog::unihan();
        let resolver = DirectorySource::new(dir.path());

        let report = Importer::new(&mut store, &catalog, &resolver)
            .install(Some(&["Unihan_Readings.txt"]), None)
            .unwrap();

        assert_eq!(report.files, 1);
        assert_eq!(report.records, 3);
        assert_eq!(report.inserted, 3);
        assert_eq!(store.count_records().unwrap(), 3);
    }

    #[test]
    fn test_install_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        readings_fixture(dir.path());

        let mut store = UnihanStore::open_in_memory().unwrap();
        let catalog = FieldCatalog::unihan();
        let resolver = DirectorySource::new(dir.path());

        Importer::new(&mut store, &catalog, &resolver)
            .install(Some(&["Unihan_Readings.txt"]), None)
            .unwrap();
        let count = store.count_records().unwrap();

        let report = Importer::new(&mut store, &catalog, &resolver)
            .install(Some(&["Unihan_Readings.txt"]), None)
            .unwrap();

        assert_eq!(report.inserted, 0);
        assert_eq!(report.duplicates(), 3);
        assert_eq!(store.count_records().unwrap(), count);
    }

    #[test]
    fn test_install_bootstraps_canonical_schema() {
        let dir = tempfile::tempdir().unwrap();
        readings_fixture(dir.path());

        let mut store = UnihanStore::open_in_memory().unwrap();
        let catalog = FieldCatalog::unihan();
        let resolver = DirectorySource::new(dir.path());
        let fields = catalog.fields_for(&["Unihan_Readings.txt"]);

        assert!(!store.is_bootstrapped(fields.iter().copied()).unwrap());

        Importer::new(&mut store, &catalog, &resolver)
            .install(Some(&["Unihan_Readings.txt"]), None)
            .unwrap();

        assert!(store.is_bootstrapped(fields.iter().copied()).unwrap());
    }

    #[test]
    fn test_install_filters_fields() {
        let dir = tempfile::tempdir().unwrap();
        readings_fixture(dir.path());

        let mut store = UnihanStore::open_in_memory().unwrap();
        let catalog = FieldCatalog::unihan();
        let resolver = DirectorySource::new(dir.path());

        let report = Importer::new(&mut store, &catalog, &resolver)
            .install(Some(&["Unihan_Readings.txt"]), Some(&["kDefinition"]))
            .unwrap();

        assert_eq!(report.records, 2);
        assert!(
            store
                .records_for_char('好', &["kMandarin"])
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_install_multiple_sources() {
        let dir = tempfile::tempdir().unwrap();
        readings_fixture(dir.path());
        variants_fixture(dir.path());

        let mut store = UnihanStore::open_in_memory().unwrap();
        let catalog = FieldCatalog::unihan();
        let resolver = DirectorySource::new(dir.path());

        let report = Importer::new(&mut store, &catalog, &resolver)
            .install(
                Some(&["Unihan_Readings.txt", "Unihan_Variants.txt"]),
                None,
            )
            .unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.records, 4);

        let variants = store
            .records_for_char('伴', &["kSemanticVariant"])
            .unwrap();
        assert_eq!(variants.len(), 1);
        assert_eq!(variants[0].value, "U+4F34<kMatthews");
    }

    #[test]
    fn test_malformed_line_fails_fast() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture(
            dir.path(),
            "Unihan_Readings.txt",
            "U+597D\tkDefinition\tgood\nU+4F73\tkDefinition\n",
        );

        let mut store = UnihanStore::open_in_memory().unwrap();
        let catalog = FieldCatalog::unihan();
        let resolver = DirectorySource::new(dir.path());

        let err = Importer::new(&mut store, &catalog, &resolver)
            .install(Some(&["Unihan_Readings.txt"]), None)
            .unwrap_err();

        let message = err.to_string();
        assert!(matches!(err, Error::MalformedRecord(_)));
        assert!(message.contains("Unihan_Readings.txt"));
        assert!(message.contains(":2:"));

        // nothing persisted from the aborted run
        assert_eq!(store.count_records().unwrap(), 0);
    }

    #[test]
    fn test_unknown_dataset_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = UnihanStore::open_in_memory().unwrap();
        let catalog = FieldCatalog::unihan();
        let resolver = DirectorySource::new(dir.path());

        let err = Importer::new(&mut store, &catalog, &resolver)
            .install(Some(&["NoSuchFile.txt"]), None)
            .unwrap_err();
        assert!(matches!(err, Error::UnknownDataset(_)));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let dir = tempfile::tempdir().unwrap();
        readings_fixture(dir.path());

        let mut store = UnihanStore::open_in_memory().unwrap();
        let catalog = FieldCatalog::unihan();
        let resolver = DirectorySource::new(dir.path());

        let err = Importer::new(&mut store, &catalog, &resolver)
            .install(Some(&["Unihan_Readings.txt"]), Some(&["kNoSuchField"]))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownField(_)));
    }

    #[test]
    fn test_missing_source_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = UnihanStore::open_in_memory().unwrap();
        let catalog = FieldCatalog::unihan();
        let resolver = DirectorySource::new(dir.path());

        let err = Importer::new(&mut store, &catalog, &resolver)
            .install(Some(&["Unihan_Readings.txt"]), None)
            .unwrap_err();
        assert!(matches!(err, Error::SourceNotFound(_)));
    }
}
