//! SQLite storage implementation

use super::schema;
use crate::record::CharacterRecord;
use crate::{Error, Result};
use rusqlite::{Connection, params, params_from_iter};
use std::collections::BTreeSet;
use std::path::Path;

/// SQLite-backed storage for Unihan character records
pub struct UnihanStore {
    conn: Connection,
}

impl UnihanStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.ensure_record_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.ensure_record_schema()?;
        Ok(store)
    }

    // ========== Schema Operations ==========

    /// Create the long-format record table and its indexes
    pub fn ensure_record_schema(&self) -> Result<()> {
        for stmt in schema::record_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Create the canonical wide table for the given fields.
    ///
    /// Idempotent: an existing table is left untouched even when `fields`
    /// differs from its columns. Reconciling a divergent table is out of
    /// scope; [`UnihanStore::verify_schema`] reports the divergence.
    pub fn ensure_canonical_schema<'a, I>(&self, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.conn
            .execute(&schema::create_canonical_table_sql(fields), [])?;
        self.conn.execute(schema::CREATE_CANONICAL_INDEX, [])?;
        Ok(())
    }

    /// Whether a table with the given name exists
    pub fn table_exists(&self, name: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
            [name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Column names of an existing table
    pub fn table_columns(&self, name: &str) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(&format!("PRAGMA table_info({})", name))?;
        let columns = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(columns)
    }

    /// Whether the canonical table exists with exactly the expected columns.
    ///
    /// The expected set is `expected_fields` plus `char` and `ucn`; set
    /// equality, not superset.
    pub fn is_bootstrapped<'a, I>(&self, expected_fields: I) -> Result<bool>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if !self.table_exists(schema::CANONICAL_TABLE)? {
            return Ok(false);
        }

        let actual: BTreeSet<String> = self
            .table_columns(schema::CANONICAL_TABLE)?
            .into_iter()
            .collect();
        Ok(actual == Self::expected_columns(expected_fields))
    }

    /// Like [`UnihanStore::is_bootstrapped`], but reports how an existing
    /// table disagrees with expectations instead of answering false.
    pub fn verify_schema<'a, I>(&self, expected_fields: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        if !self.table_exists(schema::CANONICAL_TABLE)? {
            return Err(Error::SchemaMismatch(format!(
                "table {} does not exist",
                schema::CANONICAL_TABLE
            )));
        }

        let expected = Self::expected_columns(expected_fields);
        let actual: BTreeSet<String> = self
            .table_columns(schema::CANONICAL_TABLE)?
            .into_iter()
            .collect();

        let missing: Vec<&str> = expected
            .iter()
            .filter(|c| !actual.contains(*c))
            .map(String::as_str)
            .collect();
        let unexpected: Vec<&str> = actual
            .iter()
            .filter(|c| !expected.contains(*c))
            .map(String::as_str)
            .collect();

        if missing.is_empty() && unexpected.is_empty() {
            Ok(())
        } else {
            Err(Error::SchemaMismatch(format!(
                "table {}: missing columns [{}], unexpected columns [{}]",
                schema::CANONICAL_TABLE,
                missing.join(", "),
                unexpected.join(", ")
            )))
        }
    }

    fn expected_columns<'a, I>(fields: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut expected: BTreeSet<String> = fields.into_iter().map(str::to_string).collect();
        expected.insert("char".to_string());
        expected.insert("ucn".to_string());
        expected
    }

    // ========== Record Operations ==========

    /// Bulk-insert records in a single transaction.
    ///
    /// Duplicate `(char, field, value)` rows are ignored under the unique
    /// index, so reimporting the same source set is a no-op. The
    /// transaction rolls back on any other failure.
    pub fn insert_records(&mut self, records: &[CharacterRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        let mut inserted = 0;
        {
            let mut stmt = tx.prepare(
                "INSERT OR IGNORE INTO unihan_record (char, ucn, field, value) VALUES (?1, ?2, ?3, ?4)",
            )?;
            for record in records {
                inserted += stmt.execute(params![
                    record.character.to_string(),
                    record.ucn,
                    record.field,
                    record.value,
                ])?;
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// All records for one character, restricted to the given fields
    pub fn records_for_char(
        &self,
        character: char,
        fields: &[&str],
    ) -> Result<Vec<CharacterRecord>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT char, ucn, field, value FROM unihan_record WHERE char = ?1 AND field IN ({}) ORDER BY field",
            Self::placeholders(fields.len(), 2)
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let mut bind: Vec<String> = Vec::with_capacity(fields.len() + 1);
        bind.push(character.to_string());
        bind.extend(fields.iter().map(|f| f.to_string()));

        let records = stmt
            .query_map(params_from_iter(bind.iter()), Self::row_to_record)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    /// All records whose value matches a SQL `LIKE` pattern, restricted to
    /// the given fields
    pub fn records_matching(&self, pattern: &str, fields: &[&str]) -> Result<Vec<CharacterRecord>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT char, ucn, field, value FROM unihan_record WHERE value LIKE ?1 AND field IN ({}) ORDER BY char, field",
            Self::placeholders(fields.len(), 2)
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let mut bind: Vec<String> = Vec::with_capacity(fields.len() + 1);
        bind.push(pattern.to_string());
        bind.extend(fields.iter().map(|f| f.to_string()));

        let records = stmt
            .query_map(params_from_iter(bind.iter()), Self::row_to_record)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(records)
    }

    /// Characters that carry a value for every one of the given fields
    pub fn chars_with_fields(&self, fields: &[&str]) -> Result<Vec<char>> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT char FROM unihan_record WHERE field IN ({}) GROUP BY char HAVING COUNT(DISTINCT field) = {} ORDER BY char",
            Self::placeholders(fields.len(), 1),
            fields.len()
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let bind: Vec<String> = fields.iter().map(|f| f.to_string()).collect();

        let chars = stmt
            .query_map(params_from_iter(bind.iter()), |row| {
                row.get::<_, String>(0)
            })?
            .filter_map(|r| r.ok())
            .filter_map(|s| s.chars().next())
            .collect();
        Ok(chars)
    }

    /// Count all records
    pub fn count_records(&self) -> Result<usize> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM unihan_record", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count distinct characters
    pub fn count_characters(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT char) FROM unihan_record",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Count distinct fields that have at least one record
    pub fn count_fields(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(DISTINCT field) FROM unihan_record",
            [],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get database statistics
    pub fn stats(&self) -> Result<StoreStats> {
        Ok(StoreStats {
            records: self.count_records()?,
            characters: self.count_characters()?,
            fields: self.count_fields()?,
        })
    }

    /// `?N, ?N+1, ...` placeholder list for dynamic IN clauses
    fn placeholders(count: usize, start: usize) -> String {
        (start..start + count)
            .map(|i| format!("?{}", i))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Helper to convert a row to a CharacterRecord
    fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<CharacterRecord> {
        let char_str: String = row.get(0)?;
        let character = char_str.chars().next().ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(Error::MalformedRecord("empty char column".to_string())),
            )
        })?;

        Ok(CharacterRecord {
            character,
            ucn: row.get(1)?,
            field: row.get(2)?,
            value: row.get(3)?,
        })
    }
}

/// Database statistics
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub records: usize,
    pub characters: usize,
    pub fields: usize,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Store Statistics:")?;
        writeln!(f, "  Records: {}", self.records)?;
        writeln!(f, "  Characters: {}", self.characters)?;
        writeln!(f, "  Fields: {}", self.fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<CharacterRecord> {
        vec![
            CharacterRecord::new('好', "kDefinition", "good"),
            CharacterRecord::new('好', "kMandarin", "hǎo"),
            CharacterRecord::new('佳', "kDefinition", "good fortune"),
        ]
    }

    #[test]
    fn test_insert_and_fetch() {
        let mut store = UnihanStore::open_in_memory().unwrap();
        store.insert_records(&sample_records()).unwrap();

        let records = store
            .records_for_char('好', &["kDefinition", "kMandarin"])
            .unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].field, "kDefinition");
        assert_eq!(records[0].value, "good");
        assert_eq!(records[0].ucn, "U+597D");
    }

    #[test]
    fn test_field_filter_narrows() {
        let mut store = UnihanStore::open_in_memory().unwrap();
        store.insert_records(&sample_records()).unwrap();

        let records = store.records_for_char('好', &["kMandarin"]).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].field, "kMandarin");
    }

    #[test]
    fn test_duplicate_inserts_ignored() {
        let mut store = UnihanStore::open_in_memory().unwrap();
        let records = sample_records();

        let first = store.insert_records(&records).unwrap();
        assert_eq!(first, 3);

        let second = store.insert_records(&records).unwrap();
        assert_eq!(second, 0);
        assert_eq!(store.count_records().unwrap(), 3);
    }

    #[test]
    fn test_records_matching_like() {
        let mut store = UnihanStore::open_in_memory().unwrap();
        store.insert_records(&sample_records()).unwrap();

        let matches = store.records_matching("good%", &["kDefinition"]).unwrap();
        assert_eq!(matches.len(), 2);

        let exact = store.records_matching("good", &["kDefinition"]).unwrap();
        assert_eq!(exact.len(), 1);
        assert_eq!(exact[0].character, '好');
    }

    #[test]
    fn test_chars_with_fields() {
        let mut store = UnihanStore::open_in_memory().unwrap();
        store.insert_records(&sample_records()).unwrap();

        let both = store
            .chars_with_fields(&["kDefinition", "kMandarin"])
            .unwrap();
        assert_eq!(both, vec!['好']);

        let definition_only = store.chars_with_fields(&["kDefinition"]).unwrap();
        assert_eq!(definition_only, vec!['佳', '好']);
    }

    #[test]
    fn test_is_bootstrapped_lifecycle() {
        let store = UnihanStore::open_in_memory().unwrap();
        let fields = ["kDefinition", "kMandarin"];

        assert!(!store.is_bootstrapped(fields).unwrap());

        store.ensure_canonical_schema(fields).unwrap();
        assert!(store.is_bootstrapped(fields).unwrap());

        // set equality, not superset
        assert!(!store.is_bootstrapped(["kDefinition"]).unwrap());
    }

    #[test]
    fn test_ensure_canonical_schema_idempotent() {
        let store = UnihanStore::open_in_memory().unwrap();
        store.ensure_canonical_schema(["kDefinition"]).unwrap();

        // existing table is left untouched even with a different field set
        store.ensure_canonical_schema(["kMandarin"]).unwrap();
        assert!(store.is_bootstrapped(["kDefinition"]).unwrap());
        assert!(!store.is_bootstrapped(["kMandarin"]).unwrap());
    }

    #[test]
    fn test_verify_schema_reports_divergence() {
        let store = UnihanStore::open_in_memory().unwrap();

        let err = store.verify_schema(["kDefinition"]).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));

        store.ensure_canonical_schema(["kDefinition"]).unwrap();
        assert!(store.verify_schema(["kDefinition"]).is_ok());

        let err = store.verify_schema(["kMandarin"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("kMandarin"));
        assert!(message.contains("kDefinition"));
    }

    #[test]
    fn test_stats() {
        let mut store = UnihanStore::open_in_memory().unwrap();
        store.insert_records(&sample_records()).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.records, 3);
        assert_eq!(stats.characters, 2);
        assert_eq!(stats.fields, 2);
    }
}
