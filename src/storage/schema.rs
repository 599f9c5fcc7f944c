//! Database schema definitions
//!
//! Two table shapes exist side by side:
//! - `unihan_record`: the long-format table the importer fills and the
//!   query engine reads, one row per `(char, field)` pair
//! - `unihan`: the canonical wide table, one column per catalog field,
//!   whose column set is what the bootstrap check inspects
//!
//! DDL for the wide table is generated from the field catalog at install
//! time; nothing is reflected at query time.

/// Canonical wide table name
pub const CANONICAL_TABLE: &str = "unihan";

/// Long-format record table name
pub const RECORDS_TABLE: &str = "unihan_record";

/// SQL to create the long-format record table
pub const CREATE_RECORDS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS unihan_record (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    char TEXT NOT NULL,
    ucn TEXT NOT NULL,
    field TEXT NOT NULL,
    value TEXT NOT NULL
)
"#;

/// SQL to create the record table indexes.
///
/// The unique pair keeps reimports idempotent; the plain `field` index
/// backs reverse lookups that narrow by field before matching values.
pub const CREATE_RECORDS_INDEXES: &[&str] = &[
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_record_char_field_value ON unihan_record(char, field, value)",
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_record_char_field ON unihan_record(char, field)",
    "CREATE INDEX IF NOT EXISTS idx_record_field ON unihan_record(field)",
];

/// All statements for the long-format schema
pub fn record_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_RECORDS_TABLE];
    stmts.extend(CREATE_RECORDS_INDEXES.iter().copied());
    stmts
}

/// Generate DDL for the canonical wide table over the given fields.
///
/// `char` and `ucn` form the composite key; every field column is nullable
/// free text (SQLite does not enforce declared lengths).
pub fn create_canonical_table_sql<'a, I>(fields: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut sql = String::from(
        "CREATE TABLE IF NOT EXISTS unihan (\n    char TEXT NOT NULL,\n    ucn TEXT NOT NULL",
    );
    for field in fields {
        sql.push_str(",\n    ");
        sql.push_str(field);
        sql.push_str(" TEXT");
    }
    sql.push_str(",\n    PRIMARY KEY (char, ucn)\n)");
    sql
}

/// Uniqueness index on the canonical table's composite key
pub const CREATE_CANONICAL_INDEX: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_unihan_char_ucn ON unihan(char, ucn)";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_ddl_contains_fields() {
        let sql = create_canonical_table_sql(["kDefinition", "kMandarin"]);
        assert!(sql.contains("kDefinition TEXT"));
        assert!(sql.contains("kMandarin TEXT"));
        assert!(sql.contains("PRIMARY KEY (char, ucn)"));
    }

    #[test]
    fn test_record_schema_statement_count() {
        assert_eq!(
            record_schema_statements().len(),
            1 + CREATE_RECORDS_INDEXES.len()
        );
    }
}
