//! Static checks over the migration files themselves (no database needed).
//!
//! - every `.up.sql` has a matching `.down.sql`
//! - versions are 14-digit timestamps
//! - every `down` drops foreign keys, then indexes, then tables
//! - every `up` creates tables before indexes before foreign keys

use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

fn migrations_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../db/migrations")
}

fn file_names() -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(migrations_dir())
        .expect("migrations directory should exist")
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|n| n.ends_with(".sql"))
        .collect();
    names.sort();
    names
}

fn read(name: &str) -> String {
    fs::read_to_string(migrations_dir().join(name)).unwrap()
}

/// Byte offset of the first occurrence of `needle` (case-insensitive).
fn first(sql: &str, needle: &str) -> Option<usize> {
    sql.to_uppercase().find(needle)
}

/// Byte offset of the last occurrence of `needle` (case-insensitive).
fn last(sql: &str, needle: &str) -> Option<usize> {
    sql.to_uppercase().rfind(needle)
}

// ---------------------------------------------------------------------------
// Test: pairing and naming
// ---------------------------------------------------------------------------

#[test]
fn every_up_has_a_down() {
    let names = file_names();
    let ups: BTreeSet<_> = names
        .iter()
        .filter_map(|n| n.strip_suffix(".up.sql"))
        .collect();
    let downs: BTreeSet<_> = names
        .iter()
        .filter_map(|n| n.strip_suffix(".down.sql"))
        .collect();

    assert!(!ups.is_empty());
    assert_eq!(ups, downs, "up/down migration files must pair up");
}

#[test]
fn versions_are_timestamps() {
    for name in file_names() {
        let (version, _) = name.split_once('_').unwrap();
        assert_eq!(version.len(), 14, "{name}: version should be 14 digits");
        assert!(version.chars().all(|c| c.is_ascii_digit()), "{name}");
    }
}

// ---------------------------------------------------------------------------
// Test: object ordering
// ---------------------------------------------------------------------------

#[test]
fn down_drops_fks_then_indexes_then_tables() {
    for name in file_names().into_iter().filter(|n| n.ends_with(".down.sql")) {
        let sql = read(&name);
        let table = first(&sql, "DROP TABLE").unwrap_or_else(|| panic!("{name} drops no table"));

        if let Some(last_fk) = last(&sql, "DROP CONSTRAINT") {
            if let Some(first_index) = first(&sql, "DROP INDEX") {
                assert!(last_fk < first_index, "{name}: FKs must be dropped before indexes");
            }
            assert!(last_fk < table, "{name}: FKs must be dropped before the table");
        }
        if let Some(last_index) = last(&sql, "DROP INDEX") {
            assert!(last_index < table, "{name}: indexes must be dropped before the table");
        }
    }
}

#[test]
fn up_creates_table_then_indexes_then_fks() {
    for name in file_names().into_iter().filter(|n| n.ends_with(".up.sql")) {
        let sql = read(&name);
        let table =
            first(&sql, "CREATE TABLE").unwrap_or_else(|| panic!("{name} creates no table"));

        if let Some(first_index) = first(&sql, "CREATE INDEX") {
            assert!(table < first_index, "{name}: table must precede its indexes");
            if let Some(first_fk) = first(&sql, "FOREIGN KEY") {
                let last_index = last(&sql, "CREATE INDEX").unwrap();
                assert!(last_index < first_fk, "{name}: indexes must precede FKs");
            }
        }
    }
}

#[test]
fn no_varchar_in_migrations() {
    for name in file_names() {
        assert!(
            first(&read(&name), "VARCHAR").is_none(),
            "{name} uses VARCHAR; use TEXT"
        );
    }
}
