//! Integration tests for the SQLite adapter and the full analysis path.
//!
//! Builds throwaway databases shaped like the evidence files the tool is
//! pointed at (autoincrement key column, sqlite_sequence counter), deletes
//! rows, and checks the engine reconstructs exactly what was removed.

use std::path::PathBuf;

use mirf_cli::signature::{self, SourceProfile};
use mirf_cli::sqlite::{SqliteStore, SEQUENCE_TABLE};
use mirf_core::types::{RecordId, RunPosition};
use mirf_core::{Analyzer, MirfError, RecordFetcher, TableStore};
use tempfile::TempDir;

/// A message-store-like database: rows 1..=12 inserted, 4, 5, 6, 9 deleted
/// from the middle and 11, 12 deleted from the tail. sqlite_sequence keeps
/// the issued counter at 12.
fn fixture_db(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("sms.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE message (
             ROWID INTEGER PRIMARY KEY AUTOINCREMENT,
             date TEXT,
             text TEXT
         );",
    )
    .unwrap();
    for i in 1..=12 {
        conn.execute(
            "INSERT INTO message (date, text) VALUES (?1, ?2)",
            rusqlite::params![format!("2020-12-{i:02}"), format!("message {i}")],
        )
        .unwrap();
    }
    conn.execute("DELETE FROM message WHERE ROWID IN (4, 5, 6, 9, 11, 12)", [])
        .unwrap();
    drop(conn);
    path
}

#[test]
fn test_store_reads_tables_and_columns() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(fixture_db(&dir)).unwrap();

    let tables = store.list_tables().unwrap();
    assert!(tables.contains("message"));
    assert!(tables.contains(SEQUENCE_TABLE));

    let columns = store.list_columns("message").unwrap();
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["ROWID", "date", "text"]);
    assert_eq!(columns[0].declared_type, "INTEGER");
}

#[test]
fn test_store_reads_values_and_high_water() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(fixture_db(&dir)).unwrap();

    let mut values: Vec<i64> = store
        .read_column_values("message", "ROWID")
        .unwrap()
        .into_iter()
        .map(|id| id.0)
        .collect();
    values.sort_unstable();
    assert_eq!(values, vec![1, 2, 3, 7, 8, 10]);

    let hw = store.read_high_water_mark(SEQUENCE_TABLE, "message").unwrap();
    assert_eq!(hw, Some(RecordId(12)));

    let absent = store.read_high_water_mark(SEQUENCE_TABLE, "no_such").unwrap();
    assert_eq!(absent, None);
}

#[test]
fn test_fetch_context_batches_boundaries() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(fixture_db(&dir)).unwrap();

    let ids = [3, 7, 8, 10].into_iter().map(RecordId).collect();
    let context = store
        .fetch_context("message", "ROWID", &ids, &["date"])
        .unwrap();

    assert_eq!(context.len(), 4);
    let rec = &context[&RecordId(3)];
    let date = rec.fields.as_ref().unwrap().get("date").unwrap();
    assert_eq!(date, "2020-12-03");
}

#[test]
fn test_end_to_end_analysis_with_counter() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(fixture_db(&dir)).unwrap();
    let hw = store.read_high_water_mark(SEQUENCE_TABLE, "message").unwrap();
    let analyzer = Analyzer::new(store);

    let report = analyzer
        .build_report("message", "ROWID", hw, &["date"])
        .unwrap();

    assert_eq!(report.observed, 6);
    assert_eq!(report.missing, 6);
    assert_eq!(report.runs.len(), 3);
    assert_eq!(report.runs[0].identifiers.len(), 3);
    assert_eq!(report.runs[0].position, RunPosition::Interior);
    assert_eq!(report.runs[2].position, RunPosition::Trailing);
    assert!(report.statements[2].contains("after record 10 (date=2020-12-10)"));
    assert!(report.statements[2].ends_with("missing identifiers: [11, 12]"));
}

#[test]
fn test_scan_discovery_matches_fixture() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(fixture_db(&dir)).unwrap();

    let counters = store.sequence_counters().unwrap();
    assert_eq!(counters, vec![("message".to_string(), RecordId(12))]);

    let create_sql = store.create_sql("message").unwrap().unwrap();
    assert_eq!(
        signature::autoincrement_column(&create_sql),
        Some("ROWID".to_string())
    );
}

#[test]
fn test_classify_generic_fixture() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(fixture_db(&dir)).unwrap();
    let profile = signature::classify(
        &store.list_tables().unwrap(),
        &store.sequence_tables().unwrap(),
    );
    // One table named "message" alone is not the full SMS signature.
    assert_eq!(profile, SourceProfile::Generic);
}

#[test]
fn test_non_integer_column_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("odd.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (id TEXT PRIMARY KEY, body TEXT);
         INSERT INTO notes VALUES ('a', 'first'), ('b', 'second');",
    )
    .unwrap();
    drop(conn);

    let store = SqliteStore::open(&path).unwrap();
    let err = store.read_column_values("notes", "id").unwrap_err();
    assert!(matches!(err, MirfError::NonIntegerDomain { .. }));
}

#[test]
fn test_unknown_table_and_column() {
    let dir = TempDir::new().unwrap();
    let store = SqliteStore::open(fixture_db(&dir)).unwrap();

    let err = store.read_column_values("nope", "ROWID").unwrap_err();
    assert!(matches!(err, MirfError::TableNotFound(_)));

    let err = store.read_column_values("message", "nope").unwrap_err();
    assert!(matches!(err, MirfError::ColumnNotFound(_)));
}

#[test]
fn test_empty_table_aborts_analysis() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.db");
    let conn = rusqlite::Connection::open(&path).unwrap();
    conn.execute_batch("CREATE TABLE message (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, t TEXT);")
        .unwrap();
    drop(conn);

    let store = SqliteStore::open(&path).unwrap();
    let analyzer = Analyzer::new(store);
    let err = analyzer.analyze("message", "ROWID", None).unwrap_err();
    assert!(matches!(err, MirfError::EmptySequence));
}
