//! Core types for mirf.

use serde::Serialize;

/// Identifier drawn from the analyzed key domain.
///
/// Wraps the raw integer key so sequence values are never confused with
/// counts or array indexes. Comparisons follow the key domain's total order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct RecordId(pub i64);

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl RecordId {
    /// The identifier immediately before this one.
    pub fn pred(self) -> RecordId {
        RecordId(self.0 - 1)
    }

    /// The identifier immediately after this one.
    pub fn succ(self) -> RecordId {
        RecordId(self.0 + 1)
    }
}

/// A surviving row adjacent to a missing run.
///
/// `fields` carries the opaque payload (timestamp, text, etc.) fetched for
/// the row; `None` means no metadata was retrievable for the identifier.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ContextRecord {
    /// Identifier of the surviving row
    pub id: RecordId,
    /// Fetched auxiliary fields, keyed by column name
    pub fields: Option<serde_json::Value>,
}

impl ContextRecord {
    /// A context record with no fetched metadata.
    pub fn bare(id: RecordId) -> Self {
        Self { id, fields: None }
    }

    /// A context record carrying fetched fields.
    pub fn with_fields(id: RecordId, fields: serde_json::Value) -> Self {
        Self {
            id,
            fields: Some(fields),
        }
    }

    /// Short human-readable label for report statements: the identifier,
    /// annotated with a timestamp field when the payload carries one.
    pub fn label(&self) -> String {
        const TIME_KEYS: [&str; 4] = ["date", "timestamp", "time", "zdate"];
        if let Some(obj) = self.fields.as_ref().and_then(|f| f.as_object()) {
            for (key, value) in obj {
                if TIME_KEYS.contains(&key.to_ascii_lowercase().as_str()) {
                    return format!("record {} ({}={})", self.id, key, value_text(value));
                }
            }
        }
        format!("record {}", self.id)
    }
}

/// Renders a payload value without JSON string quoting.
pub(crate) fn value_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// One entry in the merged, identifier-sorted analysis stream.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum Marker {
    /// A surviving row with fetched context
    Present(ContextRecord),
    /// A missing identifier
    Missing(RecordId),
}

impl Marker {
    /// The identifier this marker is positioned at.
    pub fn id(&self) -> RecordId {
        match self {
            Marker::Present(rec) => rec.id,
            Marker::Missing(id) => *id,
        }
    }

    /// Returns true if this marker denotes a missing identifier.
    pub fn is_missing(&self) -> bool {
        matches!(self, Marker::Missing(_))
    }
}

/// Position of a gap run relative to the whole marker stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum RunPosition {
    /// Run starts at the very first marker
    Leading,
    /// Run is surrounded by surviving rows
    Interior,
    /// Run ends at the very last marker
    Trailing,
}

/// A maximal run of consecutive missing identifiers, annotated with the
/// surviving rows that bracket it.
///
/// Built by the run grouper in a single pass over the marker stream and
/// never mutated afterward.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GapRun {
    /// Missing identifiers, ascending
    pub identifiers: Vec<RecordId>,
    /// Position relative to the stream
    pub position: RunPosition,
    /// Nearest surviving row below the run, if any
    pub before: Option<ContextRecord>,
    /// Nearest surviving row above the run, if any
    pub after: Option<ContextRecord>,
}

impl GapRun {
    /// Number of missing identifiers in this run.
    pub fn count(&self) -> usize {
        self.identifiers.len()
    }
}

/// Column metadata reported by a table store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ColumnInfo {
    /// Column name
    pub name: String,
    /// Declared type from the source schema, verbatim
    pub declared_type: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_id_ordering() {
        assert!(RecordId(3) < RecordId(7));
        assert_eq!(RecordId(5).pred(), RecordId(4));
        assert_eq!(RecordId(5).succ(), RecordId(6));
    }

    #[test]
    fn test_marker_id() {
        let present = Marker::Present(ContextRecord::bare(RecordId(3)));
        let missing = Marker::Missing(RecordId(4));
        assert_eq!(present.id(), RecordId(3));
        assert_eq!(missing.id(), RecordId(4));
        assert!(!present.is_missing());
        assert!(missing.is_missing());
    }

    #[test]
    fn test_label_prefers_timestamp_field() {
        let rec = ContextRecord::with_fields(
            RecordId(7),
            json!({"date": "2020-12-22", "text": "hello"}),
        );
        assert_eq!(rec.label(), "record 7 (date=2020-12-22)");
    }

    #[test]
    fn test_label_without_fields() {
        assert_eq!(ContextRecord::bare(RecordId(9)).label(), "record 9");
    }
}
