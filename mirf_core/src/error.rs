//! Error types for mirf.

use crate::types::RecordId;

/// Main error type for mirf.
///
/// All mirf operations return `Result<T> = std::result::Result<T, MirfError>`.
///
/// The first three variants are structural precondition violations: they are
/// detected before any gap computation begins and abort the analysis for the
/// affected (table, column) pair. Once detection has started, the remaining
/// pipeline stages are total functions over well-formed inputs.
#[derive(thiserror::Error, Debug)]
pub enum MirfError {
    /// The observed column has no values; nothing to analyze.
    #[error("Observed sequence is empty: nothing to analyze")]
    EmptySequence,

    /// A supplied high-water mark is behind the observed maximum, which a
    /// well-formed counter cannot be. Signals a data-source inconsistency.
    #[error("High-water mark {high_water} is behind observed maximum {observed_max}")]
    InvalidRange {
        /// The externally supplied counter value
        high_water: RecordId,
        /// Largest identifier actually observed
        observed_max: RecordId,
    },

    /// A value in the analyzed column is not representable as an integer
    /// identifier.
    #[error("Non-integer value {value} in {table}.{column}")]
    NonIntegerDomain {
        /// Table being analyzed
        table: String,
        /// Column being analyzed
        column: String,
        /// Display form of the offending value
        value: String,
    },

    /// Requested table does not exist in the source.
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// Requested column does not exist on the table.
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Result with MirfError.
pub type Result<T> = std::result::Result<T, MirfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MirfError::InvalidRange {
            high_water: RecordId(2),
            observed_max: RecordId(3),
        };
        assert_eq!(
            err.to_string(),
            "High-water mark 2 is behind observed maximum 3"
        );
    }

    #[test]
    fn test_empty_sequence_display() {
        let err = MirfError::EmptySequence;
        assert!(err.to_string().contains("nothing to analyze"));
    }
}
