//! Observed key sequences.

use std::collections::BTreeSet;

use crate::error::{MirfError, Result};
use crate::types::RecordId;

/// The distinct observed key values for one (table, column) pair.
///
/// Built once per analysis from the raw column values (unordered input is
/// acceptable, duplicates collapse) and immutable afterward. Construction
/// rejects empty input so "no data" is never confused with "no gaps".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceSet {
    values: BTreeSet<RecordId>,
    min: RecordId,
    max: RecordId,
}

impl SequenceSet {
    /// Builds a sequence set from observed column values.
    ///
    /// # Errors
    ///
    /// Returns [`MirfError::EmptySequence`] when no values were observed.
    pub fn from_values(values: impl IntoIterator<Item = RecordId>) -> Result<Self> {
        let values: BTreeSet<RecordId> = values.into_iter().collect();
        match (values.first().copied(), values.last().copied()) {
            (Some(min), Some(max)) => Ok(Self { values, min, max }),
            _ => Err(MirfError::EmptySequence),
        }
    }

    /// Smallest observed identifier.
    pub fn min(&self) -> RecordId {
        self.min
    }

    /// Largest observed identifier.
    pub fn max(&self) -> RecordId {
        self.max
    }

    /// Number of distinct observed identifiers.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Always false; empty input is rejected at construction.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Width of the closed observed range `[min, max]`.
    pub fn span(&self) -> u64 {
        (self.max.0 - self.min.0) as u64 + 1
    }

    /// Returns true if `id` was observed.
    pub fn contains(&self, id: RecordId) -> bool {
        self.values.contains(&id)
    }

    /// Iterates the observed identifiers in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = RecordId> + '_ {
        self.values.iter().copied()
    }
}
