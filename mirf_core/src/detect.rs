//! Gap detection over an observed sequence.
//!
//! Computes the exact set of missing identifiers for a sequence, split into
//! interior gaps (holes within the observed range) and a trailing gap
//! (identifiers past the observed maximum but at or below an externally
//! supplied high-water mark).

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::{MirfError, Result};
use crate::sequence::SequenceSet;
use crate::types::RecordId;

/// The missing-identifier set for one analysis.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GapResult {
    /// Holes strictly inside the observed range `[min, max]`
    pub interior: BTreeSet<RecordId>,
    /// Identifiers in `(max, high_water]`
    pub trailing: BTreeSet<RecordId>,
}

impl GapResult {
    /// The full missing set, interior and trailing combined, ascending.
    pub fn missing(&self) -> BTreeSet<RecordId> {
        self.interior.union(&self.trailing).copied().collect()
    }

    /// Total number of missing identifiers.
    pub fn count(&self) -> usize {
        self.interior.len() + self.trailing.len()
    }

    /// Returns true if no identifiers are missing.
    pub fn is_empty(&self) -> bool {
        self.interior.is_empty() && self.trailing.is_empty()
    }
}

/// Computes the missing-identifier set for `sequence`.
///
/// Interior gaps are the exact difference between the closed range
/// `[min, max]` and the observed values, found with a single sorted sweep
/// over consecutive observed values. Gap membership is decided by value
/// arithmetic only, never by position deltas in an enumerated list.
///
/// When `high_water` runs past the observed maximum, every identifier in
/// `(max, high_water]` is reported as a trailing gap: a counter ahead of the
/// surviving data is evidence that the most recently created records were
/// deleted, which the surviving rows alone cannot show.
///
/// # Errors
///
/// Returns [`MirfError::InvalidRange`] when `high_water` is behind the
/// observed maximum; the counter cannot lag the data it issued, so the
/// inconsistency is surfaced rather than ignored.
pub fn detect(sequence: &SequenceSet, high_water: Option<RecordId>) -> Result<GapResult> {
    if let Some(hw) = high_water {
        if hw < sequence.max() {
            return Err(MirfError::InvalidRange {
                high_water: hw,
                observed_max: sequence.max(),
            });
        }
    }

    let mut interior = BTreeSet::new();
    let mut prev: Option<RecordId> = None;
    for id in sequence.iter() {
        if let Some(prev) = prev {
            for missing in prev.0 + 1..id.0 {
                interior.insert(RecordId(missing));
            }
        }
        prev = Some(id);
    }

    let mut trailing = BTreeSet::new();
    if let Some(hw) = high_water {
        for missing in sequence.max().0 + 1..=hw.0 {
            trailing.insert(RecordId(missing));
        }
    }

    debug!(
        interior = interior.len(),
        trailing = trailing.len(),
        "gap detection complete"
    );
    Ok(GapResult { interior, trailing })
}
