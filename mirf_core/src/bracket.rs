//! Context bracketing for missing runs.
//!
//! Finds the surviving identifiers immediately below and above each maximal
//! missing run. Only those boundaries need a metadata fetch, so the result
//! bounds the number of context lookups to at most twice the number of runs,
//! independent of gap size.

use std::collections::BTreeSet;

use tracing::debug;

use crate::detect::GapResult;
use crate::sequence::SequenceSet;
use crate::types::RecordId;

/// Collects the "active" context identifiers worth fetching for `gaps`.
///
/// Each maximal missing run is processed exactly once: its boundaries are
/// the identifier just below the run start and the one just above the run
/// end, shared by every member of the run. A boundary is kept only when it
/// is an observed value; boundaries outside `[min, max]` have no surviving
/// row and map to "no context available".
///
/// The result is empty only when `gaps` is empty.
pub fn bracket(sequence: &SequenceSet, gaps: &GapResult) -> BTreeSet<RecordId> {
    let mut active = BTreeSet::new();
    let mut prev: Option<RecordId> = None;

    for id in gaps.missing() {
        let starts_run = prev.map_or(true, |p| p.succ() != id);
        if starts_run {
            if let Some(end) = prev {
                push_boundary(sequence, end.succ(), &mut active);
            }
            push_boundary(sequence, id.pred(), &mut active);
        }
        prev = Some(id);
    }
    if let Some(end) = prev {
        push_boundary(sequence, end.succ(), &mut active);
    }

    debug!(boundaries = active.len(), "bracketing complete");
    active
}

fn push_boundary(sequence: &SequenceSet, candidate: RecordId, active: &mut BTreeSet<RecordId>) {
    if sequence.contains(candidate) {
        active.insert(candidate);
    }
}
