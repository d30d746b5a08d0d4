//! Run grouping over the merged marker stream.
//!
//! Merges fetched context records with missing identifiers into one
//! identifier-sorted stream, then collapses that stream into maximal runs of
//! consecutive missing markers annotated with their surrounding context.

use std::collections::BTreeMap;

use crate::detect::GapResult;
use crate::types::{ContextRecord, GapRun, Marker, RecordId, RunPosition};

/// Merges fetched context with the missing set into an id-sorted stream.
///
/// Every identifier in `gaps` contributes a `Missing` marker; every fetched
/// record contributes a `Present` marker.
pub fn merge_markers(
    gaps: &GapResult,
    context: &BTreeMap<RecordId, ContextRecord>,
) -> Vec<Marker> {
    let mut markers: Vec<Marker> = context.values().cloned().map(Marker::Present).collect();
    markers.extend(gaps.missing().into_iter().map(Marker::Missing));
    markers.sort_by_key(Marker::id);
    markers
}

/// State of the run currently being extended during the scan.
struct OpenRun {
    identifiers: Vec<RecordId>,
    starts_stream: bool,
    before: Option<ContextRecord>,
}

impl OpenRun {
    fn close(self, after: Option<ContextRecord>, ends_stream: bool) -> GapRun {
        let position = if self.starts_stream {
            RunPosition::Leading
        } else if ends_stream {
            RunPosition::Trailing
        } else {
            RunPosition::Interior
        };
        GapRun {
            identifiers: self.identifiers,
            position,
            before: self.before,
            after,
        }
    }
}

/// Collapses an id-sorted marker stream into maximal missing runs.
///
/// Single left-to-right scan with an explicit accumulator. A run opens at a
/// `Missing` marker that does not extend the previous run and closes at the
/// next `Present` marker or at end of input. Concatenating the identifier
/// sequences of the returned runs reproduces exactly the missing markers of
/// the input, in order.
pub fn group(markers: &[Marker]) -> Vec<GapRun> {
    let mut runs = Vec::new();
    let mut open: Option<OpenRun> = None;
    let mut last_present: Option<ContextRecord> = None;

    for (idx, marker) in markers.iter().enumerate() {
        match marker {
            Marker::Missing(id) => match open.as_mut() {
                Some(run) => run.identifiers.push(*id),
                None => {
                    open = Some(OpenRun {
                        identifiers: vec![*id],
                        starts_stream: idx == 0,
                        before: last_present.clone(),
                    });
                }
            },
            Marker::Present(rec) => {
                if let Some(run) = open.take() {
                    runs.push(run.close(Some(rec.clone()), false));
                }
                last_present = Some(rec.clone());
            }
        }
    }
    if let Some(run) = open.take() {
        runs.push(run.close(None, true));
    }
    runs
}
