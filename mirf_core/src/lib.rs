//! mirf - Missing Record Finder
//!
//! Detects evidence of record deletion in tabular data stores by analyzing
//! ordered integer key sequences (primary keys, autoincrement counters, row
//! identifiers) for numeric gaps. Used for digital-forensic triage on
//! datasets such as message stores and call-history stores: it proves that
//! rows were removed even when the rows themselves are gone.
//!
//! # Overview
//!
//! The engine is a pipeline of pure, synchronous stages:
//!
//! - [`sequence`]: the distinct observed key values for a (table, column)
//!   pair, with range and membership queries
//! - [`detect`]: the exact missing-identifier set, split into interior gaps
//!   and a trailing gap below an external high-water mark
//! - [`bracket`]: the nearest surviving identifiers around each missing run
//! - [`group`]: maximal contiguous missing runs with surrounding context
//! - [`report`]: forensic statements and a fixed-width stream table
//!
//! Data sources sit behind the [`store`] traits; the CLI crate provides a
//! read-only SQLite adapter.
//!
//! # Quick Start
//!
//! ```rust
//! use mirf_core::{detect, sequence::SequenceSet, types::RecordId};
//!
//! fn main() -> mirf_core::Result<()> {
//!     let seq = SequenceSet::from_values([1, 2, 3, 7, 8, 10].map(RecordId))?;
//!     let gaps = detect::detect(&seq, None)?;
//!     assert_eq!(gaps.count(), 4);
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod types;

// Engine stages
pub mod bracket;
pub mod detect;
pub mod group;
pub mod report;
pub mod sequence;

// Data source seam
pub mod store;

// Re-export commonly used types
pub use detect::GapResult;
pub use error::{MirfError, Result};
pub use sequence::SequenceSet;
pub use store::{RecordFetcher, TableStore};
pub use types::{ContextRecord, GapRun, Marker, RecordId, RunPosition};

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::info;

/// Full analysis output for one (table, column) pair.
///
/// Carries the grouped runs, the rendered statements, and the merged marker
/// stream so callers can produce both the statement report and the tabular
/// rendering without re-running the pipeline.
#[derive(Clone, Debug, Serialize)]
pub struct GapReport {
    /// Analyzed table
    pub table: String,
    /// Analyzed key column
    pub column: String,
    /// Number of distinct observed identifiers
    pub observed: usize,
    /// Smallest observed identifier
    pub min: RecordId,
    /// Largest observed identifier
    pub max: RecordId,
    /// High-water mark used for trailing-gap detection, if any
    pub high_water: Option<RecordId>,
    /// Total number of missing identifiers
    pub missing: usize,
    /// Maximal missing runs with bracketing context
    pub runs: Vec<GapRun>,
    /// One forensic statement per run
    pub statements: Vec<String>,
    /// The merged marker stream backing the tabular rendering
    pub markers: Vec<Marker>,
}

impl GapReport {
    /// Returns true if the analyzed sequence has no missing identifiers.
    pub fn is_clean(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Main entry point: orchestrates one analysis run over a store.
///
/// All engine stages operate on materialized in-memory data; the only
/// blocking calls are the store reads, batched so that context lookups are
/// bounded by the number of missing runs.
#[derive(Clone, Debug)]
pub struct Analyzer<S> {
    store: S,
}

impl<S> Analyzer<S> {
    /// Wraps a store for analysis.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }
}

impl<S: TableStore + RecordFetcher> Analyzer<S> {
    /// Materializes the observed sequence for `table.column`.
    pub fn sequence(&self, table: &str, column: &str) -> Result<SequenceSet> {
        let values = self.store.read_column_values(table, column)?;
        SequenceSet::from_values(values)
    }

    /// Computes the missing-identifier set for `table.column`.
    ///
    /// Fails before any gap computation when the column is empty or the
    /// high-water mark is behind the observed maximum; no partial results.
    pub fn analyze(
        &self,
        table: &str,
        column: &str,
        high_water: Option<RecordId>,
    ) -> Result<GapResult> {
        let seq = self.sequence(table, column)?;
        detect::detect(&seq, high_water)
    }

    /// Runs the full pipeline and assembles a report.
    ///
    /// `fields` names the auxiliary columns fetched for bracketing context
    /// (for example a timestamp and a payload column).
    pub fn build_report(
        &self,
        table: &str,
        column: &str,
        high_water: Option<RecordId>,
        fields: &[&str],
    ) -> Result<GapReport> {
        let seq = self.sequence(table, column)?;
        let gaps = detect::detect(&seq, high_water)?;
        let active = bracket::bracket(&seq, &gaps);
        let context = if active.is_empty() {
            BTreeMap::new()
        } else {
            self.store.fetch_context(table, column, &active, fields)?
        };
        let markers = group::merge_markers(&gaps, &context);
        let runs = group::group(&markers);
        let statements = report::render(&runs);

        info!(
            table,
            column,
            observed = seq.len(),
            missing = gaps.count(),
            runs = runs.len(),
            "analysis complete"
        );

        Ok(GapReport {
            table: table.to_string(),
            column: column.to_string(),
            observed: seq.len(),
            min: seq.min(),
            max: seq.max(),
            high_water,
            missing: gaps.count(),
            runs,
            statements,
            markers,
        })
    }
}
