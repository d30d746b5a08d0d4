//! Storage abstraction layer.
//!
//! The engine never talks to a data source directly; concrete adapters (the
//! SQLite adapter lives in the CLI crate) implement these traits. Both
//! traits are synchronous: each call is a discrete, finite read, and the
//! engine batches context lookups so the number of fetches is bounded by
//! the number of missing runs rather than the number of missing rows.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::Result;
use crate::types::{ColumnInfo, ContextRecord, RecordId};

/// Read access to a tabular source exposing ordered integer key columns.
pub trait TableStore {
    /// Names of all tables in the source.
    fn list_tables(&self) -> Result<BTreeSet<String>>;

    /// Columns of `table` with their declared types.
    fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>>;

    /// All values of `column` in `table`. Unordered output is acceptable;
    /// the engine sorts internally.
    fn read_column_values(&self, table: &str, column: &str) -> Result<Vec<RecordId>>;

    /// The last identifier ever issued by the source's internal counter for
    /// `target_table`, when the source exposes such a counter in
    /// `counter_table`. `None` when no counter entry exists.
    fn read_high_water_mark(
        &self,
        counter_table: &str,
        target_table: &str,
    ) -> Result<Option<RecordId>>;
}

/// Batched retrieval of auxiliary fields for surviving rows.
pub trait RecordFetcher {
    /// Fetches `fields` for every identifier in `ids` found in `table`,
    /// keyed on `column`. Identifiers absent from the result simply had no
    /// surviving row. Callers pass `ids` as a sorted set so the batch is
    /// deterministic.
    fn fetch_context(
        &self,
        table: &str,
        column: &str,
        ids: &BTreeSet<RecordId>,
        fields: &[&str],
    ) -> Result<BTreeMap<RecordId, ContextRecord>>;
}
