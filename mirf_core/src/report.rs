//! Forensic report rendering.
//!
//! Turns grouped runs into one human-readable statement per run, plus an
//! optional fixed-width table of the full marker stream. This stage only
//! formats already-validated data and cannot fail.

use crate::types::{value_text, GapRun, Marker, RunPosition};

const ID_WIDTH: usize = 10;
const STATUS_WIDTH: usize = 7;
const FIELD_WIDTH: usize = 24;

/// Renders one forensic statement per run, in stream order.
pub fn render(runs: &[GapRun]) -> Vec<String> {
    runs.iter().map(statement).collect()
}

fn statement(run: &GapRun) -> String {
    let count = run.count();
    let ids = format_ids(run);
    match (run.position, &run.before, &run.after) {
        (RunPosition::Leading, _, Some(after)) => format!(
            "{count} record(s) missing before {}; missing identifiers: {ids}",
            after.label()
        ),
        (RunPosition::Trailing, Some(before), _) => format!(
            "{count} record(s) missing after {}; missing identifiers: {ids}",
            before.label()
        ),
        (_, Some(before), Some(after)) => format!(
            "{count} record(s) missing between {} and {}; missing identifiers: {ids}",
            before.label(),
            after.label()
        ),
        _ => format!("{count} record(s) missing (identifiers: {ids})"),
    }
}

fn format_ids(run: &GapRun) -> String {
    let mut out = String::from("[");
    for (i, id) in run.identifiers.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        out.push_str(&id.to_string());
    }
    out.push(']');
    out
}

/// Renders the full marker stream as a fixed-width table.
///
/// One row per marker: identifier, status, then one column per requested
/// field. Overlong payload values are truncated. A visual break row is
/// inserted wherever consecutive rendered identifiers differ by more than 1,
/// signalling a jump in the stream not otherwise annotated.
pub fn render_table(markers: &[Marker], fields: &[&str]) -> Vec<String> {
    let mut lines = Vec::new();
    if markers.is_empty() {
        return lines;
    }

    let width = ID_WIDTH + 2 + STATUS_WIDTH + fields.len() * (2 + FIELD_WIDTH);
    let mut header = format!("{:>ID_WIDTH$}  {:<STATUS_WIDTH$}", "id", "status");
    for field in fields {
        header.push_str(&format!("  {:<FIELD_WIDTH$}", truncate(field, FIELD_WIDTH)));
    }
    lines.push(header);
    lines.push("-".repeat(width));

    let mut prev_id = None;
    for marker in markers {
        if let Some(prev) = prev_id {
            if marker.id().0 - prev > 1 {
                lines.push("~".repeat(width));
            }
        }
        lines.push(row(marker, fields));
        prev_id = Some(marker.id().0);
    }
    lines
}

fn row(marker: &Marker, fields: &[&str]) -> String {
    let status = if marker.is_missing() { "MISSING" } else { "ok" };
    let mut line = format!("{:>ID_WIDTH$}  {:<STATUS_WIDTH$}", marker.id().to_string(), status);
    for field in fields {
        let cell = match marker {
            Marker::Present(rec) => rec
                .fields
                .as_ref()
                .and_then(|f| f.get(*field))
                .map(value_text)
                .unwrap_or_default(),
            Marker::Missing(_) => "-".to_string(),
        };
        line.push_str(&format!("  {:<FIELD_WIDTH$}", truncate(&cell, FIELD_WIDTH)));
    }
    line
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
