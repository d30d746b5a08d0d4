//! Command-line interface for mirf.
//!
//! # Examples
//!
//! Discover autoincrement columns and analyze each one:
//!
//! ```bash
//! $ mirf sms.db scan --fields date
//! ```
//!
//! Analyze one table explicitly:
//!
//! ```bash
//! $ mirf sms.db analyze message ROWID --fields date --stream
//! ```
//!
//! List tables and columns:
//!
//! ```bash
//! $ mirf sms.db tables
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use mirf_core::report::render_table;
use mirf_core::types::RecordId;
use mirf_core::{Analyzer, GapReport, TableStore};
use tracing::{info, warn};

use crate::signature;
use crate::sqlite::{SqliteStore, SEQUENCE_TABLE};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "mirf", about = "Missing record finder for SQLite databases")]
pub struct Cli {
    /// Path to the SQLite database file (opened read-only)
    pub db: PathBuf,

    #[command(subcommand)]
    pub action: Action,
}

/// Analysis actions available via CLI.
#[derive(Subcommand, Debug)]
pub enum Action {
    /// Discover autoincrement key columns and analyze each for gaps
    Scan {
        /// Context fields to fetch for rows bracketing each gap
        #[arg(short, long)]
        fields: Vec<String>,

        /// Emit reports as JSON
        #[arg(long)]
        json: bool,
    },

    /// Analyze one table and key column
    Analyze {
        /// Table to analyze
        table: String,

        /// Integer key column to analyze
        column: String,

        /// Override the high-water mark (defaults to sqlite_sequence when present)
        #[arg(long)]
        high_water: Option<i64>,

        /// Context fields to fetch for rows bracketing each gap
        #[arg(short, long)]
        fields: Vec<String>,

        /// Also print the merged marker stream as a fixed-width table
        #[arg(long)]
        stream: bool,

        /// Emit the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List tables and columns with their declared types
    Tables,
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let store = SqliteStore::open(&cli.db)
        .with_context(|| format!("opening {}", cli.db.display()))?;
    let analyzer = Analyzer::new(store);

    match cli.action {
        Action::Tables => run_tables(analyzer.store()),
        Action::Scan { fields, json } => run_scan(&analyzer, &fields, json),
        Action::Analyze {
            table,
            column,
            high_water,
            fields,
            stream,
            json,
        } => run_analyze(&analyzer, &table, &column, high_water, &fields, stream, json),
    }
}

fn run_tables(store: &SqliteStore) -> anyhow::Result<()> {
    let sequence_tables = store.sequence_tables()?;
    for table in store.list_tables()? {
        let counter = if sequence_tables.contains(&table) {
            "  [autoincrement]"
        } else {
            ""
        };
        println!("{table}{counter}");
        for col in store.list_columns(&table)? {
            println!("    {}  {}", col.name, col.declared_type);
        }
    }
    Ok(())
}

fn run_scan(
    analyzer: &Analyzer<SqliteStore>,
    fields: &[String],
    json: bool,
) -> anyhow::Result<()> {
    let store = analyzer.store();
    let all_tables = store.list_tables()?;
    let sequence_tables = store.sequence_tables()?;
    let profile = signature::classify(&all_tables, &sequence_tables);
    info!(profile = profile.as_str(), "classified database");
    println!("Profile: {}", profile.as_str());

    let counters = store.sequence_counters()?;
    if counters.is_empty() {
        println!(
            "No '{SEQUENCE_TABLE}' table: nothing to scan automatically. \
             Use `analyze <table> <column>` for an explicit target."
        );
        return Ok(());
    }

    let mut failures = 0usize;
    for (table, high_water) in counters {
        let Some(create_sql) = store.create_sql(&table)? else {
            warn!(table = %table, "no stored CREATE TABLE statement, skipping");
            continue;
        };
        let Some(column) = signature::autoincrement_column(&create_sql) else {
            info!(table = %table, "no AUTOINCREMENT column, skipping");
            continue;
        };

        println!();
        println!("== {table}.{column} (high-water {high_water}) ==");
        match analyzer.build_report(&table, &column, Some(high_water), &field_refs(fields)) {
            Ok(report) => print_report(&report, fields, false, json)?,
            Err(err) => {
                eprintln!("error: {table}.{column}: {err}");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} table(s) could not be analyzed");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_analyze(
    analyzer: &Analyzer<SqliteStore>,
    table: &str,
    column: &str,
    high_water: Option<i64>,
    fields: &[String],
    stream: bool,
    json: bool,
) -> anyhow::Result<()> {
    // Explicit override wins; otherwise consult the source's own counter.
    let high_water = match high_water {
        Some(hw) => Some(RecordId(hw)),
        None => analyzer.store().read_high_water_mark(SEQUENCE_TABLE, table)?,
    };

    let report = analyzer
        .build_report(table, column, high_water, &field_refs(fields))
        .with_context(|| format!("analyzing {table}.{column}"))?;
    print_report(&report, fields, stream, json)
}

fn print_report(
    report: &GapReport,
    fields: &[String],
    stream: bool,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    println!(
        "{}.{}: {} observed, range {}..{}{}",
        report.table,
        report.column,
        report.observed,
        report.min,
        report.max,
        match report.high_water {
            Some(hw) => format!(", high-water {hw}"),
            None => String::new(),
        }
    );
    if report.is_clean() {
        println!("no missing entries");
        return Ok(());
    }

    println!("{} missing identifier(s) in {} run(s):", report.missing, report.runs.len());
    for statement in &report.statements {
        println!("[+] {statement}");
    }
    if stream {
        println!();
        for line in render_table(&report.markers, &field_refs(fields)) {
            println!("{line}");
        }
    }
    Ok(())
}

fn field_refs(fields: &[String]) -> Vec<&str> {
    fields.iter().map(String::as_str).collect()
}
