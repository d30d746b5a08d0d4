//! mirf CLI layer - SQLite adapter, signatures, and command handling.
//!
//! The engine lives in `mirf_core`; this crate supplies the concrete
//! read-only SQLite store, known-database signature detection, and the
//! command-line front end.

pub mod cli;
pub mod signature;
pub mod sqlite;
