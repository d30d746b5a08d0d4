//! Read-only SQLite access implementing the engine's store traits.

use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use mirf_core::error::{MirfError, Result};
use mirf_core::store::{RecordFetcher, TableStore};
use mirf_core::types::{ColumnInfo, ContextRecord, RecordId};
use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use tracing::debug;

/// SQLite database file header prefix; the full header is 100 bytes.
const SQLITE_MAGIC: &[u8; 16] = b"SQLite format 3\0";
const SQLITE_HEADER_LEN: u64 = 100;

/// The counter table SQLite maintains for AUTOINCREMENT columns.
pub const SEQUENCE_TABLE: &str = "sqlite_sequence";

/// A SQLite database opened read-only for analysis.
///
/// Evidence files are never written to: the connection is opened with
/// `SQLITE_OPEN_READ_ONLY` and the file format is validated before any
/// connection is made.
pub struct SqliteStore {
    conn: Connection,
    path: PathBuf,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore")
            .field("path", &self.path)
            .finish()
    }
}

impl SqliteStore {
    /// Opens `path` read-only after validating the SQLite file header.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        validate_header(path)?;

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| MirfError::Database(format!("Failed to open {}: {e}", path.display())))?;

        // Smoke query so a corrupt file fails here, not mid-analysis.
        conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
            .and_then(|mut stmt| stmt.query([]).map(|_| ()))
            .map_err(|e| MirfError::Database(format!("Not a readable SQLite database: {e}")))?;

        debug!(path = %path.display(), "opened database read-only");
        Ok(Self {
            conn,
            path: path.to_path_buf(),
        })
    }

    /// Path of the underlying database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Table names listed in `sqlite_sequence`, empty when the counter
    /// table does not exist.
    pub fn sequence_tables(&self) -> Result<BTreeSet<String>> {
        Ok(self
            .sequence_counters()?
            .into_iter()
            .map(|(name, _)| name)
            .collect())
    }

    /// (table, counter) pairs from `sqlite_sequence`, empty when the
    /// counter table does not exist.
    pub fn sequence_counters(&self) -> Result<Vec<(String, RecordId)>> {
        if !self.list_tables()?.contains(SEQUENCE_TABLE) {
            return Ok(Vec::new());
        }
        let mut stmt = self
            .conn
            .prepare("SELECT name, seq FROM sqlite_sequence ORDER BY name")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, RecordId(row.get::<_, i64>(1)?)))
            })
            .map_err(db_err)?;
        rows.collect::<std::result::Result<Vec<_>, _>>().map_err(db_err)
    }

    /// The stored `CREATE TABLE` statement for `table`, if any.
    pub fn create_sql(&self, table: &str) -> Result<Option<String>> {
        self.conn
            .query_row(
                "SELECT sql FROM sqlite_master WHERE type = 'table' AND name = ?1",
                [table],
                |row| row.get::<_, Option<String>>(0),
            )
            .map(|sql| sql.unwrap_or_default())
            .map(|sql| if sql.is_empty() { None } else { Some(sql) })
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(db_err(other)),
            })
    }

    fn require_table(&self, table: &str) -> Result<()> {
        if self.list_tables()?.contains(table) {
            Ok(())
        } else {
            Err(MirfError::TableNotFound(table.to_string()))
        }
    }

    fn require_column(&self, table: &str, column: &str) -> Result<()> {
        let known = self.list_columns(table)?;
        if known.iter().any(|c| c.name.eq_ignore_ascii_case(column)) {
            Ok(())
        } else {
            Err(MirfError::ColumnNotFound(format!("{table}.{column}")))
        }
    }
}

impl TableStore for SqliteStore {
    fn list_tables(&self) -> Result<BTreeSet<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM sqlite_master WHERE type = 'table'")
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(db_err)?;
        rows.collect::<std::result::Result<BTreeSet<_>, _>>()
            .map_err(db_err)
    }

    fn list_columns(&self, table: &str) -> Result<Vec<ColumnInfo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("PRAGMA table_info({})", quote_ident(table)))
            .map_err(db_err)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(ColumnInfo {
                    name: row.get::<_, String>(1)?,
                    declared_type: row.get::<_, String>(2)?,
                })
            })
            .map_err(db_err)?;
        let columns: Vec<ColumnInfo> = rows
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(db_err)?;
        if columns.is_empty() {
            return Err(MirfError::TableNotFound(table.to_string()));
        }
        Ok(columns)
    }

    fn read_column_values(&self, table: &str, column: &str) -> Result<Vec<RecordId>> {
        self.require_table(table)?;
        self.require_column(table, column)?;

        let sql = format!(
            "SELECT {} FROM {}",
            quote_ident(column),
            quote_ident(table)
        );
        let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
        let mut rows = stmt.query([]).map_err(db_err)?;

        let mut values = Vec::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            match row.get_ref(0).map_err(db_err)? {
                ValueRef::Integer(v) => values.push(RecordId(v)),
                other => {
                    return Err(MirfError::NonIntegerDomain {
                        table: table.to_string(),
                        column: column.to_string(),
                        value: value_display(other),
                    })
                }
            }
        }
        Ok(values)
    }

    fn read_high_water_mark(
        &self,
        counter_table: &str,
        target_table: &str,
    ) -> Result<Option<RecordId>> {
        if !self.list_tables()?.contains(counter_table) {
            return Ok(None);
        }
        let sql = format!(
            "SELECT seq FROM {} WHERE name = ?1",
            quote_ident(counter_table)
        );
        match self
            .conn
            .query_row(&sql, [target_table], |row| row.get::<_, i64>(0))
        {
            Ok(seq) => Ok(Some(RecordId(seq))),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(db_err(e)),
        }
    }
}

impl RecordFetcher for SqliteStore {
    fn fetch_context(
        &self,
        table: &str,
        column: &str,
        ids: &BTreeSet<RecordId>,
        fields: &[&str],
    ) -> Result<BTreeMap<RecordId, ContextRecord>> {
        if ids.is_empty() {
            return Ok(BTreeMap::new());
        }
        self.require_table(table)?;
        self.require_column(table, column)?;
        for field in fields {
            self.require_column(table, field)?;
        }

        // One batched query for the whole boundary set; the IN list is
        // built from an explicitly sorted sequence.
        let id_list = ids
            .iter()
            .map(|id| id.0.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let mut select = quote_ident(column);
        for field in fields {
            select.push_str(", ");
            select.push_str(&quote_ident(field));
        }
        let sql = format!(
            "SELECT {select} FROM {} WHERE {} IN ({id_list})",
            quote_ident(table),
            quote_ident(column)
        );
        debug!(table, boundaries = ids.len(), "fetching bracketing context");

        let mut stmt = self.conn.prepare(&sql).map_err(db_err)?;
        let mut rows = stmt.query([]).map_err(db_err)?;

        let mut context = BTreeMap::new();
        while let Some(row) = rows.next().map_err(db_err)? {
            let id = match row.get_ref(0).map_err(db_err)? {
                ValueRef::Integer(v) => RecordId(v),
                other => {
                    return Err(MirfError::NonIntegerDomain {
                        table: table.to_string(),
                        column: column.to_string(),
                        value: value_display(other),
                    })
                }
            };
            let record = if fields.is_empty() {
                ContextRecord::bare(id)
            } else {
                let mut payload = serde_json::Map::new();
                for (i, field) in fields.iter().enumerate() {
                    let value = row.get_ref(i + 1).map_err(db_err)?;
                    payload.insert(field.to_string(), value_json(value));
                }
                ContextRecord::with_fields(id, serde_json::Value::Object(payload))
            };
            context.insert(id, record);
        }
        Ok(context)
    }
}

/// Rejects files that are not SQLite 3 databases before connecting.
fn validate_header(path: &Path) -> Result<()> {
    let mut file = File::open(path)?;
    if file.metadata()?.len() < SQLITE_HEADER_LEN {
        return Err(MirfError::Database(format!(
            "{}: too small to be a SQLite database",
            path.display()
        )));
    }
    let mut magic = [0u8; 16];
    file.read_exact(&mut magic)?;
    if &magic != SQLITE_MAGIC {
        return Err(MirfError::Database(format!(
            "{}: not a SQLite 3 database",
            path.display()
        )));
    }
    Ok(())
}

/// Double-quote an identifier for safe interpolation into SQL.
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn db_err(e: rusqlite::Error) -> MirfError {
    MirfError::Database(e.to_string())
}

fn value_display(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => "NULL".to_string(),
        ValueRef::Integer(v) => v.to_string(),
        ValueRef::Real(v) => v.to_string(),
        ValueRef::Text(t) => String::from_utf8_lossy(t).into_owned(),
        ValueRef::Blob(b) => format!("<blob {} bytes>", b.len()),
    }
}

fn value_json(value: ValueRef<'_>) -> serde_json::Value {
    match value {
        ValueRef::Null => serde_json::Value::Null,
        ValueRef::Integer(v) => serde_json::Value::from(v),
        ValueRef::Real(v) => serde_json::Number::from_f64(v)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        ValueRef::Text(t) => serde_json::Value::String(String::from_utf8_lossy(t).into_owned()),
        ValueRef::Blob(b) => serde_json::Value::String(format!("<blob {} bytes>", b.len())),
    }
}
