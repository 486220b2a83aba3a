// pokedex-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite History Store
// Description: Durable HistoryStore backed by SQLite.
// Purpose: Append search records and list them newest first.
// Dependencies: pokedex-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements [`HistoryStore`] over one `SQLite` connection held
//! behind a mutex. Inserts use `INSERT ... RETURNING` so the id and timestamp
//! come from the database defaults. Listings order by timestamp then id, both
//! descending. Database contents are untrusted: every row is re-validated on
//! read and rejected as corrupt when it breaks the record invariants.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use pokedex_core::HistoryStore;
use pokedex_core::RecordId;
use pokedex_core::RecordedAt;
use pokedex_core::SearchRecord;
use pokedex_core::SearchTerm;
use pokedex_core::StoreError;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::params;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `journal_mode` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
///
/// # Invariants
/// - Values map 1:1 to `SQLite` `synchronous` pragma settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` history store.
///
/// # Invariants
/// - `path` must resolve to a file path (not a directory).
/// - `busy_timeout_ms` is interpreted as milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config for `path` with default pragmas and timeout.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error, Clone)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row violates record invariants.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store input or configuration.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
        }
    }
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// SQLite-backed search history store.
///
/// # Invariants
/// - A single connection is shared; writes are serialized by its mutex.
/// - Ids and timestamps are assigned by the database, never by callers.
#[derive(Clone)]
pub struct SqliteHistoryStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteHistoryStore {
    /// Opens an `SQLite`-backed history store, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized, or when an existing schema version is unsupported.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the database file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Verifies the store can execute a simple SQL statement.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] if the mutex is poisoned or the query fails.
    pub fn readiness(&self) -> Result<(), SqliteStoreError> {
        let guard = self.lock()?;
        guard
            .query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        Ok(())
    }

    /// Inserts a search term and returns the stored record.
    fn insert(&self, term: &SearchTerm) -> Result<SearchRecord, SqliteStoreError> {
        let guard = self.lock()?;
        let row = guard
            .query_row(
                "INSERT INTO searches (term) VALUES (?1) RETURNING id, term, timestamp",
                params![term.as_str()],
                read_raw_row,
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        drop(guard);
        row.into_record()
    }

    /// Selects the newest `limit` records.
    fn select_recent(&self, limit: usize) -> Result<Vec<SearchRecord>, SqliteStoreError> {
        let limit = i64::try_from(limit)
            .map_err(|_| SqliteStoreError::Invalid("history limit out of range".to_string()))?;
        let guard = self.lock()?;
        let mut stmt = guard
            .prepare(
                "SELECT id, term, timestamp FROM searches ORDER BY timestamp DESC, id DESC LIMIT \
                 ?1",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let rows = stmt
            .query_map(params![limit], read_raw_row)
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        let mut records = Vec::new();
        for row in rows {
            let row = row.map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            records.push(row.into_record()?);
        }
        Ok(records)
    }

    /// Acquires the connection lock.
    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, SqliteStoreError> {
        self.connection
            .lock()
            .map_err(|_| SqliteStoreError::Io("sqlite connection mutex poisoned".to_string()))
    }
}

impl HistoryStore for SqliteHistoryStore {
    fn append(&self, term: &SearchTerm) -> Result<SearchRecord, StoreError> {
        self.insert(term).map_err(StoreError::from)
    }

    fn recent(&self, limit: usize) -> Result<Vec<SearchRecord>, StoreError> {
        self.select_recent(limit).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Untrusted row as read from the `searches` table.
struct RawSearchRow {
    /// Raw `id` column.
    id: i64,
    /// Raw `term` column.
    term: String,
    /// Raw `timestamp` column (unix milliseconds).
    timestamp: i64,
}

impl RawSearchRow {
    /// Validates the row against record invariants.
    fn into_record(self) -> Result<SearchRecord, SqliteStoreError> {
        let id = RecordId::from_raw(self.id)
            .ok_or_else(|| SqliteStoreError::Corrupt(format!("invalid record id {}", self.id)))?;
        let term = SearchTerm::parse(&self.term)
            .map_err(|err| SqliteStoreError::Corrupt(format!("record {id}: {err}")))?;
        if term.as_str() != self.term {
            return Err(SqliteStoreError::Corrupt(format!("record {id}: term is not normalized")));
        }
        Ok(SearchRecord {
            id,
            term,
            timestamp: RecordedAt::from_unix_millis(self.timestamp),
        })
    }
}

/// Reads the `id, term, timestamp` projection from a row.
fn read_raw_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawSearchRow> {
    Ok(RawSearchRow {
        id: row.get(0)?,
        term: row.get(1)?,
        timestamp: row.get(2)?,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    if path.as_os_str().is_empty() {
        return Err(SqliteStoreError::Invalid("store path must not be empty".to_string()));
    }
    if path.as_os_str().len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    if path.components().any(|component| component.as_os_str().len() > MAX_PATH_COMPONENT_LENGTH)
    {
        return Err(SqliteStoreError::Invalid(
            "store path contains an overlong component".to_string(),
        ));
    }
    if path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with the configured pragmas.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(connection)
}

/// Column layout of the `searches` table as `(name, declared type)` pairs.
const SEARCHES_COLUMNS: [(&str, &str); 3] =
    [("id", "INTEGER"), ("term", "TEXT"), ("timestamp", "INTEGER")];

/// Rejects a pre-existing unversioned `searches` table whose columns differ.
///
/// Databases written by other tools may carry a `searches` table with a
/// `DATETIME` timestamp; those are never stamped with the current version.
fn ensure_searches_table_compatible(connection: &Connection) -> Result<(), SqliteStoreError> {
    let mut stmt = connection
        .prepare("PRAGMA table_info(searches)")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let columns = stmt
        .query_map(params![], |row| Ok((row.get::<_, String>(1)?, row.get::<_, String>(2)?)))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    if columns.is_empty() {
        return Ok(());
    }
    let matches = columns.len() == SEARCHES_COLUMNS.len()
        && columns.iter().zip(SEARCHES_COLUMNS).all(|((name, kind), (want_name, want_kind))| {
            name == want_name && kind.eq_ignore_ascii_case(want_kind)
        });
    if matches {
        Ok(())
    } else {
        let found: Vec<String> =
            columns.iter().map(|(name, kind)| format!("{name} {kind}")).collect();
        Err(SqliteStoreError::VersionMismatch(format!(
            "unversioned searches table has incompatible columns: {}",
            found.join(", ")
        )))
    }
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            ensure_searches_table_compatible(&tx)?;
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS searches (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    term TEXT NOT NULL,
                    timestamp INTEGER NOT NULL
                        DEFAULT (CAST((julianday('now') - 2440587.5) * 86400000 AS INTEGER))
                );
                CREATE INDEX IF NOT EXISTS idx_searches_recent
                    ON searches (timestamp DESC, id DESC);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}
