//! File-backed JSON record store.
//!
//! `JsonDatabase` mirrors a single JSON document of the shape
//! `{ "<table>": [ <record>, ... ] }` in memory. Reads are synchronous and
//! served from the last committed snapshot; mutations are serialized through
//! one async write gate, applied to a copy of the snapshot, persisted as a
//! whole document, and only then swapped in. Readers therefore never observe
//! a mutation that has not reached disk, and concurrent writers cannot lose
//! each other's changes.
//!
//! Record ids are not checked for uniqueness on insert: callers must not
//! insert two records with the same `id` into one table. `update` and
//! `delete` act on the first record carrying the id.

use super::catalog::{StoreInfo, validate_table_name};
use super::filter::PartialMatch;
use super::persistence::{LoadOutcome, SnapshotFile};
use crate::core::types::require_id;
use crate::core::{Database, DbError, ID_FIELD, Record, Result, record_id};
use serde::Serialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{error, info, warn};

pub const DEFAULT_FILENAME: &str = "db.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreStatus {
    Uninitialized,
    Initializing,
    Ready,
}

/// Where the backing document lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub directory: PathBuf,
    pub filename: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            directory: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            filename: DEFAULT_FILENAME.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn new(directory: impl Into<PathBuf>, filename: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            filename: filename.into(),
        }
    }

    pub fn path(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }
}

struct StoreState {
    status: StoreStatus,
    tables: Arc<Database>,
}

/// Result of applying a mutation to the working copy.
enum Outcome<T> {
    Persist(T),
    Unchanged(T),
}

pub struct JsonDatabase {
    file: SnapshotFile,
    state: RwLock<StoreState>,
    write_gate: Mutex<()>,
}

impl JsonDatabase {
    pub fn new(config: StoreConfig) -> Self {
        Self::open(config.path())
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Self {
        Self {
            file: SnapshotFile::new(path),
            state: RwLock::new(StoreState {
                status: StoreStatus::Uninitialized,
                tables: Arc::new(Database::new()),
            }),
            write_gate: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn status(&self) -> StoreStatus {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .status
    }

    /// Loads the backing file, or creates it when absent.
    ///
    /// Never leaves the store unusable: an unreadable or malformed file is
    /// logged and replaced by an empty database. Calling it again reloads
    /// the document from disk.
    pub async fn initialize(&self) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        self.state.write()?.status = StoreStatus::Initializing;
        info!(path = %self.path().display(), "initializing JSON database");

        let (database, needs_persist) = match self.file.load().await {
            Ok(LoadOutcome::Loaded(database)) => {
                info!("database loaded from existing file");
                (database, false)
            }
            Ok(LoadOutcome::Empty) => {
                info!("database file is empty, starting with no tables");
                (Database::new(), false)
            }
            Ok(LoadOutcome::Missing) => {
                info!("database file not found, creating a new one");
                (Database::new(), true)
            }
            Err(DbError::MalformedData(reason)) => {
                warn!(%reason, "failed to parse database file, creating new");
                (Database::new(), true)
            }
            Err(err) => {
                error!(error = %err, "failed to load database file, starting empty");
                (Database::new(), true)
            }
        };

        if needs_persist && let Err(err) = self.file.save(&database).await {
            error!(error = %err, "failed to persist initial database file");
        }

        let table_count = database.len();
        {
            let mut state = self.state.write()?;
            state.tables = Arc::new(database);
            state.status = StoreStatus::Ready;
        }
        info!(tables = table_count, "database ready");
        Ok(())
    }

    /// Returns every record of `table` (empty when the table does not
    /// exist), optionally narrowed by a partial-match filter.
    pub fn select(&self, table: &str, filter: Option<&Record>) -> Result<Vec<Record>> {
        validate_table_name(table)?;
        let snapshot = self.snapshot()?;
        let Some(rows) = snapshot.get(table) else {
            return Ok(Vec::new());
        };

        Ok(match filter {
            Some(filter) => {
                let predicate = PartialMatch::new(filter);
                rows.iter().filter(|row| predicate.matches(row)).cloned().collect()
            }
            None => rows.clone(),
        })
    }

    /// Exact `id` lookup.
    pub fn find_by_id(&self, table: &str, id: &str) -> Result<Option<Record>> {
        validate_table_name(table)?;
        let snapshot = self.snapshot()?;
        Ok(snapshot
            .get(table)
            .and_then(|rows| rows.iter().find(|row| record_id(row) == Some(id)))
            .cloned())
    }

    pub fn count(&self, table: &str) -> Result<usize> {
        validate_table_name(table)?;
        Ok(self.snapshot()?.get(table).map_or(0, Vec::len))
    }

    pub fn info(&self) -> StoreInfo {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        StoreInfo::describe(
            self.path().to_path_buf(),
            &state.tables,
            state.status == StoreStatus::Ready,
        )
    }

    /// Appends `record` to `table`, creating the table on first use.
    pub async fn insert(&self, table: &str, record: Record) -> Result<Record> {
        validate_table_name(table)?;
        require_id(&record)?;

        self.write(move |db| {
            db.entry(table.to_string()).or_default().push(record.clone());
            Ok(Outcome::Persist(record))
        })
        .await
    }

    /// Merges `partial` over the record with `id`. The stored `id` always
    /// wins over one supplied in `partial`. Returns `false` (and writes
    /// nothing) when no such record exists.
    pub async fn update(&self, table: &str, id: &str, partial: Record) -> Result<bool> {
        validate_table_name(table)?;

        self.write(move |db| {
            let Some(row) = find_row_mut(db, table, id) else {
                return Ok(Outcome::Unchanged(false));
            };

            row.extend(partial);
            row.insert(ID_FIELD.to_string(), Value::String(id.to_string()));
            Ok(Outcome::Persist(true))
        })
        .await
    }

    /// Read-modify-write of one record under the write gate, so no other
    /// mutation can interleave between the read and the write.
    ///
    /// `apply` edits the record in place. The file is rewritten only when the
    /// record actually changed; an error from `apply` discards the edit.
    /// Returns `None` (and writes nothing) when no such record exists.
    pub async fn modify<T, E, F>(&self, table: &str, id: &str, apply: F) -> std::result::Result<Option<T>, E>
    where
        F: FnOnce(&mut Record) -> std::result::Result<T, E>,
        E: From<DbError>,
    {
        validate_table_name(table)?;

        self.write(move |db| {
            let Some(row) = find_row_mut(db, table, id) else {
                return Ok(Outcome::Unchanged(None));
            };

            let before = row.clone();
            let value = apply(row)?;
            row.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

            if *row == before {
                Ok(Outcome::Unchanged(Some(value)))
            } else {
                Ok(Outcome::Persist(Some(value)))
            }
        })
        .await
    }

    /// Removes the record with `id`. Returns `false` (and writes nothing)
    /// when no such record exists.
    pub async fn delete(&self, table: &str, id: &str) -> Result<bool> {
        validate_table_name(table)?;

        self.write(move |db| {
            let Some(rows) = db.get_mut(table) else {
                return Ok(Outcome::Unchanged(false));
            };
            let Some(index) = rows.iter().position(|row| record_id(row) == Some(id)) else {
                return Ok(Outcome::Unchanged(false));
            };

            rows.remove(index);
            Ok(Outcome::Persist(true))
        })
        .await
    }

    /// Empties `table`, creating it if it did not exist.
    pub async fn clear(&self, table: &str) -> Result<()> {
        validate_table_name(table)?;

        self.write(move |db| {
            db.insert(table.to_string(), Vec::new());
            Ok(Outcome::Persist(()))
        })
        .await
    }

    /// Removes `table` from the document entirely.
    pub async fn drop_table(&self, table: &str) -> Result<()> {
        validate_table_name(table)?;

        self.write(move |db| {
            db.remove(table);
            Ok(Outcome::Persist(()))
        })
        .await
    }

    /// Rewrites the backing file from the current in-memory state.
    pub async fn force_sync(&self) -> Result<()> {
        let _gate = self.write_gate.lock().await;
        let snapshot = self.snapshot()?;
        self.file.save(&snapshot).await
    }

    fn snapshot(&self) -> Result<Arc<Database>> {
        let state = self.state.read()?;
        if state.status != StoreStatus::Ready {
            return Err(DbError::Uninitialized);
        }
        Ok(Arc::clone(&state.tables))
    }

    async fn write<T, E, F>(&self, apply: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Database) -> std::result::Result<Outcome<T>, E>,
        E: From<DbError>,
    {
        let _gate = self.write_gate.lock().await;
        let mut next = Database::clone(&*self.snapshot()?);

        match apply(&mut next)? {
            Outcome::Unchanged(value) => Ok(value),
            Outcome::Persist(value) => {
                self.file.save(&next).await?;
                self.state.write().map_err(DbError::from)?.tables = Arc::new(next);
                Ok(value)
            }
        }
    }
}

fn find_row_mut<'a>(db: &'a mut Database, table: &str, id: &str) -> Option<&'a mut Record> {
    db.get_mut(table)
        .and_then(|rows| rows.iter_mut().find(|row| record_id(row) == Some(id)))
}
