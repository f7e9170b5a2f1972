//! Whole-document persistence for the JSON record store.
//!
//! Every save serializes the complete [`Database`] and replaces the backing
//! file through a temp file + rename, so a crash mid-write leaves either the
//! previous document or the new one on disk, never a torn mix.
//!
//! The cost is O(total records) per save.

use crate::core::{Database, DbError, Result};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Outcome of reading the backing file.
#[derive(Debug)]
pub enum LoadOutcome {
    /// File does not exist yet.
    Missing,
    /// File exists but holds only whitespace.
    Empty,
    Loaded(Database),
}

pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the backing file.
    ///
    /// Parse failures (including a valid JSON document of the wrong shape)
    /// surface as [`DbError::MalformedData`] so the caller can decide whether
    /// to recover; every other failure is [`DbError::IoError`].
    pub async fn load(&self) -> Result<LoadOutcome> {
        let data = match fs::read_to_string(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(LoadOutcome::Missing),
            Err(e) => {
                return Err(DbError::IoError(format!(
                    "Failed to read database file '{}': {}",
                    self.path.display(),
                    e
                )));
            }
        };

        if data.trim().is_empty() {
            return Ok(LoadOutcome::Empty);
        }

        let database: Database = serde_json::from_str(&data).map_err(|e| {
            DbError::MalformedData(format!(
                "Failed to parse database file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        Ok(LoadOutcome::Loaded(database))
    }

    /// Serializes the whole database with two-space indentation and
    /// atomically replaces the backing file.
    pub async fn save(&self, database: &Database) -> Result<()> {
        let serialized = serde_json::to_string_pretty(database)?;
        atomic_write(&self.path, serialized.as_bytes()).await?;
        debug!(
            path = %self.path.display(),
            tables = database.len(),
            bytes = serialized.len(),
            "database persisted"
        );
        Ok(())
    }
}

async fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).await.map_err(|e| {
            DbError::IoError(format!(
                "Failed to create parent directory '{}': {}",
                parent.display(),
                e
            ))
        })?;
    }

    let tmp = temp_path(path);
    let mut file = fs::File::create(&tmp).await.map_err(|e| {
        DbError::IoError(format!(
            "Failed to create temp file '{}': {}",
            tmp.display(),
            e
        ))
    })?;
    file.write_all(bytes).await.map_err(|e| {
        DbError::IoError(format!(
            "Failed to write temp file '{}': {}",
            tmp.display(),
            e
        ))
    })?;
    file.sync_all().await.map_err(|e| {
        DbError::IoError(format!("Failed to sync temp file '{}': {}", tmp.display(), e))
    })?;
    drop(file);

    fs::rename(&tmp, path).await.map_err(|e| {
        DbError::IoError(format!(
            "Failed to rename temp file '{}' -> '{}': {}",
            tmp.display(),
            path.display(),
            e
        ))
    })?;
    Ok(())
}

/// `db.json` -> `db.json.tmp`, kept next to the target so the rename stays
/// on one filesystem.
fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
