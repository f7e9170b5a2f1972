use crate::core::{Database, DbError, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Any non-empty string is a table name.
pub fn validate_table_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(DbError::InvalidTableName(
            "Table name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Snapshot of store metadata returned by `JsonDatabase::info`.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreInfo {
    pub path: PathBuf,
    pub tables: Vec<String>,
    pub total_records: usize,
    pub initialized: bool,
}

impl StoreInfo {
    pub(crate) fn describe(path: PathBuf, database: &Database, initialized: bool) -> Self {
        Self {
            path,
            tables: database.keys().cloned().collect(),
            total_records: crate::core::total_records(database),
            initialized,
        }
    }
}
