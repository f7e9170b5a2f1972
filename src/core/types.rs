use super::{DbError, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field every stored record is keyed by.
pub const ID_FIELD: &str = "id";

/// One schema-less JSON object stored in a table.
pub type Record = Map<String, Value>;

/// Table name -> ordered records. This is exactly the on-disk document shape.
pub type Database = BTreeMap<String, Vec<Record>>;

/// Returns the record's `id` when it is present and a string.
pub fn record_id(record: &Record) -> Option<&str> {
    record.get(ID_FIELD).and_then(Value::as_str)
}

pub fn total_records(database: &Database) -> usize {
    database.values().map(Vec::len).sum()
}

pub(crate) fn require_id(record: &Record) -> Result<&str> {
    match record.get(ID_FIELD) {
        Some(Value::String(id)) => Ok(id),
        Some(other) => Err(DbError::InvalidRecord(format!(
            "field '{ID_FIELD}' must be a string, got {other}"
        ))),
        None => Err(DbError::InvalidRecord(format!(
            "record is missing the '{ID_FIELD}' field"
        ))),
    }
}
