use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database not initialized. Call initialize() first.")]
    Uninitialized,

    #[error("Invalid table name: {0}")]
    InvalidTableName(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Malformed persisted data: {0}")]
    MalformedData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, DbError>;

impl<T> From<std::sync::PoisonError<T>> for DbError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
