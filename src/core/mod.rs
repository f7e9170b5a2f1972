pub mod error;
pub mod types;

pub use error::{DbError, Result};
pub use types::{Database, ID_FIELD, Record, record_id, total_records};
