pub mod catalog;
pub mod database;
pub mod filter;
pub mod persistence;

pub use catalog::{StoreInfo, validate_table_name};
pub use database::{DEFAULT_FILENAME, JsonDatabase, StoreConfig, StoreStatus};
pub use filter::PartialMatch;
pub use persistence::{LoadOutcome, SnapshotFile};
