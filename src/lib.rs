// ============================================================================
// task-control library
// ============================================================================
//
// A task-management HTTP API on top of a single-file JSON record store.
//
//   web -> service -> repository -> storage (JsonDatabase)
//                                -> query (filter -> sort -> paginate)
//
// ============================================================================

pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod query;
pub mod repository;
pub mod server;
pub mod service;
pub mod storage;
pub mod telemetry;
pub mod web;

pub use self::core::{Database, DbError, Record, Result};
pub use domain::{Task, TaskError};
pub use error::{AppError, AppResult};
pub use query::{PaginatedResult, QueryEngine, TaskQuery, TaskSearchCriteria};
pub use repository::{JsonTaskRepository, TaskChange, TaskRepository};
pub use service::TaskService;
pub use storage::{JsonDatabase, StoreConfig, StoreInfo, StoreStatus};
pub use web::{AppState, build_router};
