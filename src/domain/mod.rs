//! Task entity and its validation rules.

pub mod task;

pub use task::{Task, TaskError, UpdateTaskData, iso_millis};
