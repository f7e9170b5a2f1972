use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::{
    core::Record,
    domain::{Task, TaskError},
    error::{AppError, AppResult},
    query::{PaginatedResult, QueryEngine, TaskQuery, TaskSearchCriteria, filter_by_criteria},
    storage::JsonDatabase,
};

pub const TASKS_TABLE: &str = "tasks";

/// An edit applied to the stored task while the store's write gate is held.
pub type TaskChange = Box<dyn FnOnce(&mut Task) -> Result<(), TaskError> + Send>;

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn save(&self, task: &Task) -> AppResult<Task>;
    /// Writes the mutable fields of `task` over the stored copy.
    async fn update(&self, task: &Task) -> AppResult<()>;
    /// Reads, edits and writes back one task as a single store mutation.
    /// Only the fields the edit changed are written.
    async fn modify(&self, id: &str, change: TaskChange) -> AppResult<Task>;
    async fn find_by_id(&self, id: &str) -> AppResult<Option<Task>>;
    async fn get_by_id(&self, id: &str) -> AppResult<Task>;
    async fn delete(&self, id: &str) -> AppResult<bool>;
    async fn find_all(&self) -> AppResult<Vec<Task>>;
    async fn find_by_criteria(&self, criteria: &TaskSearchCriteria) -> AppResult<Vec<Task>>;
    async fn find_with_pagination(&self, query: &TaskQuery) -> AppResult<PaginatedResult<Task>>;
    async fn find_completed(&self) -> AppResult<Vec<Task>>;
    async fn find_incomplete(&self) -> AppResult<Vec<Task>>;
    async fn search_by_term(&self, term: &str) -> AppResult<Vec<Task>>;
    async fn count(&self) -> AppResult<usize>;
    async fn exists(&self, id: &str) -> AppResult<bool>;
    async fn clear(&self) -> AppResult<()>;
}

/// Tasks live in the `tasks` table of a shared [`JsonDatabase`].
#[derive(Clone)]
pub struct JsonTaskRepository {
    db: Arc<JsonDatabase>,
}

impl JsonTaskRepository {
    pub fn new(db: Arc<JsonDatabase>) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Arc<JsonDatabase> {
        &self.db
    }

    /// Every stored task in table order. Rows that no longer deserialize are
    /// skipped with a warning instead of failing the whole listing.
    fn load_all(&self) -> AppResult<Vec<Task>> {
        let rows = self.db.select(TASKS_TABLE, None)?;
        Ok(rows.into_iter().filter_map(to_task_lenient).collect())
    }
}

fn to_task_lenient(record: Record) -> Option<Task> {
    let id = record
        .get("id")
        .and_then(|v| v.as_str())
        .unwrap_or("<missing>")
        .to_string();

    match Task::try_from(record) {
        Ok(task) => Some(task),
        Err(err) => {
            warn!(id = %id, error = %err, "skipping malformed task record");
            None
        }
    }
}

#[async_trait]
impl TaskRepository for JsonTaskRepository {
    async fn save(&self, task: &Task) -> AppResult<Task> {
        let stored = self.db.insert(TASKS_TABLE, Record::from(task)).await?;
        Ok(Task::try_from(stored)?)
    }

    async fn update(&self, task: &Task) -> AppResult<()> {
        let updated = self
            .db
            .update(TASKS_TABLE, &task.id, task.mutable_fields())
            .await?;
        if !updated {
            return Err(AppError::not_found(format!("Task with ID {} not found", task.id)));
        }
        Ok(())
    }

    async fn modify(&self, id: &str, change: TaskChange) -> AppResult<Task> {
        self.db
            .modify(TASKS_TABLE, id, move |record| -> AppResult<Task> {
                let before = Task::try_from(record.clone())?;
                let mut task = before.clone();
                change(&mut task)?;
                record.extend(task.changes_since(&before));
                Ok(task)
            })
            .await?
            .ok_or_else(|| AppError::not_found(format!("Task with ID {id} not found")))
    }

    async fn find_by_id(&self, id: &str) -> AppResult<Option<Task>> {
        match self.db.find_by_id(TASKS_TABLE, id)? {
            Some(record) => Ok(Some(Task::try_from(record)?)),
            None => Ok(None),
        }
    }

    async fn get_by_id(&self, id: &str) -> AppResult<Task> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Task with ID {id} not found")))
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        Ok(self.db.delete(TASKS_TABLE, id).await?)
    }

    async fn find_all(&self) -> AppResult<Vec<Task>> {
        self.load_all()
    }

    async fn find_by_criteria(&self, criteria: &TaskSearchCriteria) -> AppResult<Vec<Task>> {
        Ok(filter_by_criteria(self.load_all()?, criteria))
    }

    async fn find_with_pagination(&self, query: &TaskQuery) -> AppResult<PaginatedResult<Task>> {
        Ok(QueryEngine.execute(self.load_all()?, query))
    }

    async fn find_completed(&self) -> AppResult<Vec<Task>> {
        self.find_by_criteria(&TaskSearchCriteria::new().with_completed(true))
            .await
    }

    async fn find_incomplete(&self) -> AppResult<Vec<Task>> {
        self.find_by_criteria(&TaskSearchCriteria::new().with_completed(false))
            .await
    }

    async fn search_by_term(&self, term: &str) -> AppResult<Vec<Task>> {
        let term = term.trim();
        let tasks = self.load_all()?;
        if term.is_empty() {
            return Ok(tasks);
        }
        Ok(tasks.into_iter().filter(|task| task.matches(term)).collect())
    }

    async fn count(&self) -> AppResult<usize> {
        Ok(self.db.count(TASKS_TABLE)?)
    }

    async fn exists(&self, id: &str) -> AppResult<bool> {
        Ok(self.db.find_by_id(TASKS_TABLE, id)?.is_some())
    }

    async fn clear(&self) -> AppResult<()> {
        Ok(self.db.clear(TASKS_TABLE).await?)
    }
}
