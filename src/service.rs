use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{
    domain::{Task, UpdateTaskData, iso_millis},
    error::{AppError, AppResult},
    query::{PaginatedResult, TaskQuery},
    repository::TaskRepository,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl From<UpdateTaskRequest> for UpdateTaskData {
    fn from(request: UpdateTaskRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub completed: bool,
    #[serde(with = "iso_millis")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "iso_millis")]
    pub updated_at: DateTime<Utc>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            created_at: task.created_at,
            updated_at: task.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateTaskResponse {
    pub status: String,
    pub message: String,
}

impl UpdateTaskResponse {
    fn success() -> Self {
        Self {
            status: "success".to_string(),
            message: "Task updated successfully".to_string(),
        }
    }
}

/// Task use cases on top of any [`TaskRepository`].
#[derive(Clone)]
pub struct TaskService {
    repo: Arc<dyn TaskRepository>,
    /// Held across the duplicate-title check and the insert.
    create_gate: Arc<Mutex<()>>,
}

impl TaskService {
    pub fn new(repo: Arc<dyn TaskRepository>) -> Self {
        Self {
            repo,
            create_gate: Arc::new(Mutex::new(())),
        }
    }

    pub async fn create_task(&self, request: CreateTaskRequest) -> AppResult<TaskResponse> {
        let task = Task::create(
            request.title.as_deref().unwrap_or_default(),
            request.description.as_deref().unwrap_or_default(),
        )?;

        let _guard = self.create_gate.lock().await;
        let wanted = task.title.to_lowercase();
        let duplicate = self
            .repo
            .search_by_term(&task.title)
            .await?
            .into_iter()
            .any(|existing| existing.title.trim().to_lowercase() == wanted);
        if duplicate {
            return Err(AppError::conflict(format!(
                "Task with title \"{}\" already exists",
                task.title
            )));
        }

        let saved = self.repo.save(&task).await?;
        info!(id = %saved.id, "task created");
        Ok(saved.into())
    }

    pub async fn list_tasks(&self, query: &TaskQuery) -> AppResult<PaginatedResult<TaskResponse>> {
        let page = self.repo.find_with_pagination(query).await?;
        debug!(total = page.total, page = page.page, "tasks listed");
        Ok(page.map(TaskResponse::from))
    }

    pub async fn get_task(&self, id: &str) -> AppResult<TaskResponse> {
        Ok(self.repo.get_by_id(id).await?.into())
    }

    pub async fn update_task(&self, id: &str, request: UpdateTaskRequest) -> AppResult<UpdateTaskResponse> {
        let data = UpdateTaskData::from(request);
        let task = self
            .repo
            .modify(
                id,
                Box::new(move |task: &mut Task| task.update(data).map(|_| ())),
            )
            .await?;
        info!(id = %task.id, "task updated");

        Ok(UpdateTaskResponse::success())
    }

    pub async fn delete_task(&self, id: &str) -> AppResult<()> {
        if !self.repo.delete(id).await? {
            return Err(AppError::not_found(format!("Task with ID {id} not found")));
        }
        info!(id = %id, "task deleted");
        Ok(())
    }

    pub async fn toggle_task(&self, id: &str) -> AppResult<TaskResponse> {
        let task = self
            .repo
            .modify(
                id,
                Box::new(|task: &mut Task| {
                    task.toggle_complete();
                    Ok(())
                }),
            )
            .await?;
        info!(id = %task.id, completed = task.completed, "task toggled");
        Ok(task.into())
    }
}
