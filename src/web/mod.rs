//! HTTP surface: router, shared state and request handlers.

pub mod handlers;
pub mod params;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, patch},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{repository::JsonTaskRepository, service::TaskService, storage::JsonDatabase};

pub use params::ListTasksQuery;

#[derive(Clone)]
pub struct AppState {
    pub service: TaskService,
    pub db: Arc<JsonDatabase>,
}

impl AppState {
    pub fn new(service: TaskService, db: Arc<JsonDatabase>) -> Self {
        Self { service, db }
    }

    /// Wires a `TaskService` over the `tasks` table of `db`.
    pub fn from_database(db: Arc<JsonDatabase>) -> Self {
        let repo = Arc::new(JsonTaskRepository::new(Arc::clone(&db)));
        Self::new(TaskService::new(repo), db)
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::healthcheck))
        .route("/database/info", get(handlers::database_info))
        .route(
            "/tasks",
            get(handlers::list_tasks).post(handlers::create_task),
        )
        .route(
            "/tasks/:id",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        .route("/tasks/:id/complete", patch(handlers::toggle_task))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
