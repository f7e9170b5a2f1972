use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State, rejection::JsonRejection},
    http::StatusCode,
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::{
    core::Record,
    error::AppResult,
    query::PaginatedResult,
    service::{CreateTaskRequest, TaskResponse, UpdateTaskRequest, UpdateTaskResponse},
    storage::StoreInfo,
};

use super::{AppState, params::ListTasksQuery};

const SERVICE_NAME: &str = "task-control-api";
const SAMPLE_SIZE: usize = 2;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct TableDetail {
    pub count: usize,
    pub sample: Vec<Record>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseInfoResponse {
    #[serde(flatten)]
    pub info: StoreInfo,
    pub tables_detail: BTreeMap<String, TableDetail>,
    pub timestamp: String,
}

fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        service: SERVICE_NAME,
        timestamp: now_iso(),
    })
}

pub async fn database_info(State(state): State<AppState>) -> AppResult<Json<DatabaseInfoResponse>> {
    let info = state.db.info();

    let mut tables_detail = BTreeMap::new();
    for table in &info.tables {
        let records = state.db.select(table, None)?;
        tables_detail.insert(
            table.clone(),
            TableDetail {
                count: records.len(),
                sample: records.into_iter().take(SAMPLE_SIZE).collect(),
            },
        );
    }

    Ok(Json(DatabaseInfoResponse {
        info,
        tables_detail,
        timestamp: now_iso(),
    }))
}

pub async fn create_task(
    State(state): State<AppState>,
    payload: Result<Json<CreateTaskRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<TaskResponse>)> {
    let Json(payload) = payload?;
    let task = state.service.create_task(payload).await?;

    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> AppResult<Json<PaginatedResult<TaskResponse>>> {
    let page = state.service.list_tasks(&query.into_task_query()).await?;
    Ok(Json(page))
}

pub async fn get_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TaskResponse>> {
    Ok(Json(state.service.get_task(&id).await?))
}

pub async fn update_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateTaskRequest>, JsonRejection>,
) -> AppResult<Json<UpdateTaskResponse>> {
    let Json(payload) = payload?;
    Ok(Json(state.service.update_task(&id, payload).await?))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    state.service.delete_task(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_task(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<TaskResponse>> {
    Ok(Json(state.service.toggle_task(&id).await?))
}
