use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use datalab_core::{Task, TaskFilter, TaskId, TaskKind};
use validator::Validate;

use crate::{dto::*, error::ApiResult, AppState};

pub async fn submit(
    State(state): State<AppState>,
    Json(payload): Json<SubmitTaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    payload.validate()?;

    let kind: TaskKind = payload.kind.parse()?;
    // Reject bad parameters before the task takes a slot.
    let work = state.factory.build(kind, &payload.params)?;
    let task_id = state.registry.submit(kind, payload.params).await?;

    if payload.start {
        state.runner.start(task_id, work).await?;
    }

    let task = state.registry.get(task_id).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<ListResponse<Task>>> {
    query.validate()?;

    let filter: TaskFilter = query.into();
    let tasks = state.registry.list(&filter).await;
    Ok(Json(ListResponse::new(tasks)))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task_id: TaskId = id.parse()?;
    let task = state.registry.get(task_id).await?;
    Ok(Json(task))
}

pub async fn start(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task_id: TaskId = id.parse()?;
    let task = state.registry.get(task_id).await?;

    let work = state.factory.build(task.kind, &task.params)?;
    state.runner.start(task_id, work).await?;

    let task = state.registry.get(task_id).await?;
    Ok((StatusCode::ACCEPTED, Json(task)))
}

pub async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Task>> {
    let task_id: TaskId = id.parse()?;
    state.registry.cancel(task_id).await?;

    let task = state.registry.get(task_id).await?;
    Ok(Json(task))
}
