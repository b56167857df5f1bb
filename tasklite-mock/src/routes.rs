use axum::{
    Json,
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::state::{MockState, StoredTask};

/// Request body for create and replace. Unset optionals take server defaults;
/// an `id` in the body is ignored.
#[derive(Deserialize)]
pub struct TaskInput {
    title: String,
    #[serde(default)]
    priority: i32,
    #[serde(default)]
    complete: bool,
}

/// Counts requests and applies injected delays and failures.
pub async fn intercept(State(state): State<MockState>, request: Request, next: Next) -> Response {
    state.record_request();

    if let Some(delay) = state.delay().await {
        tokio::time::sleep(delay).await;
    }
    if let Some(failure) = state.take_failure().await {
        debug!(status = failure.status.as_u16(), "Returning injected failure");
        return (failure.status, failure.body).into_response();
    }

    next.run(request).await
}

pub async fn create_task(
    State(state): State<MockState>,
    Json(input): Json<TaskInput>,
) -> (StatusCode, Json<StoredTask>) {
    let task = state
        .insert(input.title, input.priority, input.complete)
        .await;
    debug!(id = task.id, "Created task");
    (StatusCode::CREATED, Json(task))
}

pub async fn get_task(
    State(state): State<MockState>,
    Path(id): Path<i32>,
) -> Result<Json<StoredTask>, StatusCode> {
    state.task(id).await.map(Json).ok_or(StatusCode::NOT_FOUND)
}

pub async fn update_task(
    State(state): State<MockState>,
    Path(id): Path<i32>,
    Json(input): Json<TaskInput>,
) -> Result<Json<StoredTask>, StatusCode> {
    state
        .replace(id, input.title, input.priority, input.complete)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

pub async fn delete_task(State(state): State<MockState>, Path(id): Path<i32>) -> StatusCode {
    match state.remove(id).await {
        Some(_) => StatusCode::NO_CONTENT,
        None => StatusCode::NOT_FOUND,
    }
}
