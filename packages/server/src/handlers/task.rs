use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::api::{EnqueueBody, ErrorBody, TaskStatusBody};
use common::jobs::PingJob;
use common::task::TaskKind;
use sea_orm::EntityTrait;
use tracing::instrument;

use crate::entity::task;
use crate::error::AppError;
use crate::extractors::json::AppJson;
use crate::models::task::{PingRequest, TaskCheckQuery, task_status_body};
use crate::queue::enqueue_task;
use crate::state::AppState;

/// Poll a task's state.
///
/// Unknown ids come back as 200 with state NOT_FOUND so pollers can treat
/// them as terminal without special-casing an HTTP error.
#[utoipa::path(
    get,
    path = "/api/tasks/check/",
    tag = "Tasks",
    operation_id = "checkTask",
    params(TaskCheckQuery),
    responses(
        (status = 200, description = "Task status", body = TaskStatusBody),
        (status = 400, description = "Missing task_id (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn check_task(
    State(state): State<AppState>,
    Query(query): Query<TaskCheckQuery>,
) -> Result<Json<TaskStatusBody>, AppError> {
    let Some(task_id) = query.task_id.filter(|id| !id.trim().is_empty()) else {
        return Err(AppError::Validation("task_id query parameter is required".into()));
    };

    let body = match task::Entity::find_by_id(&task_id).one(&state.db).await? {
        Some(model) => task_status_body(model),
        None => TaskStatusBody::not_found(task_id),
    };
    Ok(Json(body))
}

/// Enqueue a round-trip liveness probe through the general lane.
#[utoipa::path(
    post,
    path = "/api/tasks/ping/",
    tag = "Tasks",
    operation_id = "pingTask",
    request_body = PingRequest,
    responses(
        (status = 202, description = "Ping task enqueued", body = EnqueueBody),
        (status = 503, description = "Queue unavailable (QUEUE_UNAVAILABLE)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, payload))]
pub async fn ping_task(
    State(state): State<AppState>,
    payload: Option<AppJson<PingRequest>>,
) -> Result<impl IntoResponse, AppError> {
    let echo = payload
        .and_then(|AppJson(req)| req.echo)
        .unwrap_or_else(|| "pong".to_string());
    let job = PingJob { echo };

    let task_id = enqueue_task(&state, TaskKind::Ping, &job, None, None).await?;
    Ok((
        StatusCode::ACCEPTED,
        Json(EnqueueBody {
            task_id,
            message: "Ping enqueued".into(),
            theme_id: None,
            existing_topics_count: None,
        }),
    ))
}
