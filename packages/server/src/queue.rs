use chrono::Utc;
use common::task::{TaskKind, TaskMessage, TaskState};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::entity::task;
use crate::error::AppError;
use crate::state::AppState;

/// Record a task row and publish its message to the kind's lane queue.
///
/// The row is inserted first so a status poll started right after the 202
/// always finds PENDING. If the publish fails the row is removed again and
/// the caller sees 503; no orphan is left behind.
#[instrument(skip(state, payload), fields(%kind))]
pub async fn enqueue_task<P: Serialize>(
    state: &AppState,
    kind: TaskKind,
    payload: &P,
    theme_id: Option<i32>,
    post_id: Option<i32>,
) -> Result<String, AppError> {
    let Some(ref mq) = state.mq else {
        return Err(AppError::QueueUnavailable("MQ is disabled".into()));
    };

    let payload = serde_json::to_value(payload)
        .map_err(|e| AppError::Internal(format!("failed to serialize task payload: {e}")))?;
    let message = TaskMessage::new(kind, payload.clone());

    let row = task::ActiveModel {
        id: Set(message.id.clone()),
        kind: Set(kind),
        state: Set(TaskState::Pending),
        payload: Set(payload),
        attempts: Set(0),
        max_attempts: Set(i32::from(state.config.tasks.max_attempts)),
        error_code: Set(None),
        error_message: Set(None),
        result: Set(None),
        theme_id: Set(theme_id),
        post_id: Set(post_id),
        queued_at: Set(Utc::now()),
        started_at: Set(None),
        finished_at: Set(None),
    };
    row.insert(&state.db).await?;

    let queue = state.config.mq.queue_for(kind.lane());
    if let Err(e) = mq.publish(queue, None, &message, None).await {
        warn!(task_id = %message.id, error = %e, "Publish failed, removing task row");
        task::Entity::delete_by_id(&message.id).exec(&state.db).await?;
        return Err(AppError::QueueUnavailable(e.to_string()));
    }

    info!(task_id = %message.id, queue, "Task enqueued");
    Ok(message.id)
}
