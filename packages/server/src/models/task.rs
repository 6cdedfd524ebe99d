use common::api::{TaskProgressInfo, TaskStatusBody};
use common::event::TaskErrorInfo;
use common::task::{TaskErrorCode, TaskState};
use serde::Deserialize;

use crate::entity::task;

#[derive(Deserialize, utoipa::IntoParams)]
pub struct TaskCheckQuery {
    /// Task UUID returned by an enqueueing endpoint.
    pub task_id: Option<String>,
}

/// Body of `POST /tasks/ping/`.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct PingRequest {
    /// Echoed back in the task result. Defaults to "pong".
    #[serde(default)]
    pub echo: Option<String>,
}

fn parse_error_code(code: &str) -> TaskErrorCode {
    serde_json::from_value(serde_json::Value::String(code.to_string()))
        .unwrap_or(TaskErrorCode::Internal)
}

fn error_info(model: &task::Model) -> Option<TaskErrorInfo> {
    model.error_code.as_deref().map(|code| {
        TaskErrorInfo::new(
            parse_error_code(code),
            model.error_message.clone().unwrap_or_default(),
        )
    })
}

/// Project a task row into the status-read wire shape.
pub fn task_status_body(model: task::Model) -> TaskStatusBody {
    let error = error_info(&model);
    match model.state {
        TaskState::Success => TaskStatusBody {
            task_id: model.id,
            state: TaskState::Success,
            result: model.result,
            error: None,
            info: None,
        },
        TaskState::Failure => TaskStatusBody {
            task_id: model.id,
            state: TaskState::Failure,
            result: None,
            error,
            info: None,
        },
        state => TaskStatusBody {
            task_id: model.id,
            state,
            result: None,
            error: None,
            info: Some(TaskProgressInfo {
                attempts: model.attempts,
                last_error: error,
            }),
        },
    }
}
