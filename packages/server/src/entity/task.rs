use common::task::{TaskKind, TaskState};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Server-side record of a background task.
///
/// The row is the source of truth for status reads; lifecycle events from
/// the worker only ever move it forward (terminal states never change).
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task")]
pub struct Model {
    /// Task UUID, generated at enqueue time.
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub kind: TaskKind,
    pub state: TaskState,

    /// Kind-specific job payload, kept for sweeping and debugging.
    #[sea_orm(column_type = "JsonBinary")]
    pub payload: serde_json::Value,

    /// Attempts consumed so far.
    pub attempts: i32,
    pub max_attempts: i32,

    /// Last error while in RETRY, final error on FAILURE.
    pub error_code: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub error_message: Option<String>,

    /// Outcome data recorded on SUCCESS.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub result: Option<serde_json::Value>,

    /// Owning entity, when the task targets one.
    pub theme_id: Option<i32>,
    pub post_id: Option<i32>,

    pub queued_at: DateTimeUtc,
    pub started_at: Option<DateTimeUtc>,
    pub finished_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
