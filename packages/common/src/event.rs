use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::jobs::PingJob;
use crate::status::PostType;
use crate::task::{TaskErrorCode, TaskKind};
use crate::topic::Topic;

/// Structured error carried by retry and failure events.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TaskErrorInfo {
    pub code: TaskErrorCode,
    pub message: String,
}

impl TaskErrorInfo {
    pub fn new(code: TaskErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Kind-specific result of a successful task, persisted as the task row's
/// `result` and applied to the owning entity by the event consumer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutcomeData {
    /// Replacement topic list for the theme.
    Topics { topics: Vec<Topic> },
    /// A fully generated post to materialize under the theme.
    Post {
        post_type: PostType,
        topic: String,
        title: String,
        content: String,
        promotional_post: Option<String>,
        cover_image_prompt: Option<String>,
        seo_title: String,
        seo_description: String,
    },
    /// Replacement content for an existing post.
    Improved {
        content: String,
        improvement_summary: String,
    },
    /// Replacement cover image prompt for an existing post.
    ImagePrompt {
        cover_image_prompt: String,
        style_notes: String,
    },
    /// Echo from a ping probe.
    Pong { echo: String },
}

/// Task lifecycle events published by the worker and applied by the
/// server-side consumer. Only `completed`/`failed` are terminal; the
/// consumer applies those together with the entity mutation in one
/// transaction.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaskEvent {
    Started {
        task_id: String,
        kind: TaskKind,
        attempt: u8,
        worker_id: String,
        at: DateTime<Utc>,
    },
    Retrying {
        task_id: String,
        kind: TaskKind,
        /// The attempt that just failed.
        attempt: u8,
        error: TaskErrorInfo,
        next_delay_secs: u64,
        at: DateTime<Utc>,
    },
    Completed {
        task_id: String,
        kind: TaskKind,
        attempts: u8,
        theme_id: Option<i32>,
        post_id: Option<i32>,
        provider: Option<String>,
        model: Option<String>,
        data: OutcomeData,
        at: DateTime<Utc>,
    },
    Failed {
        task_id: String,
        kind: TaskKind,
        attempts: u8,
        theme_id: Option<i32>,
        post_id: Option<i32>,
        error: TaskErrorInfo,
        at: DateTime<Utc>,
    },
}

impl TaskEvent {
    pub fn task_id(&self) -> &str {
        match self {
            Self::Started { task_id, .. }
            | Self::Retrying { task_id, .. }
            | Self::Completed { task_id, .. }
            | Self::Failed { task_id, .. } => task_id,
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Self::Started { kind, .. }
            | Self::Retrying { kind, .. }
            | Self::Completed { kind, .. }
            | Self::Failed { kind, .. } => *kind,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Failed { .. })
    }
}

impl OutcomeData {
    /// Wire helper for ping results.
    pub fn pong(job: &PingJob) -> Self {
        Self::Pong {
            echo: job.echo.clone(),
        }
    }
}
