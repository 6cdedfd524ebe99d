#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// The kinds of background work the runner knows how to execute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Produce 3-5 suggested topics for a theme.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "generate_topics"))]
    GenerateTopics,
    /// Produce a full post (simple or article) for a theme topic.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "generate_post"))]
    GeneratePost,
    /// Rewrite an existing post's content in place.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "improve_post"))]
    ImprovePost,
    /// Produce a fresh cover image prompt for an article.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "regenerate_image_prompt"))]
    RegenerateImagePrompt,
    /// Queue liveness probe; carries no entity.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "ping"))]
    Ping,
}

impl TaskKind {
    /// Static routing table from task kind to execution lane.
    ///
    /// Every AI-backed kind shares the AI lane so slow model calls cannot
    /// starve general work.
    pub fn lane(&self) -> Lane {
        match self {
            Self::GenerateTopics
            | Self::GeneratePost
            | Self::ImprovePost
            | Self::RegenerateImagePrompt => Lane::Ai,
            Self::Ping => Lane::General,
        }
    }

    pub const ALL: &'static [TaskKind] = &[
        Self::GenerateTopics,
        Self::GeneratePost,
        Self::ImprovePost,
        Self::RegenerateImagePrompt,
        Self::Ping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenerateTopics => "generate_topics",
            Self::GeneratePost => "generate_post",
            Self::ImprovePost => "improve_post",
            Self::RegenerateImagePrompt => "regenerate_image_prompt",
            Self::Ping => "ping",
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution lanes. Each lane is backed by its own queue and worker
/// concurrency so that task families are isolated from each other.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lane {
    General,
    Ai,
}

impl Lane {
    pub const ALL: &'static [Lane] = &[Lane::General, Lane::Ai];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Ai => "ai",
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle state of a background task.
///
/// `PENDING -> STARTED -> SUCCESS | FAILURE`, with `RETRY` between failed
/// attempts. `NOT_FOUND` is never persisted; status reads return it for
/// unknown task ids instead of erroring.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskState {
    /// Recorded and enqueued, not yet picked up.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "PENDING"))]
    Pending,
    /// A worker is executing an attempt.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "STARTED"))]
    Started,
    /// An attempt failed; the next one is scheduled.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "RETRY"))]
    Retry,
    /// Finished; the result and its entity mutation are visible.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "SUCCESS"))]
    Success,
    /// Finished after exhausting retries or a non-retryable error.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "FAILURE"))]
    Failure,
    /// Status read for an id the store has never seen.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "NOT_FOUND"))]
    NotFound,
}

impl TaskState {
    /// Terminal states stop pollers; nothing transitions out of them.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Failure | Self::NotFound)
    }

    /// States a task row can actually hold.
    pub const PERSISTED: &'static [TaskState] = &[
        Self::Pending,
        Self::Started,
        Self::Retry,
        Self::Success,
        Self::Failure,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Started => "STARTED",
            Self::Retry => "RETRY",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::NotFound => "NOT_FOUND",
        }
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for TaskState {
    fn default() -> Self {
        Self::Pending
    }
}

impl FromStr for TaskState {
    type Err = crate::status::ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(Self::Pending),
            "STARTED" => Ok(Self::Started),
            "RETRY" => Ok(Self::Retry),
            "SUCCESS" => Ok(Self::Success),
            "FAILURE" => Ok(Self::Failure),
            "NOT_FOUND" => Ok(Self::NotFound),
            _ => Err(Self::Err::new(
                "task state",
                s,
                "PENDING, STARTED, RETRY, SUCCESS, FAILURE, NOT_FOUND",
            )),
        }
    }
}

/// Machine-readable failure codes carried on task rows and status reads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskErrorCode {
    /// Transport, auth, rate-limit or malformed response from a provider.
    ProviderError,
    /// Provider answered but the content failed validation.
    ValidationError,
    /// Provider credential or selection missing at execution time.
    ConfigurationError,
    /// Task named a provider outside the known set.
    UnknownProvider,
    /// Soft or hard execution timeout.
    Timeout,
    /// Anything else (queue faults, malformed payloads).
    Internal,
}

impl TaskErrorCode {
    /// Retryable errors consume an attempt; the rest fail immediately.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderError | Self::ValidationError | Self::Timeout)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ProviderError => "PROVIDER_ERROR",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::UnknownProvider => "UNKNOWN_PROVIDER",
            Self::Timeout => "TIMEOUT",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for TaskErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task message sent to a lane queue.
///
/// The payload is a kind-specific snapshot (see [`crate::jobs`]) carrying
/// everything the worker needs, so execution never reads the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMessage {
    /// Task identifier (UUID), also the primary key of the task row.
    pub id: String,
    pub kind: TaskKind,
    pub payload: serde_json::Value,
}

impl TaskMessage {
    /// Create a message with a fresh task id.
    pub fn new(kind: TaskKind, payload: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            payload,
        }
    }
}
