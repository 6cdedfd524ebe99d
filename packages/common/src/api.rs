use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::TaskErrorInfo;
use crate::status::{PostStatus, PostType, ProcessingStatus};
use crate::task::TaskState;
use crate::topic::SuggestedTopics;

/// Structured error body returned by every non-2xx API response.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code, e.g. "VALIDATION" or "NOT_FOUND".
    pub code: String,
    /// Human-readable message.
    pub message: String,
}

/// A theme as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ThemeBody {
    pub id: i32,
    pub title: String,
    pub is_active: bool,
    pub processing_status: ProcessingStatus,
    /// Derived from `processing_status`; kept for frontend convenience.
    pub is_processing: bool,
    pub suggested_topics: Option<SuggestedTopics>,
    pub topics_generated_at: Option<DateTime<Utc>>,
    pub posts_count: i64,
    pub articles_count: i64,
    pub simple_posts_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PostBody {
    pub id: i32,
    /// Owning theme id.
    pub theme: i32,
    pub theme_title: String,
    pub post_type: PostType,
    pub title: String,
    pub content: String,
    pub promotional_post: Option<String>,
    pub cover_image_prompt: Option<String>,
    pub topic: String,
    pub seo_title: String,
    pub seo_description: String,
    pub link: Option<String>,
    pub post_date: DateTime<Utc>,
    pub scheduled_date: Option<DateTime<Utc>>,
    pub status: PostStatus,
    pub processing_status: ProcessingStatus,
    pub is_processing: bool,
    pub generation_prompt: Option<String>,
    pub ai_model_used: Option<String>,
    pub ai_provider_used: Option<String>,
    /// First 150 characters of the content.
    pub content_preview: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub generated_at: Option<DateTime<Utc>>,
}

impl PostBody {
    /// Truncated preview shown in list views.
    pub fn preview_of(content: &str) -> String {
        const PREVIEW_CHARS: usize = 150;
        if content.chars().count() <= PREVIEW_CHARS {
            content.to_string()
        } else {
            let cut: String = content.chars().take(PREVIEW_CHARS).collect();
            format!("{cut}...")
        }
    }
}

/// Accepted response for every enqueueing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EnqueueBody {
    pub task_id: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme_id: Option<i32>,
    /// Topics already stored when a regeneration was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_topics_count: Option<usize>,
}

/// Returned instead of enqueueing when the requested post already exists.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ExistingPostBody {
    pub warning: String,
    pub post_id: i32,
}

/// Non-terminal progress attached to a task status read.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TaskProgressInfo {
    /// Attempts consumed so far.
    pub attempts: i32,
    /// Error from the most recent failed attempt, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<TaskErrorInfo>,
}

/// Response of the task status endpoint.
///
/// `result` is present only on SUCCESS, `error` only on FAILURE and `info`
/// only while the task is still running. Unknown ids come back with state
/// NOT_FOUND rather than an HTTP error.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct TaskStatusBody {
    pub task_id: String,
    pub state: TaskState,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskErrorInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<TaskProgressInfo>,
}

impl TaskStatusBody {
    pub fn not_found(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            state: TaskState::NotFound,
            result: None,
            error: None,
            info: None,
        }
    }
}

/// Processing snapshot of a theme.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ThemeStatusBody {
    pub theme_id: i32,
    pub processing_status: ProcessingStatus,
    pub is_processing: bool,
    pub has_topics: bool,
    pub topics_count: usize,
}

/// Processing snapshot of a post.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PostStatusBody {
    pub post_id: i32,
    pub processing_status: ProcessingStatus,
    pub is_processing: bool,
    pub status: PostStatus,
    pub title: String,
    pub content_length: usize,
}

/// One provider row of the admin listing.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProviderStatusBody {
    pub name: String,
    /// True when a credential is present.
    pub configured: bool,
    pub model: String,
    #[serde(rename = "default")]
    pub is_default: bool,
}

/// Result of a provider connection test.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProviderTestBody {
    pub provider: String,
    pub success: bool,
    pub message: String,
}

/// Dashboard aggregates.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct DashboardStatsBody {
    pub total_themes: i64,
    pub total_posts: i64,
    pub published_posts: i64,
    pub draft_posts: i64,
    pub generated_posts: i64,
    /// Currently configured default provider and its model.
    pub ai_provider: String,
    pub ai_model: String,
    pub recent_posts: Vec<PostBody>,
    pub recent_themes: Vec<ThemeBody>,
}

/// Liveness body.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthBody {
    pub status: String,
}
