use common::api::{ThemeBody, ThemeStatusBody};
use common::status::PostType;
use common::topic::Topic;
use serde::Deserialize;

use super::shared::validate_text;
use crate::entity::theme;
use crate::error::AppError;

pub const THEME_TITLE_MAX: usize = 200;
pub const TOPIC_LABEL_MAX: usize = 200;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateThemeRequest {
    pub title: String,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateThemeRequest {
    pub title: Option<String>,
    pub is_active: Option<bool>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ThemeListQuery {
    /// Filter by the soft-delete flag.
    pub active: Option<bool>,
}

/// Body of `POST /themes/{id}/generate_post/`.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct GeneratePostRequest {
    /// Topic label the post should cover.
    pub topic: String,
    #[serde(default)]
    pub post_type: PostType,
    /// Structured topic from the suggested list, when the request came
    /// from one; enriches the generation prompt.
    #[serde(default)]
    pub topic_data: Option<Topic>,
}

pub fn validate_create_theme(req: &CreateThemeRequest) -> Result<(), AppError> {
    validate_text(&req.title, "title", THEME_TITLE_MAX)
}

pub fn validate_update_theme(req: &UpdateThemeRequest) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_text(title, "title", THEME_TITLE_MAX)?;
    }
    Ok(())
}

pub fn validate_generate_post(req: &GeneratePostRequest) -> Result<(), AppError> {
    validate_text(&req.topic, "topic", TOPIC_LABEL_MAX)
}

/// Per-theme post counters shown on the wire.
#[derive(Debug, Default, Clone, Copy)]
pub struct PostCounts {
    pub total: i64,
    pub articles: i64,
    pub simple: i64,
}

pub fn theme_body(model: theme::Model, counts: PostCounts) -> ThemeBody {
    ThemeBody {
        id: model.id,
        is_processing: model.processing_status.is_processing(),
        processing_status: model.processing_status,
        suggested_topics: model.suggested(),
        topics_generated_at: model.topics_generated_at,
        posts_count: counts.total,
        articles_count: counts.articles,
        simple_posts_count: counts.simple,
        title: model.title,
        is_active: model.is_active,
        created_at: model.created_at,
        updated_at: model.updated_at,
    }
}

pub fn theme_status_body(model: &theme::Model) -> ThemeStatusBody {
    let topics_count = model.topics_count();
    ThemeStatusBody {
        theme_id: model.id,
        processing_status: model.processing_status,
        is_processing: model.processing_status.is_processing(),
        has_topics: topics_count > 0,
        topics_count,
    }
}

/// Topics currently stored on a theme, for dedup context in payloads.
pub fn stored_topics(model: &theme::Model) -> Vec<Topic> {
    model.suggested().map(|s| s.topics).unwrap_or_default()
}
