use chrono::{DateTime, Utc};
use common::api::{PostBody, PostStatusBody};
use common::status::{PostStatus, PostType, SIMPLE_POST_CHAR_LIMIT};
use serde::Deserialize;

use super::shared::{double_option, validate_optional_text, validate_text};
use crate::entity::post;
use crate::error::AppError;

pub const POST_TITLE_MAX: usize = 300;
pub const SEO_TITLE_MAX: usize = 60;
pub const SEO_DESCRIPTION_MAX: usize = 160;

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub promotional_post: Option<Option<String>>,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub link: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<DateTime<Utc>>)]
    pub scheduled_date: Option<Option<DateTime<Utc>>>,
    pub status: Option<PostStatus>,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct PostListQuery {
    /// Filter by owning theme id.
    pub theme: Option<i32>,
    pub status: Option<PostStatus>,
    pub post_type: Option<PostType>,
}

pub fn validate_update_post(req: &UpdatePostRequest, post_type: PostType) -> Result<(), AppError> {
    if let Some(ref title) = req.title {
        validate_text(title, "title", POST_TITLE_MAX)?;
    }
    if let Some(ref content) = req.content {
        if content.trim().is_empty() {
            return Err(AppError::Validation("content must not be empty".into()));
        }
        if post_type == PostType::Simple && content.chars().count() > SIMPLE_POST_CHAR_LIMIT {
            return Err(AppError::Validation(format!(
                "simple post content must be at most {SIMPLE_POST_CHAR_LIMIT} characters"
            )));
        }
    }
    validate_optional_text(req.seo_title.as_deref(), "seo_title", SEO_TITLE_MAX)?;
    validate_optional_text(
        req.seo_description.as_deref(),
        "seo_description",
        SEO_DESCRIPTION_MAX,
    )?;
    Ok(())
}

pub fn post_body(model: post::Model, theme_title: String) -> PostBody {
    PostBody {
        id: model.id,
        theme: model.theme_id,
        theme_title,
        content_preview: PostBody::preview_of(&model.content),
        is_processing: model.processing_status.is_processing(),
        post_type: model.post_type,
        title: model.title,
        content: model.content,
        promotional_post: model.promotional_post,
        cover_image_prompt: model.cover_image_prompt,
        topic: model.topic,
        seo_title: model.seo_title,
        seo_description: model.seo_description,
        link: model.link,
        post_date: model.post_date,
        scheduled_date: model.scheduled_date,
        status: model.status,
        processing_status: model.processing_status,
        generation_prompt: model.generation_prompt,
        ai_model_used: model.ai_model_used,
        ai_provider_used: model.ai_provider_used,
        created_at: model.created_at,
        updated_at: model.updated_at,
        generated_at: model.generated_at,
    }
}

pub fn post_status_body(model: &post::Model) -> PostStatusBody {
    PostStatusBody {
        post_id: model.id,
        processing_status: model.processing_status,
        is_processing: model.processing_status.is_processing(),
        status: model.status,
        title: model.title.clone(),
        content_length: model.content.chars().count(),
    }
}
