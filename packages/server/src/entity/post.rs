use common::status::{PostStatus, PostType, ProcessingStatus};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "post")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub theme_id: i32,
    #[sea_orm(belongs_to, from = "theme_id", to = "id")]
    pub theme: HasOne<super::theme::Entity>,

    pub post_type: PostType,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    /// Article-only teaser for the feed; NULL for simple posts.
    #[sea_orm(column_type = "Text", nullable)]
    pub promotional_post: Option<String>,
    /// Article-only AI image generation prompt.
    #[sea_orm(column_type = "Text", nullable)]
    pub cover_image_prompt: Option<String>,

    /// Topic label the post was generated for.
    pub topic: String,
    pub seo_title: String,
    pub seo_description: String,
    pub link: Option<String>,

    pub post_date: DateTimeUtc,
    pub scheduled_date: Option<DateTimeUtc>,

    pub status: PostStatus,
    pub processing_status: ProcessingStatus,

    /// Prompt snapshot recorded by generation tasks.
    #[sea_orm(column_type = "Text", nullable)]
    pub generation_prompt: Option<String>,
    pub ai_model_used: Option<String>,
    pub ai_provider_used: Option<String>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
    pub generated_at: Option<DateTimeUtc>,
}

impl ActiveModelBehavior for ActiveModel {}
