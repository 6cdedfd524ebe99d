use common::status::ProcessingStatus;
use common::topic::SuggestedTopics;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "theme")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    /// Soft-delete flag; cleared by DELETE, filterable on list via `?active=`.
    pub is_active: bool,
    pub processing_status: ProcessingStatus,

    /// Latest generated topic list as a `SuggestedTopics` JSON document.
    /// Regeneration replaces the whole document.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub suggested_topics: Option<serde_json::Value>,
    pub topics_generated_at: Option<DateTimeUtc>,

    #[sea_orm(has_many)]
    pub posts: HasMany<super::post::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Stored topic list, or None when never generated or unparseable.
    pub fn suggested(&self) -> Option<SuggestedTopics> {
        self.suggested_topics
            .as_ref()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    pub fn topics_count(&self) -> usize {
        self.suggested().map(|s| s.topics.len()).unwrap_or(0)
    }
}

impl ActiveModelBehavior for ActiveModel {}
