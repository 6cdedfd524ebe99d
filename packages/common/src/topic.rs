use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::status::PostType;

/// Bounds on how many topics a successful generation may store.
pub const MIN_TOPICS: usize = 3;
pub const MAX_TOPICS: usize = 5;

/// A suggested post topic attached to a theme.
///
/// Immutable value object: regeneration replaces the whole list, individual
/// topics are never edited in place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Topic {
    /// Short topic label, used as the post's `topic` field when generating.
    pub title: String,
    /// Opening line designed to stop the scroll.
    pub hook: String,
    /// Recommended format for a post on this topic.
    pub post_type: PostType,
    /// One or two sentences describing the angle.
    pub summary: String,
    /// Suggested call to action.
    pub cta: String,
}

/// JSONB payload stored in `theme.suggested_topics`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SuggestedTopics {
    pub topics: Vec<Topic>,
    /// When this list was produced (matches `theme.topics_generated_at`).
    pub generated_at: DateTime<Utc>,
}

impl SuggestedTopics {
    pub fn new(topics: Vec<Topic>, generated_at: DateTime<Utc>) -> Self {
        Self {
            topics,
            generated_at,
        }
    }

    pub fn titles(&self) -> Vec<&str> {
        self.topics.iter().map(|t| t.title.as_str()).collect()
    }
}
