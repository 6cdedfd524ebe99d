use serde::{Deserialize, Serialize};

use crate::status::PostType;
use crate::topic::Topic;

/// Payload for [`crate::task::TaskKind::GenerateTopics`].
///
/// Job payloads snapshot everything the worker needs at enqueue time so the
/// worker runs without a database connection.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TopicsJob {
    pub theme_id: i32,
    pub theme_title: String,
    /// Topics already stored on the theme; passed to the provider as
    /// dedup context. The result replaces the stored list either way.
    #[serde(default)]
    pub existing_topics: Vec<Topic>,
}

/// Payload for [`crate::task::TaskKind::GeneratePost`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PostJob {
    pub theme_id: i32,
    pub theme_title: String,
    /// Topic label the post is about.
    pub topic: String,
    pub post_type: PostType,
    /// Full topic object when the request came from a suggested topic;
    /// its hook/summary/cta enrich the prompt.
    #[serde(default)]
    pub topic_data: Option<Topic>,
}

/// Payload for [`crate::task::TaskKind::ImprovePost`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImproveJob {
    pub post_id: i32,
    pub title: String,
    pub post_type: PostType,
    pub topic: String,
    /// Content at enqueue time; the improved version replaces it.
    pub content: String,
}

/// Payload for [`crate::task::TaskKind::RegenerateImagePrompt`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ImagePromptJob {
    pub post_id: i32,
    pub title: String,
    pub topic: String,
    pub theme_title: String,
    /// Existing prompt, quoted so the provider produces a different concept.
    #[serde(default)]
    pub current_prompt: Option<String>,
}

/// Payload for [`crate::task::TaskKind::Ping`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PingJob {
    /// Echoed back in the task result.
    pub echo: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topics_job_defaults_existing_to_empty() {
        let job: TopicsJob =
            serde_json::from_value(serde_json::json!({"theme_id": 1, "theme_title": "Rust"}))
                .unwrap();
        assert!(job.existing_topics.is_empty());
    }

    #[test]
    fn test_post_job_roundtrip() {
        let job = PostJob {
            theme_id: 7,
            theme_title: "Rust".into(),
            topic: "Ownership".into(),
            post_type: PostType::Article,
            topic_data: None,
        };
        let value = serde_json::to_value(&job).unwrap();
        let back: PostJob = serde_json::from_value(value).unwrap();
        assert_eq!(back.theme_id, 7);
        assert_eq!(back.post_type, PostType::Article);
        assert!(back.topic_data.is_none());
    }
}
