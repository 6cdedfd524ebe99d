use async_trait::async_trait;
use chrono::Utc;
use common::status::PostType;
use common::topic::{MAX_TOPICS, MIN_TOPICS, SuggestedTopics, Topic};
use tracing::{debug, instrument};

use crate::error::{AiError, ProviderError};
use crate::json::parse_json_object;
use crate::limits::{enforce_improved_cap, enforce_simple_cap};
use crate::prompts;
use crate::types::{ChatRequest, CoverImagePrompt, GeneratedContent, ImprovedContent};

/// A chat-completion backend plus the four content operations built on it.
///
/// Implementors supply the transport (`complete`); the operations are
/// provided and identical across providers, so every backend prompts,
/// parses and validates the same way.
#[async_trait]
pub trait AiService: Send + Sync {
    /// Provider name as listed by the admin API, e.g. "openai".
    fn provider_name(&self) -> &'static str;

    /// Model id sent with every request.
    fn model(&self) -> &str;

    /// Run one chat completion and return the raw text.
    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError>;

    /// Cheap round-trip proving the credential and model are usable.
    async fn test_connection(&self) -> Result<(), ProviderError> {
        let reply = self.complete(ChatRequest::probe()).await?;
        debug!(provider = self.provider_name(), reply, "connection probe succeeded");
        Ok(())
    }

    /// Generate 3-5 topics for a theme. `existing` topics are handed to the
    /// model so regeneration complements instead of repeating them.
    #[instrument(skip_all, fields(provider = self.provider_name(), theme = theme_title))]
    async fn generate_topics(
        &self,
        theme_title: &str,
        existing: &[Topic],
    ) -> Result<SuggestedTopics, AiError> {
        let prompt = prompts::topics_prompt(theme_title, existing);
        let raw = self.complete(ChatRequest::user(prompt)).await?;
        let value = parse_json_object(&raw)?;

        let topics: Vec<Topic> = serde_json::from_value(value["topics"].clone())
            .map_err(|e| AiError::Validation(format!("bad topics array: {e}")))?;
        if topics.len() < MIN_TOPICS || topics.len() > MAX_TOPICS {
            return Err(AiError::Validation(format!(
                "expected {MIN_TOPICS}-{MAX_TOPICS} topics, got {}",
                topics.len()
            )));
        }
        for (i, topic) in topics.iter().enumerate() {
            if topic.title.trim().is_empty() {
                return Err(AiError::Validation(format!("topic {i} has an empty title")));
            }
        }

        Ok(SuggestedTopics {
            topics,
            generated_at: Utc::now(),
        })
    }

    /// Generate a full post for a topic. Simple posts come back capped at
    /// the platform character limit; articles additionally carry a
    /// promotional post and a cover image prompt.
    #[instrument(skip_all, fields(provider = self.provider_name(), topic, %post_type))]
    async fn generate_post_content(
        &self,
        topic: &str,
        post_type: PostType,
        theme_title: &str,
        topic_data: Option<&Topic>,
    ) -> Result<GeneratedContent, AiError> {
        let request = ChatRequest::with_system(
            prompts::post_system(post_type),
            prompts::post_prompt(topic, post_type, theme_title, topic_data),
        );
        let raw = self.complete(request).await?;
        let value = parse_json_object(&raw)?;

        let title = required_str(&value, "title")?;
        let mut content = required_str(&value, "content")?;
        let mut promotional_post = optional_str(&value, "promotional_post");
        let mut cover_image_prompt = optional_str(&value, "cover_image_prompt");

        match post_type {
            PostType::Simple => {
                content = enforce_simple_cap(&content);
                // Models sometimes emit article-only fields anyway.
                promotional_post = None;
                cover_image_prompt = None;
            }
            PostType::Article => {
                if let Some(promo) = promotional_post.take() {
                    promotional_post = Some(enforce_simple_cap(&promo));
                }
            }
        }

        Ok(GeneratedContent {
            seo_title: optional_str(&value, "seo_title").unwrap_or_else(|| truncated(topic, 60)),
            seo_description: optional_str(&value, "seo_description")
                .unwrap_or_else(|| truncated(&format!("Learn more about {topic}"), 160)),
            title,
            content,
            promotional_post,
            cover_image_prompt,
        })
    }

    /// Improve an existing post. For simple posts the result stays within
    /// the platform cap and never shrinks below the original length.
    #[instrument(skip_all, fields(provider = self.provider_name(), post_title, %post_type))]
    async fn improve_post_content(
        &self,
        current_content: &str,
        post_title: &str,
        post_type: PostType,
        topic: &str,
    ) -> Result<ImprovedContent, AiError> {
        let request = ChatRequest::with_system(
            prompts::IMPROVE_SYSTEM,
            prompts::improve_prompt(current_content, post_title, post_type, topic),
        );
        let raw = self.complete(request).await?;
        let value = parse_json_object(&raw)?;

        let mut content = required_str(&value, "improved_content")?;
        if post_type == PostType::Simple {
            content = enforce_improved_cap(&content, current_content.chars().count())?;
        }

        Ok(ImprovedContent {
            content,
            improvement_summary: optional_str(&value, "improvement_summary").unwrap_or_default(),
        })
    }

    /// Regenerate the cover image prompt of an article.
    #[instrument(skip_all, fields(provider = self.provider_name(), post_title))]
    async fn regenerate_cover_image_prompt(
        &self,
        post_title: &str,
        topic: &str,
        theme_title: &str,
        current_prompt: Option<&str>,
    ) -> Result<CoverImagePrompt, AiError> {
        let request = ChatRequest::with_system(
            prompts::IMAGE_PROMPT_SYSTEM,
            prompts::image_prompt_prompt(post_title, topic, theme_title, current_prompt),
        );
        let raw = self.complete(request).await?;
        let value = parse_json_object(&raw)?;

        Ok(CoverImagePrompt {
            cover_image_prompt: required_str(&value, "cover_image_prompt")?,
            style_notes: optional_str(&value, "style_notes").unwrap_or_default(),
            visual_elements: optional_str(&value, "visual_elements").unwrap_or_default(),
        })
    }
}

impl std::fmt::Debug for dyn AiService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AiService")
            .field("provider", &self.provider_name())
            .field("model", &self.model())
            .finish()
    }
}

fn required_str(value: &serde_json::Value, key: &str) -> Result<String, AiError> {
    match value[key].as_str() {
        Some(s) if !s.trim().is_empty() => Ok(s.to_string()),
        _ => Err(AiError::Validation(format!("missing or empty field '{key}'"))),
    }
}

fn optional_str(value: &serde_json::Value, key: &str) -> Option<String> {
    value[key]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn truncated(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}
