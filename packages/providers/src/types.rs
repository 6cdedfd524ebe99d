use serde::{Deserialize, Serialize};

/// Default sampling temperature for all content operations.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Default completion budget for all content operations.
pub const DEFAULT_MAX_TOKENS: u32 = 4000;
/// Per-request HTTP timeout.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One chat-completion message in the OpenAI wire shape. Provider clients
/// translate as needed (Gemini folds system messages into
/// `systemInstruction`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// A completion request as the content operations build them.
#[derive(Clone, Debug)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// A single user message with the default sampling settings.
    pub fn user(prompt: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::user(prompt)],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// A system + user pair with the default sampling settings.
    pub fn with_system(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            messages: vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Minimal round-trip used by connection tests.
    pub fn probe() -> Self {
        Self {
            messages: vec![ChatMessage::user("Reply with the single word: OK")],
            temperature: 0.0,
            max_tokens: 10,
        }
    }
}

/// Output of a post generation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    pub content: String,
    /// Article-only teaser post; None for simple posts.
    pub promotional_post: Option<String>,
    /// Article-only cover image prompt; None for simple posts.
    pub cover_image_prompt: Option<String>,
    pub seo_title: String,
    pub seo_description: String,
}

/// Output of a post improvement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImprovedContent {
    pub content: String,
    pub improvement_summary: String,
}

/// Output of a cover image prompt regeneration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoverImagePrompt {
    pub cover_image_prompt: String,
    pub style_notes: String,
    pub visual_elements: String,
}
