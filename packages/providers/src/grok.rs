use async_trait::async_trait;

use crate::error::ProviderError;
use crate::openai::chat_completions;
use crate::service::AiService;
use crate::types::ChatRequest;

pub const GROK_BASE_URL: &str = "https://api.x.ai/v1";
pub const DEFAULT_GROK_MODEL: &str = "grok-4-latest";

/// Grok (x.ai) backend. The API is OpenAI-compatible, so only the base URL
/// and default model differ.
pub struct GrokService {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GrokService {
    pub fn new(http: reqwest::Client, api_key: String, model: Option<String>) -> Self {
        Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_GROK_MODEL.to_string()),
            base_url: GROK_BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl AiService for GrokService {
    fn provider_name(&self) -> &'static str {
        "grok"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        chat_completions(&self.http, &self.base_url, &self.api_key, &self.model, request).await
    }
}
