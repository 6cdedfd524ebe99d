use async_trait::async_trait;
use tracing::debug;

use crate::error::ProviderError;
use crate::service::AiService;
use crate::types::ChatRequest;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4";

/// OpenAI chat-completions backend.
pub struct OpenAiService {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiService {
    pub fn new(http: reqwest::Client, api_key: String, model: Option<String>) -> Self {
        Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: OPENAI_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl AiService for OpenAiService {
    fn provider_name(&self) -> &'static str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        chat_completions(&self.http, &self.base_url, &self.api_key, &self.model, request).await
    }
}

/// One round-trip against an OpenAI-compatible `/chat/completions` endpoint.
/// Grok speaks the same wire format at a different base URL.
pub(crate) async fn chat_completions(
    http: &reqwest::Client,
    base_url: &str,
    api_key: &str,
    model: &str,
    request: ChatRequest,
) -> Result<String, ProviderError> {
    let body = serde_json::json!({
        "model": model,
        "messages": request.messages,
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
    });

    let response = http
        .post(format!("{base_url}/chat/completions"))
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        return Err(ProviderError::Http {
            status: status.as_u16(),
            body: text,
        });
    }

    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| ProviderError::MalformedResponse(format!("response was not JSON: {e}")))?;
    let content = value
        .pointer("/choices/0/message/content")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            ProviderError::MalformedResponse("no choices[0].message.content in response".into())
        })?;

    debug!(model, chars = content.chars().count(), "chat completion received");
    if content.trim().is_empty() {
        return Err(ProviderError::EmptyCompletion);
    }
    Ok(content.to_string())
}
