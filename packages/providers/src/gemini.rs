use async_trait::async_trait;
use tracing::debug;

use crate::error::ProviderError;
use crate::service::AiService;
use crate::types::{ChatRequest, Role};

pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Google Gemini backend.
///
/// Gemini has no system role in `contents`; system messages are folded into
/// `systemInstruction` instead, and assistant turns become role "model".
pub struct GeminiService {
    http: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiService {
    pub fn new(http: reqwest::Client, api_key: String, model: Option<String>) -> Self {
        Self {
            http,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Split a chat request into (systemInstruction, contents) in the Gemini
/// wire shape.
fn to_gemini_body(request: &ChatRequest) -> serde_json::Value {
    let mut system_parts = Vec::new();
    let mut contents = Vec::new();
    for message in &request.messages {
        match message.role {
            Role::System => system_parts.push(serde_json::json!({ "text": message.content })),
            Role::User => contents.push(serde_json::json!({
                "role": "user",
                "parts": [{ "text": message.content }],
            })),
            Role::Assistant => contents.push(serde_json::json!({
                "role": "model",
                "parts": [{ "text": message.content }],
            })),
        }
    }

    let mut body = serde_json::json!({
        "contents": contents,
        "generationConfig": {
            "temperature": request.temperature,
            "maxOutputTokens": request.max_tokens,
        },
    });
    if !system_parts.is_empty() {
        body["systemInstruction"] = serde_json::json!({ "parts": system_parts });
    }
    body
}

#[async_trait]
impl AiService for GeminiService {
    fn provider_name(&self) -> &'static str {
        "gemini"
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: ChatRequest) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .http
            .post(url)
            .query(&[("key", self.api_key.as_str())])
            .json(&to_gemini_body(&request))
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
            .pointer("/candidates/0/content/parts/0/text")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                ProviderError::MalformedResponse(
                    "no candidates[0].content.parts[0].text in response".into(),
                )
            })?;

        debug!(model = self.model, chars = content.chars().count(), "completion received");
        if content.trim().is_empty() {
            return Err(ProviderError::EmptyCompletion);
        }
        Ok(content.to_string())
    }
}
