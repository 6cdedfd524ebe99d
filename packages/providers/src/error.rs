use common::task::TaskErrorCode;
use thiserror::Error;

/// Transport-level failure talking to a provider. Always retryable.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("provider returned an empty completion")]
    EmptyCompletion,

    #[error("provider response had an unexpected shape: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        // reqwest error strings carry no credentials, safe to surface.
        ProviderError::Transport(e.to_string())
    }
}

/// Failure of a content operation.
#[derive(Debug, Error)]
pub enum AiError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The provider answered, but the content failed validation
    /// (bad JSON, wrong topic count, missing fields, shrunk content).
    #[error("validation failed: {0}")]
    Validation(String),
}

impl AiError {
    pub fn code(&self) -> TaskErrorCode {
        match self {
            Self::Provider(_) => TaskErrorCode::ProviderError,
            Self::Validation(_) => TaskErrorCode::ValidationError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.code().is_retryable()
    }
}

/// Failure to construct a provider client.
#[derive(Debug, Error)]
pub enum FactoryError {
    #[error("Unknown provider '{name}'. Available: openai, grok, gemini")]
    UnknownProvider { name: String },

    #[error("Provider '{provider}' is not configured: set ai.{provider}.api_key")]
    NotConfigured { provider: &'static str },

    #[error("HTTP client init failed: {0}")]
    Init(String),
}

impl FactoryError {
    pub fn code(&self) -> TaskErrorCode {
        match self {
            Self::UnknownProvider { .. } => TaskErrorCode::UnknownProvider,
            Self::NotConfigured { .. } => TaskErrorCode::ConfigurationError,
            Self::Init(_) => TaskErrorCode::Internal,
        }
    }
}
