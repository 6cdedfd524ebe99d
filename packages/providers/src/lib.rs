pub mod error;
pub mod factory;
pub mod gemini;
pub mod grok;
pub mod json;
pub mod limits;
pub mod openai;
pub mod prompts;
pub mod service;
pub mod types;

pub use error::{AiError, FactoryError, ProviderError};
pub use factory::{ConnectionTest, ProviderFactory, ProviderKind, ProviderStatus};
pub use service::AiService;
pub use types::{ChatMessage, ChatRequest, CoverImagePrompt, GeneratedContent, ImprovedContent};
