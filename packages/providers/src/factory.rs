use std::str::FromStr;
use std::time::Duration;

use common::config::{AiConfig, ProviderSettings};
use tracing::info;

use crate::error::FactoryError;
use crate::gemini::{DEFAULT_GEMINI_MODEL, GeminiService};
use crate::grok::{DEFAULT_GROK_MODEL, GrokService};
use crate::openai::{DEFAULT_OPENAI_MODEL, OpenAiService};
use crate::service::AiService;
use crate::types::REQUEST_TIMEOUT_SECS;

/// The closed set of supported providers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Grok,
    Gemini,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [Self::OpenAi, Self::Grok, Self::Gemini];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Grok => "grok",
            Self::Gemini => "gemini",
        }
    }

    fn default_model(&self) -> &'static str {
        match self {
            Self::OpenAi => DEFAULT_OPENAI_MODEL,
            Self::Grok => DEFAULT_GROK_MODEL,
            Self::Gemini => DEFAULT_GEMINI_MODEL,
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = FactoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "grok" => Ok(Self::Grok),
            "gemini" => Ok(Self::Gemini),
            _ => Err(FactoryError::UnknownProvider { name: s.to_string() }),
        }
    }
}

/// Configuration snapshot of one provider, for the admin listing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderStatus {
    pub name: &'static str,
    pub configured: bool,
    pub model: String,
    pub is_default: bool,
}

/// Outcome of a provider connection test.
#[derive(Clone, Debug)]
pub struct ConnectionTest {
    pub provider: String,
    pub success: bool,
    pub message: String,
}

/// Builds [`AiService`] instances from the `ai.*` configuration block.
///
/// One shared HTTP client backs every service the factory hands out.
pub struct ProviderFactory {
    config: AiConfig,
    http: reqwest::Client,
}

impl ProviderFactory {
    pub fn new(config: AiConfig) -> Result<Self, FactoryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| FactoryError::Init(e.to_string()))?;
        Ok(Self { config, http })
    }

    fn settings(&self, kind: ProviderKind) -> &ProviderSettings {
        match kind {
            ProviderKind::OpenAi => &self.config.openai,
            ProviderKind::Grok => &self.config.grok,
            ProviderKind::Gemini => &self.config.gemini,
        }
    }

    fn model_for(&self, kind: ProviderKind) -> String {
        self.settings(kind)
            .model
            .clone()
            .unwrap_or_else(|| kind.default_model().to_string())
    }

    /// Build a service for the given provider, failing when no credential
    /// is configured.
    pub fn create(&self, kind: ProviderKind) -> Result<Box<dyn AiService>, FactoryError> {
        let settings = self.settings(kind);
        if !settings.is_configured() {
            return Err(FactoryError::NotConfigured { provider: kind.as_str() });
        }
        let api_key = settings.api_key.clone().unwrap_or_default();
        let model = settings.model.clone();

        info!(provider = kind.as_str(), model = self.model_for(kind), "provider selected");
        Ok(match kind {
            ProviderKind::OpenAi => Box::new(OpenAiService::new(self.http.clone(), api_key, model)),
            ProviderKind::Grok => Box::new(GrokService::new(self.http.clone(), api_key, model)),
            ProviderKind::Gemini => Box::new(GeminiService::new(self.http.clone(), api_key, model)),
        })
    }

    /// Build a service from a user-supplied provider name.
    pub fn create_named(&self, name: &str) -> Result<Box<dyn AiService>, FactoryError> {
        self.create(name.parse()?)
    }

    /// Build the configured default provider.
    pub fn default_service(&self) -> Result<Box<dyn AiService>, FactoryError> {
        self.create_named(&self.config.default_provider)
    }

    pub fn default_provider_name(&self) -> &str {
        &self.config.default_provider
    }

    /// Model the default provider would use, for dashboard display. Falls
    /// back to the OpenAI default when the configured name is unknown.
    pub fn default_model_name(&self) -> String {
        self.config
            .default_provider
            .parse()
            .map(|kind| self.model_for(kind))
            .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string())
    }

    /// One row per supported provider.
    pub fn statuses(&self) -> Vec<ProviderStatus> {
        ProviderKind::ALL
            .into_iter()
            .map(|kind| ProviderStatus {
                name: kind.as_str(),
                configured: self.settings(kind).is_configured(),
                model: self.model_for(kind),
                is_default: self.config.default_provider == kind.as_str(),
            })
            .collect()
    }

    /// Round-trip a tiny completion through the named provider.
    ///
    /// Construction failures (unknown name, missing credential) are errors;
    /// a reachable provider that rejects the probe is reported as an
    /// unsuccessful test instead.
    pub async fn test_connection(&self, name: &str) -> Result<ConnectionTest, FactoryError> {
        let service = self.create_named(name)?;
        let provider = service.provider_name().to_string();
        match service.test_connection().await {
            Ok(()) => Ok(ConnectionTest {
                message: format!("Connection to {provider} ({}) succeeded", service.model()),
                provider,
                success: true,
            }),
            Err(e) => Ok(ConnectionTest {
                provider,
                success: false,
                message: e.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_openai_key() -> AiConfig {
        let mut config = AiConfig::default();
        config.openai.api_key = Some("sk-test".into());
        config
    }

    #[test]
    fn test_provider_names_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.as_str().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_name_is_rejected() {
        let err = "claude".parse::<ProviderKind>().unwrap_err();
        assert!(matches!(err, FactoryError::UnknownProvider { .. }));
    }

    #[test]
    fn test_create_requires_a_credential() {
        let factory = ProviderFactory::new(AiConfig::default()).unwrap();
        let err = factory.create(ProviderKind::OpenAi).unwrap_err();
        assert!(matches!(err, FactoryError::NotConfigured { provider: "openai" }));
    }

    #[test]
    fn test_create_named_builds_a_configured_provider() {
        let factory = ProviderFactory::new(config_with_openai_key()).unwrap();
        let service = factory.create_named("openai").unwrap();
        assert_eq!(service.provider_name(), "openai");
        assert_eq!(service.model(), "gpt-4");
    }

    #[test]
    fn test_default_service_follows_the_config() {
        let mut config = config_with_openai_key();
        config.default_provider = "gemini".into();
        config.gemini.api_key = Some("g-test".into());
        config.gemini.model = Some("gemini-2.5-pro".into());

        let factory = ProviderFactory::new(config).unwrap();
        let service = factory.default_service().unwrap();
        assert_eq!(service.provider_name(), "gemini");
        assert_eq!(service.model(), "gemini-2.5-pro");
        assert_eq!(factory.default_model_name(), "gemini-2.5-pro");
    }

    #[test]
    fn test_statuses_cover_all_providers() {
        let factory = ProviderFactory::new(config_with_openai_key()).unwrap();
        let statuses = factory.statuses();
        assert_eq!(statuses.len(), 3);

        let openai = statuses.iter().find(|s| s.name == "openai").unwrap();
        assert!(openai.configured);
        assert!(openai.is_default);

        let grok = statuses.iter().find(|s| s.name == "grok").unwrap();
        assert!(!grok.configured);
        assert!(!grok.is_default);
        assert_eq!(grok.model, "grok-4-latest");
    }

    #[tokio::test]
    async fn test_connection_test_propagates_construction_failures() {
        let factory = ProviderFactory::new(AiConfig::default()).unwrap();
        let err = factory.test_connection("grok").await.unwrap_err();
        assert!(matches!(err, FactoryError::NotConfigured { provider: "grok" }));

        let err = factory.test_connection("claude").await.unwrap_err();
        assert!(matches!(err, FactoryError::UnknownProvider { .. }));
    }
}
