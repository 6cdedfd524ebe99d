use std::time::Duration;

use serde::Deserialize;

use crate::retry::RetryPolicy;
use crate::task::Lane;

/// App-level MQ configuration shared by server and worker.
#[derive(Debug, Deserialize, Clone)]
pub struct MqAppConfig {
    /// Whether MQ is enabled. Default: true.
    /// Note: Worker ignores this field (always requires MQ).
    #[serde(default = "default_mq_enabled")]
    pub enabled: bool,
    /// Redis connection URL. Default: "redis://localhost:6379".
    #[serde(default = "default_mq_url")]
    pub url: String,
    /// Connection pool size. Default: 5.
    #[serde(default = "default_mq_pool_size")]
    pub pool_size: u8,
    /// Queue for AI-lane tasks (server publishes, worker consumes). Default: "ai_tasks".
    #[serde(default = "default_ai_queue_name")]
    pub ai_queue_name: String,
    /// Queue for general-lane tasks. Default: "general_tasks".
    #[serde(default = "default_general_queue_name")]
    pub general_queue_name: String,
    /// Queue for task lifecycle events (worker publishes, server consumes). Default: "task_events".
    #[serde(default = "default_event_queue_name")]
    pub event_queue_name: String,
}

fn default_mq_enabled() -> bool {
    true
}
fn default_mq_url() -> String {
    "redis://localhost:6379".into()
}
fn default_mq_pool_size() -> u8 {
    5
}
fn default_ai_queue_name() -> String {
    "ai_tasks".into()
}
fn default_general_queue_name() -> String {
    "general_tasks".into()
}
fn default_event_queue_name() -> String {
    "task_events".into()
}

impl MqAppConfig {
    /// Queue name backing the given lane.
    pub fn queue_for(&self, lane: Lane) -> &str {
        match lane {
            Lane::Ai => &self.ai_queue_name,
            Lane::General => &self.general_queue_name,
        }
    }
}

impl Default for MqAppConfig {
    fn default() -> Self {
        Self {
            enabled: default_mq_enabled(),
            url: default_mq_url(),
            pool_size: default_mq_pool_size(),
            ai_queue_name: default_ai_queue_name(),
            general_queue_name: default_general_queue_name(),
            event_queue_name: default_event_queue_name(),
        }
    }
}

/// Credentials and model selection for a single AI provider.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ProviderSettings {
    /// API key. Unset means the provider is not configured.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Model override; each provider has its own default.
    #[serde(default)]
    pub model: Option<String>,
}

impl ProviderSettings {
    /// True when a non-empty credential is present.
    pub fn is_configured(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
    }
}

/// AI provider configuration block.
#[derive(Debug, Deserialize, Clone)]
pub struct AiConfig {
    /// Provider used when a request does not name one. Default: "openai".
    #[serde(default = "default_ai_provider")]
    pub default_provider: String,
    #[serde(default)]
    pub openai: ProviderSettings,
    #[serde(default)]
    pub grok: ProviderSettings,
    #[serde(default)]
    pub gemini: ProviderSettings,
}

fn default_ai_provider() -> String {
    "openai".into()
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            default_provider: default_ai_provider(),
            openai: ProviderSettings::default(),
            grok: ProviderSettings::default(),
            gemini: ProviderSettings::default(),
        }
    }
}

/// Execution policy for background tasks.
#[derive(Debug, Deserialize, Clone)]
pub struct TaskPolicyConfig {
    /// Attempts per task, including the first. Default: 3.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u8,
    /// Base retry delay in seconds; attempt n waits base * (n - 1). Default: 60.
    #[serde(default = "default_retry_base_secs")]
    pub retry_base_secs: u64,
    /// Per-attempt soft timeout in seconds. Default: 300.
    #[serde(default = "default_soft_timeout_secs")]
    pub soft_timeout_secs: u64,
    /// Per-attempt hard timeout in seconds; exceeding it fails the task
    /// outright. Default: 600.
    #[serde(default = "default_hard_timeout_secs")]
    pub hard_timeout_secs: u64,
    /// Age after which processing entities / non-terminal tasks are swept
    /// to failed. Default: 1800 (30 minutes).
    #[serde(default = "default_stuck_after_secs")]
    pub stuck_after_secs: u64,
    /// Sweep interval in seconds. Default: 60.
    #[serde(default = "default_stuck_scan_interval_secs")]
    pub stuck_scan_interval_secs: u64,
}

fn default_max_attempts() -> u8 {
    3
}
fn default_retry_base_secs() -> u64 {
    60
}
fn default_soft_timeout_secs() -> u64 {
    300
}
fn default_hard_timeout_secs() -> u64 {
    600
}
fn default_stuck_after_secs() -> u64 {
    1800
}
fn default_stuck_scan_interval_secs() -> u64 {
    60
}

impl TaskPolicyConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_secs(self.retry_base_secs))
    }

    pub fn soft_timeout(&self) -> Duration {
        Duration::from_secs(self.soft_timeout_secs)
    }

    pub fn hard_timeout(&self) -> Duration {
        Duration::from_secs(self.hard_timeout_secs)
    }

    pub fn stuck_after(&self) -> Duration {
        Duration::from_secs(self.stuck_after_secs)
    }

    pub fn stuck_scan_interval(&self) -> Duration {
        Duration::from_secs(self.stuck_scan_interval_secs)
    }
}

impl Default for TaskPolicyConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_base_secs: default_retry_base_secs(),
            soft_timeout_secs: default_soft_timeout_secs(),
            hard_timeout_secs: default_hard_timeout_secs(),
            stuck_after_secs: default_stuck_after_secs(),
            stuck_scan_interval_secs: default_stuck_scan_interval_secs(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_for_lane() {
        let mq = MqAppConfig::default();
        assert_eq!(mq.queue_for(Lane::Ai), "ai_tasks");
        assert_eq!(mq.queue_for(Lane::General), "general_tasks");
    }

    #[test]
    fn test_provider_configured_requires_non_empty_key() {
        let mut settings = ProviderSettings::default();
        assert!(!settings.is_configured());
        settings.api_key = Some("  ".into());
        assert!(!settings.is_configured());
        settings.api_key = Some("sk-123".into());
        assert!(settings.is_configured());
    }

    #[test]
    fn test_task_policy_defaults_match_the_runner_contract() {
        let policy = TaskPolicyConfig::default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.retry_policy().total_backoff(), Duration::from_secs(180));
        assert_eq!(policy.soft_timeout(), Duration::from_secs(300));
        assert_eq!(policy.hard_timeout(), Duration::from_secs(600));
    }
}
