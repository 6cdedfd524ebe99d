use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

pub use common::config::{AiConfig, MqAppConfig, TaskPolicyConfig};

/// Worker-specific configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    /// Unique identifier for this worker instance. Default: "worker-1".
    #[serde(default = "default_worker_id")]
    pub id: String,
    /// Concurrent AI-lane tasks. Default: 2.
    #[serde(default = "default_ai_concurrency")]
    pub ai_concurrency: usize,
    /// Concurrent general-lane tasks. Default: 4.
    #[serde(default = "default_general_concurrency")]
    pub general_concurrency: usize,
}

fn default_worker_id() -> String {
    "worker-1".into()
}
fn default_ai_concurrency() -> usize {
    2
}
fn default_general_concurrency() -> usize {
    4
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            id: default_worker_id(),
            ai_concurrency: default_ai_concurrency(),
            general_concurrency: default_general_concurrency(),
        }
    }
}

/// Worker application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkerAppConfig {
    #[serde(default)]
    pub worker: WorkerConfig,
    #[serde(default)]
    pub mq: MqAppConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub tasks: TaskPolicyConfig,
}

impl WorkerAppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("worker.id", "worker-1")?
            .set_default("worker.ai_concurrency", 2_i64)?
            .set_default("worker.general_concurrency", 4_i64)?
            // Load from config/worker.toml
            .add_source(File::with_name("config/worker").required(false))
            // Override from environment (e.g., POSTPILOT__AI__OPENAI__API_KEY)
            .add_source(Environment::with_prefix("POSTPILOT").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
