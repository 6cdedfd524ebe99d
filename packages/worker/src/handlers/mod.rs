pub mod content;
pub mod maintenance;

use common::event::{OutcomeData, TaskErrorInfo};
use common::task::TaskErrorCode;
use providers::{AiError, AiService, FactoryError};

/// What a successful task execution hands back to the runner.
#[derive(Debug)]
pub struct Execution {
    pub data: OutcomeData,
    /// Provider and model that produced the content; None for non-AI kinds.
    pub provider: Option<String>,
    pub model: Option<String>,
}

impl Execution {
    /// Outcome produced by an AI service, with its audit fields.
    pub fn ai(data: OutcomeData, service: &dyn AiService) -> Self {
        Self {
            data,
            provider: Some(service.provider_name().to_string()),
            model: Some(service.model().to_string()),
        }
    }

    /// Outcome with no provider involved.
    pub fn plain(data: OutcomeData) -> Self {
        Self {
            data,
            provider: None,
            model: None,
        }
    }
}

pub fn factory_error(e: FactoryError) -> TaskErrorInfo {
    TaskErrorInfo::new(e.code(), e.to_string())
}

pub fn ai_error(e: AiError) -> TaskErrorInfo {
    TaskErrorInfo::new(e.code(), e.to_string())
}

/// Payloads that fail to parse are permanent failures, not provider flakes.
pub fn payload_error(e: serde_json::Error) -> TaskErrorInfo {
    TaskErrorInfo::new(TaskErrorCode::Internal, format!("bad task payload: {e}"))
}
