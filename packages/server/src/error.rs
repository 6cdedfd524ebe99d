use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use providers::FactoryError;
use sea_orm::DbErr;

pub use common::api::ErrorBody;

/// Application-level error type.
///
/// Error codes: `VALIDATION_ERROR`, `NOT_FOUND`, `CONFLICT`,
/// `PROVIDER_NOT_CONFIGURED`, `UNKNOWN_PROVIDER`, `QUEUE_UNAVAILABLE`,
/// `INTERNAL_ERROR`.
#[derive(Debug)]
pub enum AppError {
    Validation(String),
    NotFound(String),
    Conflict(String),
    /// The requested provider exists but has no credential configured.
    ProviderNotConfigured(String),
    /// The requested provider name is outside the supported set.
    UnknownProvider(String),
    /// The broker is disabled or a publish failed.
    QueueUnavailable(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "VALIDATION_ERROR".into(),
                    message: msg,
                },
            ),
            AppError::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    code: "NOT_FOUND".into(),
                    message: msg,
                },
            ),
            AppError::Conflict(msg) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    code: "CONFLICT".into(),
                    message: msg,
                },
            ),
            AppError::ProviderNotConfigured(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "PROVIDER_NOT_CONFIGURED".into(),
                    message: msg,
                },
            ),
            AppError::UnknownProvider(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    code: "UNKNOWN_PROVIDER".into(),
                    message: msg,
                },
            ),
            AppError::QueueUnavailable(detail) => {
                tracing::warn!("Queue unavailable: {}", detail);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    ErrorBody {
                        code: "QUEUE_UNAVAILABLE".into(),
                        message: "Task queue is not available, try again later".into(),
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        code: "INTERNAL_ERROR".into(),
                        message: "An unexpected error occurred".into(),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<FactoryError> for AppError {
    fn from(err: FactoryError) -> Self {
        match err {
            FactoryError::UnknownProvider { .. } => AppError::UnknownProvider(err.to_string()),
            FactoryError::NotConfigured { .. } => AppError::ProviderNotConfigured(err.to_string()),
            FactoryError::Init(detail) => AppError::Internal(detail),
        }
    }
}

impl From<mq::MqError> for AppError {
    fn from(err: mq::MqError) -> Self {
        AppError::QueueUnavailable(err.to_string())
    }
}
