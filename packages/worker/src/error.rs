use thiserror::Error;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("MQ error: {0}")]
    Mq(String),

    #[error("Provider setup error: {0}")]
    Providers(String),
}

impl From<mq::MqError> for WorkerError {
    fn from(e: mq::MqError) -> Self {
        WorkerError::Mq(e.to_string())
    }
}

impl From<providers::FactoryError> for WorkerError {
    fn from(e: providers::FactoryError) -> Self {
        WorkerError::Providers(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, WorkerError>;
