use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// The server answered with a structured error body.
    #[error("API error {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ClientError {
    /// Error code from a structured API error, if this is one.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => Some(code),
            Self::Transport(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
