use thiserror::Error;

/// Failure of a core operation. Every operation resolves to `Result<_, CoreError>`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Rejected locally before any network call.
    #[error("{0}")]
    Validation(String),
    /// No session token; the request was never sent.
    #[error("Not authenticated")]
    Auth,
    /// Network failure or a body that is not a valid envelope.
    #[error("Failed to connect to server: {0}")]
    Transport(String),
    /// The backend answered with `success: false` (or without required data).
    #[error("{0}")]
    Backend(String),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

impl From<reqwest::Error> for CoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
