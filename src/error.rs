use thiserror::Error;

/// Every way a single run can fail.
///
/// None of these is fatal to the process: the dispatcher renders the error
/// into the widget's error channel and the widget stays usable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error("Unknown language: {0}")]
    UnknownLanguage(String),
    #[error("Server error: {0}")]
    ServiceError(u16),
    #[error("Protocol error: {0}")]
    ProtocolError(String),
    #[error("Timeout waiting for result after {attempts} attempts")]
    Timeout { attempts: u32 },
    #[error("{0}")]
    ExecutionError(String),
    #[error("Failed to load interpreter: {0}")]
    LoadError(String),
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("A run is already in progress")]
    Busy,
    #[error("Widget limit of {limit} reached")]
    StoreFull { limit: usize },
}

impl From<reqwest::Error> for RunError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => RunError::ServiceError(status.as_u16()),
            None if err.is_decode() => RunError::ProtocolError(err.to_string()),
            None => RunError::Transport(err.to_string()),
        }
    }
}
