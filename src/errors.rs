use thiserror::Error;

/// Error type shared by the budget, expense, and persistence layers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TrackerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Corrupt data: {0}")]
    CorruptData(String),
}

pub type Result<T> = std::result::Result<T, TrackerError>;

impl TrackerError {
    pub fn validation(message: impl Into<String>) -> Self {
        TrackerError::Validation(message.into())
    }

    /// True for failures that leave in-memory state authoritative.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TrackerError::Storage(_) | TrackerError::CorruptData(_))
    }
}

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::CorruptData(err.to_string())
    }
}
