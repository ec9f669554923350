use thiserror::Error;

/// Failures talking to the external flow storage or template catalog.
/// All of them are non-fatal to the editing session: prior state is kept
/// and the operator may retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        ServiceError::Request(err.to_string())
    }
}

/// Session-level failures around save/load.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SessionError {
    /// A save or load is already in flight; the two are serialized behind a
    /// single busy flag.
    #[error("another save or load is still in flight")]
    Busy,
    #[error(transparent)]
    Service(#[from] ServiceError),
}
