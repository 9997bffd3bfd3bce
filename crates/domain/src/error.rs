use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("server responded with {status}: {message}")]
    ServerError { status: u16, message: String },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid response body: {0}")]
    DecodeError(String),
}

impl ApiError {
    /// Map a non-success status to an error. 404 is reported separately.
    pub fn from_status(status: u16, path: &str, message: impl Into<String>) -> Self {
        match status {
            404 => ApiError::NotFound(path.to_string()),
            _ => ApiError::ServerError {
                status,
                message: message.into(),
            },
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::NetworkUnreachable(_))
    }
}
