use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Backend rejected the credentials ({0})")]
    Unauthorized(StatusCode),

    #[error("Backend responded with {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Invalid response body: {0}")]
    Decode(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return RepositoryError::Timeout;
        }

        if err.is_connect() || err.is_request() {
            return RepositoryError::ConnectionError(err.to_string());
        }

        if err.is_decode() || err.is_body() {
            return RepositoryError::Decode(err.to_string());
        }

        match err.status() {
            Some(status) if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN => {
                RepositoryError::Unauthorized(status)
            }
            Some(status) => RepositoryError::Status {
                status,
                message: err.to_string(),
            },
            None => RepositoryError::Unexpected(format!("Unexpected reqwest error: {err}")),
        }
    }
}

impl RepositoryError {
    /// Builds the error for a non-2xx response, keeping a short excerpt of the body.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return RepositoryError::Unauthorized(status);
        }

        let message: String = body.trim().chars().take(200).collect();
        RepositoryError::Status {
            status,
            message: if message.is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("no response body")
                    .to_string()
            } else {
                message
            },
        }
    }
}
