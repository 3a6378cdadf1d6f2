use reqwest::StatusCode;
use thiserror::Error as ThisError;

use super::IsRetryable;

#[derive(Debug, ThisError)]
pub enum TomeError {
    #[error("Upstream error with status: {0}")]
    UpstreamStatus(StatusCode),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlError(#[from] url::ParseError),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Malformed row in `{table}`: {reason}")]
    MalformedRow { table: String, reason: String },

    #[error("No row with id={id} in `{table}`")]
    NotFound { table: String, id: i64 },

    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("Unsupported engine type: {0:?}")]
    UnsupportedEngineKind(String),

    #[error("Engine is missing required option `{0}`")]
    MissingEngineOption(&'static str),

    #[error("Record has not been saved yet")]
    NotPersisted,

    #[error("Unexpected error: {0}")]
    UnexpectedError(String),
}

impl TomeError {
    pub fn malformed(table: &str, reason: impl Into<String>) -> Self {
        TomeError::MalformedRow {
            table: table.to_string(),
            reason: reason.into(),
        }
    }

    /// Store-level failures the UI should report as "your edit was not saved".
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            TomeError::DatabaseError(_) | TomeError::RactorError(_) | TomeError::NotFound { .. }
        )
    }
}

impl IsRetryable for TomeError {
    fn is_retryable(&self) -> bool {
        match self {
            TomeError::ReqwestError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            TomeError::UpstreamStatus(status) => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_transient_upstream_failures_are_retryable() {
        assert!(TomeError::UpstreamStatus(StatusCode::BAD_GATEWAY).is_retryable());
        assert!(TomeError::UpstreamStatus(StatusCode::TOO_MANY_REQUESTS).is_retryable());
        assert!(!TomeError::UpstreamStatus(StatusCode::NOT_FOUND).is_retryable());
        assert!(!TomeError::UpstreamStatus(StatusCode::UNAUTHORIZED).is_retryable());
        assert!(!TomeError::malformed("engines", "bad json").is_retryable());
    }

    #[test]
    fn store_failures_are_distinguishable() {
        let not_found = TomeError::NotFound {
            table: "engines".to_string(),
            id: 7,
        };
        assert!(not_found.is_store_failure());
        assert_eq!(not_found.to_string(), "No row with id=7 in `engines`");
        assert!(!TomeError::UpstreamStatus(StatusCode::BAD_GATEWAY).is_store_failure());
    }
}
