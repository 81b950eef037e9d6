//! Service layer error types
//!
//! Abstracts over transport errors so the roster store can surface one
//! generic failure state to whoever renders it.

use thiserror::Error;

use crate::ports::outbound::ApiError;

/// Message shown for any transport failure; the detail goes to the log.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Could not reach the event server. Showing the last known roster.";

/// Errors that can occur in service operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// Request failed to send or timed out
    #[error("Request error: {0}")]
    Request(String),

    /// Server returned an error status
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Failed to parse response data (or to encode the request)
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl From<ApiError> for ServiceError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::RequestFailed(msg) => ServiceError::Request(msg),
            ApiError::HttpError { status, message } => ServiceError::ServerError { status, message },
            ApiError::ParseError(msg) | ApiError::SerializeError(msg) => {
                ServiceError::ParseError(msg)
            }
        }
    }
}

impl ServiceError {
    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::ServerError { status: 404, .. })
    }

    /// Check if this is an authorization error
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            ServiceError::ServerError {
                status: 401 | 403,
                ..
            }
        )
    }

    /// The text surfaced to the user. Every failure kind reads the same.
    pub fn user_message(&self) -> String {
        GENERIC_FAILURE_MESSAGE.to_string()
    }
}

/// Default request timeout in milliseconds (10 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Get the request timeout from environment variable or use default
pub fn get_request_timeout_ms() -> u64 {
    std::env::var("KEYPARTY_REQUEST_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_errors_map_to_service_errors() {
        let err: ServiceError = ApiError::HttpError {
            status: 404,
            message: "no such event".into(),
        }
        .into();
        assert!(err.is_not_found());

        let err: ServiceError = ApiError::RequestFailed("connection refused".into()).into();
        assert_eq!(err, ServiceError::Request("connection refused".into()));

        let err: ServiceError = ApiError::SerializeError("bad body".into()).into();
        assert!(matches!(err, ServiceError::ParseError(_)));
    }

    #[test]
    fn test_user_message_does_not_leak_detail() {
        let err = ServiceError::ServerError {
            status: 500,
            message: "stack trace".into(),
        };
        assert_eq!(err.user_message(), GENERIC_FAILURE_MESSAGE);
        assert!(!err.is_unauthorized());
    }
}
