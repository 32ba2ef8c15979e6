//! API error handling
//!
//! Classifies transport failures into network, timeout, HTTP status and
//! decoding errors so callers never mistake a failure for an empty result.

use reqwest::StatusCode;
use thiserror::Error;

/// Longest error body kept in a message
const MAX_MESSAGE_LEN: usize = 180;

/// Errors that can occur talking to the backend
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request could not reach the server (refused, DNS, reset)
    #[error("Network error calling {endpoint}: {details}")]
    Network { endpoint: String, details: String },

    /// Request did not complete within the fixed timeout
    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },

    /// Server answered with a non-2xx status
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Status {
        endpoint: String,
        status: StatusCode,
        message: String,
    },

    /// Server answered 2xx but the body was not the expected envelope
    #[error("Unexpected response from {endpoint}: {details}")]
    Decode { endpoint: String, details: String },

    /// Configured base URL cannot be used
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// HTTP client could not be constructed
    #[error("Failed to construct HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl ApiError {
    /// Classify a reqwest send/receive error
    pub fn from_transport(error: reqwest::Error, endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        if error.is_timeout() {
            ApiError::Timeout { endpoint }
        } else if error.is_decode() {
            ApiError::Decode {
                endpoint,
                details: error.to_string(),
            }
        } else {
            ApiError::Network {
                endpoint,
                details: error_chain(&error),
            }
        }
    }

    /// Build a status error, extracting the server's message from the body
    pub fn from_status(status: StatusCode, body: &str, endpoint: impl Into<String>) -> Self {
        ApiError::Status {
            endpoint: endpoint.into(),
            status,
            message: extract_message(body, status),
        }
    }

    /// HTTP status, if the server answered at all
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the server was never reached
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ApiError::Network { .. } | ApiError::Timeout { .. })
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            ApiError::Network { .. } => {
                Some("Check that the API server is running and the base URL is correct.")
            }
            ApiError::Timeout { .. } => Some("The server is slow to respond. Try again."),
            ApiError::InvalidBaseUrl { .. } => {
                Some("Set api_base_url with `taskdeck config set api_base_url <url>`.")
            }
            ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND => {
                Some("The item may have been removed. Refresh the list.")
            }
            _ => None,
        }
    }
}

/// Pull a human-readable message out of an error payload
///
/// Prefers the JSON `message` field, then `error`, then the raw body text.
fn extract_message(body: &str, status: StatusCode) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = value.get(key).and_then(|v| v.as_str()) {
                return compact_text(text);
            }
        }
    }

    let text = compact_text(body);
    if text.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string()
    } else {
        text
    }
}

/// Render an error with its sources, reqwest hides the root cause otherwise
fn error_chain(error: &dyn std::error::Error) -> String {
    let mut text = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

fn compact_text(value: &str) -> String {
    value.trim().chars().take(MAX_MESSAGE_LEN).collect()
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_message_from_json() {
        let err = ApiError::from_status(
            StatusCode::NOT_FOUND,
            r#"{"success":false,"message":"Todo not found"}"#,
            "DELETE /todos/9",
        );

        assert_eq!(err.status(), Some(StatusCode::NOT_FOUND));
        assert!(err.to_string().contains("Todo not found"));
        assert!(err.to_string().contains("DELETE /todos/9"));
        assert!(err.recovery_suggestion().is_some());
        assert!(!err.is_unreachable());
    }

    #[test]
    fn test_status_message_from_error_field() {
        let err = ApiError::from_status(
            StatusCode::BAD_REQUEST,
            r#"{"error":"Title is required"}"#,
            "POST /todos",
        );
        assert!(err.to_string().contains("Title is required"));
    }

    #[test]
    fn test_status_message_plain_text_and_empty() {
        let msg = extract_message("  upstream exploded  ", StatusCode::BAD_GATEWAY);
        assert_eq!(msg, "upstream exploded");

        let msg = extract_message("", StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(msg, "Service Unavailable");
    }

    #[test]
    fn test_long_body_is_truncated() {
        let body = "x".repeat(1000);
        let msg = extract_message(&body, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(msg.len(), MAX_MESSAGE_LEN);
    }

    #[derive(Debug, Error)]
    #[error("error sending request")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_error_chain_includes_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        assert_eq!(
            error_chain(&Outer(inner)),
            "error sending request: refused"
        );

        let err = ApiError::Network {
            endpoint: "GET /todos".to_string(),
            details: "connection refused".to_string(),
        };
        assert!(err.is_unreachable());
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_timeout_is_unreachable() {
        let err = ApiError::Timeout {
            endpoint: "GET /todos".to_string(),
        };
        assert!(err.is_unreachable());
        assert!(err.status().is_none());
        assert!(err.to_string().contains("timed out"));
    }
}
