//! Errors produced by the request pipeline

use serde_json::{Map, Value};
use thiserror::Error;

/// Message used when an error body is not valid JSON
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Why an API call failed
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("API Error: {status} {status_text}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Canonical reason phrase
        status_text: String,
        /// Parsed error body, or `{"message": ..}` when it was not JSON
        details: Value,
    },

    /// Refresh or retry failed; credentials were cleared
    #[error("Session expired. Please log in again.")]
    SessionExpired,

    /// No refresh credential is stored
    #[error("No refresh token available.")]
    NoRefreshToken,

    /// The refresh endpoint rejected the refresh credential
    #[error("Failed to refresh token.")]
    RefreshFailed {
        /// HTTP status of the refresh response
        status: u16,
    },

    /// A success body did not parse as the expected type
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request body could not be serialized
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Durable storage rejected a credential write
    #[error("Failed to update stored credentials: {0}")]
    Storage(String),
}

impl ApiError {
    /// Build the error for a non-success response
    pub fn from_response(status: u16, status_text: &str, body: &str) -> Self {
        let details = serde_json::from_str::<Value>(body).unwrap_or_else(|_| {
            let mut fallback = Map::new();
            fallback.insert(
                "message".to_string(),
                Value::String(UNKNOWN_ERROR_MESSAGE.to_string()),
            );
            Value::Object(fallback)
        });

        ApiError::Status {
            status,
            status_text: status_text.to_string(),
            details,
        }
    }

    /// User-facing summary of the error
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Parsed response body, for status errors
    pub fn details(&self) -> Option<&Value> {
        match self {
            ApiError::Status { details, .. } => Some(details),
            _ => None,
        }
    }

    /// HTTP status, when the error came from a response
    pub const fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } | ApiError::RefreshFailed { status } => Some(*status),
            _ => None,
        }
    }

    /// The backend's `detail` string, if it sent one
    pub fn detail(&self) -> Option<&str> {
        self.details()?.get("detail")?.as_str()
    }

    /// Field-level messages as `field: msg1, msg2`, sorted by field
    pub fn field_errors(&self) -> Vec<String> {
        let Some(Value::Object(fields)) = self.details() else {
            return Vec::new();
        };

        fields
            .iter()
            .map(|(field, value)| format!("{}: {}", field, join_messages(value)))
            .collect()
    }

    /// Whether the session was terminated by this call
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, ApiError::SessionExpired)
    }
}

fn join_messages(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}
