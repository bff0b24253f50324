//! Client Error Types
//!
//! Every way a request to the backend can fail, and the message each
//! failure shows to the user.

use thiserror::Error;

/// Message shown for failures that never produced a response
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again.";

/// Fallback when an error response carries no `message`
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Request failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// The request was abandoned after the configured timeout
    #[error("Request timed out")]
    Timeout,

    /// The request never completed (connection refused, reset, DNS...)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-2xx response; `message` is the body's `message` field or a default
    #[error("{message}")]
    Status { status: u16, message: String },

    /// A success status whose body is not JSON, usually a misrouted request
    /// answered by something other than the API
    #[error("Server returned non-JSON response. Check if backend is running correctly.")]
    NotJson { content_type: Option<String> },

    /// JSON body that does not match the expected shape
    #[error("Malformed response: {0}")]
    Decode(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The HTTP client itself could not be constructed
    #[error("HTTP client error: {0}")]
    Build(String),
}

impl ClientError {
    /// True when the failure happened before any response arrived
    pub fn is_network(&self) -> bool {
        matches!(self, ClientError::Timeout | ClientError::Network(_))
    }

    /// HTTP status of the response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable text for error views and notifications
    pub fn user_message(&self) -> String {
        if self.is_network() {
            NETWORK_ERROR_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }

    /// Notification text for a failed action.
    ///
    /// Status errors read `"<failure>: <server message>"`; network errors
    /// use the generic network message regardless of `failure`.
    pub fn action_message(&self, failure: &str) -> String {
        match self {
            ClientError::Timeout | ClientError::Network(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ClientError::Status { message, .. } => format!("{}: {}", failure, message),
            other => format!("{}: {}", failure, other),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if err.is_builder() {
            ClientError::InvalidRequest(err.to_string())
        } else {
            ClientError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;
