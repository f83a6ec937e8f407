use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy shown to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller-fixable input problem. Resubmitting the same input will not help.
    Validation,
    /// Transport failure or deadline exceeded.
    Network,
    /// The backend answered, but not with something usable.
    Server,
    /// Configuration problem or unexpected failure.
    Unknown,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Network => "network",
            ErrorKind::Server => "server",
            ErrorKind::Unknown => "unknown",
        }
    }
}

/// A classified failure. Only the classification step builds these; consumers
/// display `message` and use `retryable` to decide whether to offer a retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub retryable: bool,
}

pub const MSG_CONNECT: &str = "Unable to connect to the server. Please try again later.";
pub const MSG_NETWORK: &str = "Network error occurred. Please check your connection and try again.";
pub const MSG_TIMED_OUT: &str = "Request timed out. Please try again.";
pub const MSG_BAD_REQUEST: &str = "Invalid request. Please check your input and try again.";
pub const MSG_NOT_FOUND: &str = "Service not found. Please try again later.";
pub const MSG_RATE_LIMITED: &str = "Too many requests. Please wait a moment and try again.";
pub const MSG_SERVER_ERROR: &str = "Server error occurred. Please try again later.";
pub const MSG_UNAVAILABLE: &str = "Service temporarily unavailable. Please try again later.";
pub const MSG_INVALID_FORMAT: &str = "Invalid response format from server. Please try again.";
pub const MSG_NO_DATA: &str = "No data received from server. Please try again.";
pub const MSG_INCOMPLETE: &str = "Incomplete data received. Please try again or contact support.";
pub const MSG_CONFIGURATION: &str = "Application configuration error. Please contact support.";

impl ErrorInfo {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Network,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Server,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn timed_out() -> Self {
        Self::network(MSG_TIMED_OUT)
    }

    pub fn configuration() -> Self {
        Self::unknown(MSG_CONFIGURATION)
    }

    /// Maps a non-2xx HTTP status to its classification.
    ///
    /// `body_message` is the `message`/`error` text pulled from the response
    /// body, used only for 400 where the backend explains what was wrong.
    pub fn from_status(status: u16, body_message: Option<String>) -> Self {
        match status {
            400 => Self::validation(body_message.unwrap_or_else(|| MSG_BAD_REQUEST.to_string())),
            404 => Self::server(MSG_NOT_FOUND),
            429 => Self::server(MSG_RATE_LIMITED),
            500 => Self::server(MSG_SERVER_ERROR),
            503 => Self::server(MSG_UNAVAILABLE),
            other => Self::server(format!("Server error ({other}). Please try again later.")),
        }
    }
}

/// Failures raised by a transport before any HTTP response arrives.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else {
            TransportError::Other(e.to_string())
        }
    }
}

impl From<TransportError> for ErrorInfo {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Connect(_) => ErrorInfo::network(MSG_CONNECT),
            TransportError::Other(_) => ErrorInfo::network(MSG_NETWORK),
        }
    }
}
