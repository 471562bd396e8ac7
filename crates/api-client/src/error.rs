//! Error types for the API client
//!
//! Two layers live here. [`ClientError`] and [`TransportError`] are ordinary
//! Rust errors raised while building a transport or talking to the network.
//! [`ApiError`] is the classified error carried inside an
//! [`ApiResponse`](crate::ApiResponse) envelope; request operations never
//! return it through `Err`, callers branch on the envelope instead.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::response::Details;

/// Result type for client construction
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors raised while building a client or its transport
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid proxy configuration
    #[error("Invalid proxy configuration: {0}")]
    InvalidProxy(String),

    /// Client build error
    #[error("Failed to build HTTP client: {0}")]
    BuildError(String),
}

/// Faults reported by a [`Transport`](crate::Transport)
///
/// A non-2xx status is not a transport fault: it comes back as an ordinary
/// [`TransportResponse`](crate::TransportResponse) and is classified later.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request address could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// No connection could be established (DNS, refused, reset)
    #[error("Connection failed: {0}")]
    Connect(String),

    /// The transport gave up waiting for the remote side
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The request could not be sent
    #[error("Network request failed: {0}")]
    Request(String),

    /// The response body could not be read
    #[error("Failed to read response body: {0}")]
    Body(String),
}

impl TransportError {
    /// Check if the transport signalled a timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Timeout(_))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            TransportError::Timeout(message)
        } else if err.is_connect() {
            TransportError::Connect(message)
        } else if err.is_body() || err.is_decode() {
            TransportError::Body(message)
        } else {
            TransportError::Request(message)
        }
    }
}

/// Classification tag of an [`ApiError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// The transport failed, or a fault nothing else classified
    NetworkError,
    /// The transport reported a timeout
    TimeoutError,
    /// The request body was rejected before anything was sent
    ValidationError,
    /// The remote answered with a non-2xx status
    ApiError,
    /// A request interceptor failed
    UnknownError,
}

impl ErrorKind {
    /// Wire name of the tag
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::TimeoutError => "TIMEOUT_ERROR",
            ErrorKind::ValidationError => "VALIDATION_ERROR",
            ErrorKind::ApiError => "API_ERROR",
            ErrorKind::UnknownError => "UNKNOWN_ERROR",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classified error carried by a failed [`ApiResponse`](crate::ApiResponse)
///
/// `status` is only ever set for [`ErrorKind::ApiError`]; the constructors
/// are the only way to build a value, so that holds everywhere.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    #[serde(rename = "type")]
    kind: ErrorKind,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Details>,
}

impl ApiError {
    fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NetworkError, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::TimeoutError, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ValidationError, message)
    }

    /// Remote failure with the HTTP status it was reported with
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            ..Self::new(ErrorKind::ApiError, message)
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownError, message)
    }

    /// Attach diagnostic details
    pub fn with_details(mut self, details: impl Into<Details>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Replace the human-readable message, keeping kind, status and details
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn details(&self) -> Option<&Details> {
        self.details.as_ref()
    }

    /// True for a remote 401
    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}
