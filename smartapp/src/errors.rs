//! Error types for the SmartApp webhook
//!
//! Every error that can leave the dispatcher carries the optional
//! correlation id taken from the `X-ST-Correlation` request header, so a
//! failure can be matched against the platform's own logs. Messages never
//! contain the request body, tokens, or signature material.

use thiserror::Error;

/// The request signature on a lifecycle request was missing or invalid
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct SignatureError {
    pub message: String,
    pub correlation_id: Option<String>,
}

impl SignatureError {
    pub fn new(message: impl Into<String>, correlation_id: Option<&str>) -> Self {
        Self {
            message: message.into(),
            correlation_id: correlation_id.map(str::to_string),
        }
    }
}

/// Error returned by the lifecycle dispatcher
#[derive(Error, Debug)]
pub enum SmartAppError {
    /// The lifecycle request was malformed or invalid (client's fault)
    #[error("Bad request: {message}")]
    BadRequest {
        message: String,
        correlation_id: Option<String>,
    },

    /// The request could not be authenticated
    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    /// Anything unanticipated while parsing or handling the request
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        correlation_id: Option<String>,
    },
}

impl SmartAppError {
    pub fn bad_request(message: impl Into<String>, correlation_id: Option<&str>) -> Self {
        SmartAppError::BadRequest {
            message: message.into(),
            correlation_id: correlation_id.map(str::to_string),
        }
    }

    pub fn internal(message: impl Into<String>, correlation_id: Option<&str>) -> Self {
        SmartAppError::Internal {
            message: message.into(),
            correlation_id: correlation_id.map(str::to_string),
        }
    }

    /// The correlation id of the request that failed, if the platform sent one
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            SmartAppError::BadRequest { correlation_id, .. }
            | SmartAppError::Internal { correlation_id, .. } => correlation_id.as_deref(),
            SmartAppError::Signature(e) => e.correlation_id.as_deref(),
        }
    }
}

/// Failure to retrieve a public key from the key server
#[derive(Error, Debug)]
pub enum KeyFetchError {
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Key server returned {status} for {url}")]
    StatusError {
        status: reqwest::StatusCode,
        url: String,
    },
}

impl KeyFetchError {
    /// Whether another attempt could succeed: connection failures, timeouts
    /// and error statuses from the key server.
    pub fn is_retryable(&self) -> bool {
        match self {
            KeyFetchError::HttpError(e) => e.is_connect() || e.is_timeout() || e.is_status(),
            KeyFetchError::StatusError { .. } => true,
        }
    }
}

/// Error raised while starting or running the service
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Shutdown error: {0}")]
    ShutdownError(String),
}
