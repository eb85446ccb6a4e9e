// Error handling module
// Defines the SDK error type. Unsuccessful HTTP statuses are not errors:
// they come back to the caller as an ApiResponse.

use thiserror::Error;

use crate::service::ServiceName;

/// Errors that can occur while building or sending a request
#[derive(Error, Debug)]
pub enum SdkError {
    /// Required configuration is missing or invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Service base URI and path do not form a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A header name or value could not be encoded
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// Connection, DNS, timeout or body read failure
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request body or response payload (de)serialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Replay was requested for a service that has not sent anything yet
    #[error("No pending request for the {0} service")]
    NoPendingRequest(ServiceName),
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;
