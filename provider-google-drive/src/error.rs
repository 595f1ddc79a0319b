//! Error types for Google Drive provider

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Google Drive provider errors
#[derive(Error, Debug)]
pub enum GoogleDriveError {
    /// Access token rejected
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// API request returned an error
    #[error("Google Drive API error (status {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    /// Rate limit exceeded after transport retries
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    /// Parent folder does not exist or is not visible to this app
    #[error("Parent folder not found: {parent_id}")]
    ParentNotFound { parent_id: String },

    /// Failed to parse API response
    #[error("Failed to parse API response: {0}")]
    ParseError(String),

    /// Bridge error
    #[error(transparent)]
    BridgeError(#[from] BridgeError),
}

/// Result type for Google Drive operations
pub type Result<T> = std::result::Result<T, GoogleDriveError>;

impl From<GoogleDriveError> for BridgeError {
    fn from(error: GoogleDriveError) -> Self {
        match error {
            GoogleDriveError::AuthenticationFailed(message) => BridgeError::Remote {
                status: 401,
                message: format!("Authentication failed: {}", message),
            },
            GoogleDriveError::ApiError {
                status_code,
                message,
            } => BridgeError::Remote {
                status: status_code,
                message,
            },
            GoogleDriveError::RateLimitExceeded { message } => BridgeError::Remote {
                status: 429,
                message,
            },
            GoogleDriveError::ParentNotFound { parent_id } => BridgeError::Remote {
                status: 404,
                message: format!("Parent folder not found: {}", parent_id),
            },
            GoogleDriveError::ParseError(message) => {
                BridgeError::OperationFailed(format!("Parse error: {}", message))
            }
            GoogleDriveError::BridgeError(e) => e,
        }
    }
}
