use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Client secret file not found at {path}; download the OAuth client JSON for a desktop app and save it there")]
    ClientSecretMissing { path: String },

    #[error("Client secret file {path} is invalid: {reason}")]
    ClientSecretInvalid { path: String, reason: String },

    #[error("User denied consent: {0}")]
    ConsentDenied(String),

    #[error("Consent was not completed within {waited_secs} seconds")]
    ConsentTimedOut { waited_secs: u64 },

    #[error("Consent flow failed: {0}")]
    ConsentFailed(String),

    #[error("OAuth state mismatch (expected {expected}, got {actual})")]
    StateMismatch { expected: String, actual: String },

    #[error("Authorization code rejected: {0}")]
    InvalidAuthCode(String),

    #[error("Token refresh failed: {0}")]
    TokenRefreshFailed(String),

    #[error("Credential storage failed: {0}")]
    CredentialStorage(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, AuthError>;
