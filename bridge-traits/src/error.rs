use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Bridge capability not available: {0}")]
    NotAvailable(String),

    #[error("Bridge operation failed: {0}")]
    OperationFailed(String),

    #[error("Remote request failed (status {status}): {message}")]
    Remote { status: u16, message: String },
}

pub type Result<T> = std::result::Result<T, BridgeError>;
