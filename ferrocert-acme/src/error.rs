/// Error types for ACME operations
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AcmeError {
    #[error("ACME request failed: {0}")]
    Transport(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Order failed: {0}")]
    OrderFailed(String),

    #[error("Invalid key: {0}")]
    InvalidKey(String),

    #[error("Base64 decode error: {0}")]
    Base64Error(#[from] base64::DecodeError),

    #[error("Timed out waiting for {0}")]
    Timeout(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AcmeError {
    /// Whether retrying the same request later may succeed
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AcmeError::Transport(_) | AcmeError::Timeout(_) | AcmeError::RateLimitExceeded(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, AcmeError>;
