// Error types for the telemetry engine

use thiserror::Error;

/// Result type alias for telemetry engine operations
pub type Result<T> = std::result::Result<T, QuinnError>;

/// Errors that can occur across the Quinn telemetry engine
#[derive(Debug, Error)]
pub enum QuinnError {
    /// Durable key-value medium unavailable or corrupt
    #[error("Storage error: {0}")]
    Storage(String),

    /// Analysis gateway rejected the request with 429
    #[error("Rate limit exceeded. Please try again shortly.")]
    RateLimited,

    /// Analysis gateway rejected the request with 402
    #[error("AI credits exhausted. Add credits in Settings → Workspace → Usage.")]
    CreditsExhausted,

    /// Analysis gateway returned another non-2xx status
    #[error("AI gateway error ({status}): {message}")]
    Gateway { status: u16, message: String },

    /// The streamed read failed or was aborted mid-response
    #[error("Analysis service unavailable: {0}")]
    Unavailable(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl QuinnError {
    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        QuinnError::Storage(msg.into())
    }

    /// Create an unavailable error
    pub fn unavailable(msg: impl Into<String>) -> Self {
        QuinnError::Unavailable(msg.into())
    }

    /// Map a gateway response status to the matching error
    pub fn from_gateway_status(status: u16, message: impl Into<String>) -> Self {
        match status {
            429 => QuinnError::RateLimited,
            402 => QuinnError::CreditsExhausted,
            _ => QuinnError::Gateway {
                status,
                message: message.into(),
            },
        }
    }

    /// Whether this is an upstream request failure the user may retry
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QuinnError::RateLimited
                | QuinnError::CreditsExhausted
                | QuinnError::Unavailable(_)
                | QuinnError::Gateway { .. }
        )
    }
}
