//! Bridge Error Types

use thiserror::Error;

/// Errors from talking to K3 Cloud or handling its data.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Request signing failed.
    #[error("Signing error: {0}")]
    Signing(#[from] k3_signing::SigningError),

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status.
    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    /// Server accepted the call but reported a business error.
    #[error("K3 Cloud rejected the query: {0}")]
    Rejected(String),

    /// Malformed JSON in a response or cache file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
