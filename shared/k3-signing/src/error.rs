//! Signing Error Types

use thiserror::Error;

/// Errors raised while decoding secrets or building signatures.
#[derive(Debug, Error)]
pub enum SigningError {
    /// Encoded client secret does not have the fixed vendor length.
    #[error("Invalid client secret length (expected 32 characters, got {0})")]
    InvalidSecretLength(usize),

    /// Encoded client secret is not valid base64.
    #[error("Base64 decoding failed: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Data to obfuscate is longer than the keystream.
    #[error("Keystream too short ({keystream} bytes) for {data} bytes of input")]
    KeystreamTooShort { keystream: usize, data: usize },
}

/// Result type for signing operations.
pub type Result<T> = std::result::Result<T, SigningError>;
