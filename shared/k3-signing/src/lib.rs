//! K3 Cloud Request Signing
//!
//! Reproduces the vendor SDK's authentication scheme:
//!
//! - **secret**: recovers the API-gateway client secret embedded in the app id
//! - **signature**: HMAC-SHA256 with the vendor's hex-then-base64 encoding
//! - **headers**: assembles the full signed header set for one request

pub mod error;
pub mod headers;
pub mod secret;
pub mod signature;

pub use error::{Result, SigningError};
pub use headers::{AppIdentity, RequestSigner, SignedHeaders};
pub use secret::GatewayCredentials;
