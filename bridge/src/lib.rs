//! K3 Bridge
//!
//! Signed access to the Kingdee K3 Cloud web API: single bill queries,
//! all-warehouse inventory, a file snapshot cache and a periodic sync.

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod inventory;
pub mod sync;

pub use client::K3Client;
pub use error::{BridgeError, BridgeResult};
