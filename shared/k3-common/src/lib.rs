//! K3 Bridge Common Library
//!
//! Wire types for the K3 Cloud web API and the inventory types shared by the
//! query client, the cache and the dashboard output.

pub mod types;

pub use types::*;
