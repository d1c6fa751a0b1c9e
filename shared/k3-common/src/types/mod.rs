//! Shared Types

pub mod inventory;
pub mod query;

pub use inventory::*;
pub use query::*;
