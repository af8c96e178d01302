//! Shared types for the card ledger
//!
//! Data models exchanged between the ledger server and its clients,
//! plus small utilities (ids, timestamps) used on both sides.

pub mod models;
pub mod util;

// Re-exports
pub use rust_decimal::Decimal;
pub use serde::{Deserialize, Serialize};
