//! Data models
//!
//! Shared between ledger-server and clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`;
//! rows carrying money are decoded by the server repositories because
//! amounts are stored as decimal text.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY).

pub mod card;
pub mod customer;
pub mod delivery;
pub mod extension;
pub mod order;
pub mod user;

// Re-exports
pub use card::*;
pub use customer::*;
pub use delivery::*;
pub use extension::*;
pub use order::*;
pub use user::*;
