//! Extension Model (门店 / 分支)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Extension (tenant / branch) owning users, customers and cards
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Extension {
    pub id: i64,
    pub name: String,
    /// Commission rate in percent, `None` means the configured default
    pub rate: Option<Decimal>,
}
