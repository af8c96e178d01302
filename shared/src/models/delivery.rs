//! Delivery Model (送货记录)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Delivery recorded against exactly one order
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Delivery {
    pub id: i64,
    pub order_id: i64,
    pub amount_delivered: Option<Decimal>,
    /// Delivery date (Unix millis)
    pub date_delivered: Option<i64>,
}

/// Create delivery payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryCreate {
    pub order_id: i64,
    pub amount_delivered: Decimal,
    /// ISO 8601 date or datetime, defaults to now
    #[serde(default)]
    pub date_delivered: Option<String>,
}
