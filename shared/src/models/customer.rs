//! Customer Model

use serde::{Deserialize, Serialize};

use super::card::CardWithOrders;

/// Customer entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Customer {
    pub id: i64,
    pub name: String,
    /// Number printed on receipts
    pub customer_number: String,
    pub extension_id: i64,
    pub date_created: i64,
}

/// Customer with current card id (for order form pickers)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct CustomerListItem {
    pub id: i64,
    pub name: String,
    pub customer_number: String,
    pub current_card_id: Option<i64>,
}

/// Create customer payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerCreate {
    pub name: String,
    pub customer_number: String,
}

/// Customer with all cards (card number descending)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerWithCards {
    #[serde(flatten)]
    pub customer: Customer,
    pub cards: Vec<CardWithOrders>,
}
