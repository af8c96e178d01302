//! Card Model (客户卡)
//!
//! A card is a customer's running credit account. Cards form an
//! append-only chain per customer: closing card `n` creates card `n + 1`.

use std::fmt;

use serde::de::{self, Visitor};
use serde::{Deserialize, Serialize};

use super::order::Order;

/// Card status, one way `OPEN -> CLOSED`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CardStatus {
    #[default]
    Open,
    Closed,
}

/// Card payment status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    #[default]
    Unpaid,
}

/// Card entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Card {
    pub id: i64,
    pub card_number: i64,
    pub card_status: CardStatus,
    pub payment_status: PaymentStatus,
    pub customer_id: i64,
    pub extension_id: i64,
    /// Creation time (Unix millis)
    pub date_created: i64,
}

impl Card {
    pub fn is_open(&self) -> bool {
        self.card_status == CardStatus::Open
    }
}

/// Card with its orders (newest first)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardWithOrders {
    #[serde(flatten)]
    pub card: Card,
    pub orders: Vec<Order>,
}

/// Kind of card update carried by `PATCH /api/card/{id}`
///
/// Only the exact string `"Status"` closes the card. Anything else,
/// including a missing or `null` field, means payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
pub enum CardUpdateType {
    /// Close the card and open its successor
    Status,
    /// Mark the card as paid
    #[default]
    Payment,
}

impl<'de> Deserialize<'de> for CardUpdateType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_any(UpdateTypeVisitor)
    }
}

struct UpdateTypeVisitor;

impl<'de> Visitor<'de> for UpdateTypeVisitor {
    type Value = CardUpdateType;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a card update type")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Ok(if v == "Status" {
            CardUpdateType::Status
        } else {
            CardUpdateType::Payment
        })
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(CardUpdateType::Payment)
    }

    fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(CardUpdateType::Payment)
    }

    fn visit_some<D: serde::Deserializer<'de>>(self, d: D) -> Result<Self::Value, D::Error> {
        d.deserialize_any(self)
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
        Ok(CardUpdateType::Payment)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
        Ok(CardUpdateType::Payment)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
        Ok(CardUpdateType::Payment)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
        Ok(CardUpdateType::Payment)
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        while seq.next_element::<de::IgnoredAny>()?.is_some() {}
        Ok(CardUpdateType::Payment)
    }

    fn visit_map<A: de::MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        while map.next_entry::<de::IgnoredAny, de::IgnoredAny>()?.is_some() {}
        Ok(CardUpdateType::Payment)
    }
}

/// Card update payload
///
/// `cardnumber` is the successor number (current + 1) the client expects.
/// When present, the ids must agree with the stored card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardUpdate {
    #[serde(rename = "updateType", default)]
    pub update_type: CardUpdateType,
    #[serde(rename = "cardnumber", default)]
    pub card_number: Option<i64>,
    #[serde(rename = "customerid", default)]
    pub customer_id: Option<i64>,
    #[serde(rename = "extensionid", default)]
    pub extension_id: Option<i64>,
}

/// Trivial acknowledgement body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusAck {
    pub status: u16,
}

impl StatusAck {
    pub fn ok() -> Self {
        Self { status: 200 }
    }
}
