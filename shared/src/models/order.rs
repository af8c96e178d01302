//! Order Model (订单)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::delivery::Delivery;

/// Order type tag
///
/// Fixed set of tags recorded on an order. Each tag has its own display
/// label and accounting treatment. Stored tags that are not recognised
/// decode as [`OrderType::Burned`] (the "other / loss" bucket).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Standard credit order against a card
    #[default]
    Order,
    /// Paid-on-the-spot sale, tracked for delivery reconciliation
    CashSale,
    /// Non-sale financial charge
    Charge,
    /// Goods given away
    Donation,
    /// Loss recorded as damaged goods
    Damage,
    /// Goods destroyed / burned
    #[serde(other)]
    Burned,
}

impl OrderType {
    pub const ALL: [OrderType; 6] = [
        OrderType::Order,
        OrderType::CashSale,
        OrderType::Charge,
        OrderType::Donation,
        OrderType::Damage,
        OrderType::Burned,
    ];

    /// Tag as stored in the `orders.type` column
    pub fn as_tag(&self) -> &'static str {
        match self {
            OrderType::Order => "ORDER",
            OrderType::CashSale => "CASH_SALE",
            OrderType::Charge => "CHARGE",
            OrderType::Donation => "DONATION",
            OrderType::Damage => "DAMAGE",
            OrderType::Burned => "BURNED",
        }
    }

    /// Parse a stored tag, unknown values fall into `Burned`
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "ORDER" => OrderType::Order,
            "CASH_SALE" => OrderType::CashSale,
            "CHARGE" => OrderType::Charge,
            "DONATION" => OrderType::Donation,
            "DAMAGE" => OrderType::Damage,
            _ => OrderType::Burned,
        }
    }

    /// Display label shown on receipts and tables
    pub fn label(&self) -> &'static str {
        match self {
            OrderType::Order => "Commande",
            OrderType::CashSale => "Vente cash",
            OrderType::Charge => "Charge",
            OrderType::Donation => "Don",
            OrderType::Damage => "Foutu",
            OrderType::Burned => "Brulé",
        }
    }

    /// Whether the customer is expected to pay for this kind of entry
    ///
    /// Donations and losses carry no expected payment.
    pub fn expects_payment(&self) -> bool {
        matches!(
            self,
            OrderType::Order | OrderType::CashSale | OrderType::Charge
        )
    }
}

/// Order record
///
/// Numeric fields are optional: a missing value counts as zero everywhere
/// it is summed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    pub id: i64,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    /// Walk-in customer name (non-card entries)
    pub name: Option<String>,
    pub amount: Option<Decimal>,
    pub amount_paid: Option<Decimal>,
    pub amount_to_be_delivered: Option<Decimal>,
    /// Voucher (B.P.) issued on this order
    pub voucher: Option<Decimal>,
    /// Voucher amount paid back (B.P.P.)
    pub voucher_paid: Option<Decimal>,
    /// Order date (Unix millis)
    pub date_ordered: Option<i64>,
    pub card_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub user_id: i64,
    #[serde(default)]
    pub deliveries: Vec<Delivery>,
}

impl Order {
    /// Sum of all deliveries recorded against this order
    pub fn total_delivered(&self) -> Decimal {
        self.deliveries
            .iter()
            .map(|d| d.amount_delivered.unwrap_or_default())
            .sum()
    }
}

/// Order row for extension-wide listings (orders page)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderDetail {
    #[serde(flatten)]
    pub order: Order,
    pub type_label: String,
    pub total_delivered: Decimal,
    pub customer_number: Option<String>,
    pub user_name: String,
}

/// Create order payload (`POST /api/order`)
///
/// Field names follow the order form.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderCreate {
    #[serde(rename = "type", default)]
    pub order_type: OrderType,
    #[serde(rename = "cardid", default)]
    pub card_id: Option<i64>,
    #[serde(rename = "customerid", default)]
    pub customer_id: Option<i64>,
    #[serde(rename = "userid", default)]
    pub user_id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Decimal,
    #[serde(rename = "amountpaid", default)]
    pub amount_paid: Decimal,
    /// Defaults to `amount - amountpaid` when absent
    #[serde(default)]
    pub voucher: Option<Decimal>,
    #[serde(rename = "voucherpaid", default)]
    pub voucher_paid: Decimal,
    /// Amount to deliver (cash sales and losses)
    #[serde(rename = "amountdelivered", default)]
    pub amount_delivered: Decimal,
    /// ISO 8601 date or datetime, defaults to now
    #[serde(rename = "dateordered", default)]
    pub date_ordered: Option<String>,
}

/// Create order response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreated {
    #[serde(rename = "orderId")]
    pub order_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_tag_is_burned() {
        assert_eq!(OrderType::from_tag("BURNED"), OrderType::Burned);
        assert_eq!(OrderType::from_tag("LOSS"), OrderType::Burned);
        let parsed: OrderType = serde_json::from_str("\"SOMETHING_ELSE\"").unwrap();
        assert_eq!(parsed, OrderType::Burned);
    }

    #[test]
    fn test_tags_are_stable() {
        for t in OrderType::ALL {
            assert_eq!(OrderType::from_tag(t.as_tag()), t);
        }
        assert_eq!(OrderType::CashSale.label(), "Vente cash");
        assert!(!OrderType::Donation.expects_payment());
    }

    #[test]
    fn test_order_create_accepts_form_body() {
        let body = serde_json::json!({
            "cardid": 7,
            "amount": 100,
            "amountpaid": 60,
            "voucherpaid": 0,
            "customerid": 3,
            "type": "ORDER",
            "userid": 1,
            "dateordered": "2024-03-14T10:00:00.000Z"
        });
        let create: OrderCreate = serde_json::from_value(body).unwrap();
        assert_eq!(create.card_id, Some(7));
        assert_eq!(create.amount, Decimal::from(100));
        assert_eq!(create.voucher, None);
        assert_eq!(create.order_type, OrderType::Order);
    }
}
