//! Global card metrics
//!
//! Per-card and extension-wide sums over cards with their nested orders.
//! Deliveries are not considered. The owed base (`amount`) is exposed as is;
//! commission is applied by the caller with the extension rate.

use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{CardStatus, CardWithOrders, Order, PaymentStatus};

use crate::money::or_zero;

/// Sign of a balance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BalanceStanding {
    /// Customer still owes money
    Due,
    #[default]
    Settled,
    /// Customer paid more than ordered
    Credit,
}

impl BalanceStanding {
    pub fn of(balance: Decimal) -> Self {
        if balance > Decimal::ZERO {
            BalanceStanding::Due
        } else if balance < Decimal::ZERO {
            BalanceStanding::Credit
        } else {
            BalanceStanding::Settled
        }
    }
}

/// Order sums and balance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardTotals {
    pub order_count: u64,
    /// Total ordered, the owed base for commission
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub voucher: Decimal,
    pub voucher_paid: Decimal,
    /// `amount - amount_paid`, negative when overpaid
    pub balance_due: Decimal,
    pub standing: BalanceStanding,
}

impl CardTotals {
    fn add_order(&mut self, order: &Order) {
        self.order_count += 1;
        self.amount += or_zero(order.amount);
        self.amount_paid += or_zero(order.amount_paid);
        self.voucher += or_zero(order.voucher);
        self.voucher_paid += or_zero(order.voucher_paid);
        self.settle();
    }

    fn merge(&mut self, other: &CardTotals) {
        self.order_count += other.order_count;
        self.amount += other.amount;
        self.amount_paid += other.amount_paid;
        self.voucher += other.voucher;
        self.voucher_paid += other.voucher_paid;
        self.settle();
    }

    fn settle(&mut self) {
        self.balance_due = self.amount - self.amount_paid;
        self.standing = BalanceStanding::of(self.balance_due);
    }
}

/// One card's summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardSummary {
    pub card_id: i64,
    pub card_number: i64,
    pub customer_id: i64,
    pub card_status: CardStatus,
    pub payment_status: PaymentStatus,
    #[serde(flatten)]
    pub totals: CardTotals,
}

/// Card counts by status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub open: u64,
    pub closed: u64,
    pub paid: u64,
    pub unpaid: u64,
}

/// Metrics over a set of cards
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CardMetrics {
    /// Same order as the input
    pub cards: Vec<CardSummary>,
    pub totals: CardTotals,
    pub status: StatusCounts,
}

pub fn summarize_card(card: &CardWithOrders) -> CardSummary {
    let mut totals = CardTotals::default();
    for order in &card.orders {
        totals.add_order(order);
    }
    CardSummary {
        card_id: card.card.id,
        card_number: card.card.card_number,
        customer_id: card.card.customer_id,
        card_status: card.card.card_status,
        payment_status: card.card.payment_status,
        totals,
    }
}

pub fn aggregate_cards(cards: &[CardWithOrders]) -> CardMetrics {
    let mut metrics = CardMetrics::default();

    for card in cards {
        let summary = summarize_card(card);
        metrics.totals.merge(&summary.totals);

        match summary.card_status {
            CardStatus::Open => metrics.status.open += 1,
            CardStatus::Closed => metrics.status.closed += 1,
        }
        match summary.payment_status {
            PaymentStatus::Paid => metrics.status.paid += 1,
            PaymentStatus::Unpaid => metrics.status.unpaid += 1,
        }

        metrics.cards.push(summary);
    }

    metrics
}
