//! Year / month aggregation
//!
//! Orders are bucketed by the calendar date of `date_ordered` in the
//! business timezone. Orders without a usable date are skipped and counted.

use std::collections::BTreeMap;

use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use shared::models::{Order, OrderType};

use crate::money::or_zero;
use crate::utils::time::year_month;

/// Count and ordered amount for one order type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypeBreakdown {
    pub count: u64,
    pub amount: Decimal,
}

/// Sums over one bucket (a month, a year or everything)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodTotals {
    pub order_count: u64,
    pub amount: Decimal,
    /// Amount of entries the customer pays for (donations and losses excluded)
    pub amount_expected: Decimal,
    pub amount_paid: Decimal,
    pub voucher: Decimal,
    pub voucher_paid: Decimal,
    pub amount_to_be_delivered: Decimal,
    /// Sum of the deliveries recorded against the bucket's orders
    pub amount_delivered: Decimal,
    pub by_type: BTreeMap<OrderType, TypeBreakdown>,
}

impl PeriodTotals {
    pub fn add_order(&mut self, order: &Order) {
        let amount = or_zero(order.amount);

        self.order_count += 1;
        self.amount += amount;
        if order.order_type.expects_payment() {
            self.amount_expected += amount;
        }
        self.amount_paid += or_zero(order.amount_paid);
        self.voucher += or_zero(order.voucher);
        self.voucher_paid += or_zero(order.voucher_paid);
        self.amount_to_be_delivered += or_zero(order.amount_to_be_delivered);
        self.amount_delivered += order.total_delivered();

        let entry = self.by_type.entry(order.order_type).or_default();
        entry.count += 1;
        entry.amount += amount;
    }

    pub fn merge(&mut self, other: &PeriodTotals) {
        self.order_count += other.order_count;
        self.amount += other.amount;
        self.amount_expected += other.amount_expected;
        self.amount_paid += other.amount_paid;
        self.voucher += other.voucher;
        self.voucher_paid += other.voucher_paid;
        self.amount_to_be_delivered += other.amount_to_be_delivered;
        self.amount_delivered += other.amount_delivered;
        for (order_type, breakdown) in &other.by_type {
            let entry = self.by_type.entry(*order_type).or_default();
            entry.count += breakdown.count;
            entry.amount += breakdown.amount;
        }
    }

    /// Count for one type (0 when absent)
    pub fn count_of(&self, order_type: OrderType) -> u64 {
        self.by_type.get(&order_type).map_or(0, |b| b.count)
    }
}

/// One year: its own totals plus the month buckets (1..=12)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearSummary {
    pub totals: PeriodTotals,
    pub months: BTreeMap<u32, PeriodTotals>,
}

/// Year → month report, ascending by year then month
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PeriodReport {
    pub years: BTreeMap<i32, YearSummary>,
    /// Orders left out because they have no date (or an unmappable one)
    pub skipped_undated: u64,
}

impl PeriodReport {
    /// Totals across every bucket
    pub fn grand_total(&self) -> PeriodTotals {
        let mut total = PeriodTotals::default();
        for year in self.years.values() {
            total.merge(&year.totals);
        }
        total
    }

    pub fn is_empty(&self) -> bool {
        self.years.is_empty()
    }
}

/// Group orders by year and month of `date_ordered` in `tz`
pub fn aggregate_by_period(orders: &[Order], tz: Tz) -> PeriodReport {
    let mut report = PeriodReport::default();

    for order in orders {
        let Some((year, month)) = order.date_ordered.and_then(|ms| year_month(ms, tz)) else {
            report.skipped_undated += 1;
            continue;
        };

        let summary = report.years.entry(year).or_default();
        summary.totals.add_order(order);
        summary.months.entry(month).or_default().add_order(order);
    }

    if report.skipped_undated > 0 {
        tracing::debug!(
            skipped = report.skipped_undated,
            "Orders without a date left out of period report"
        );
    }

    report
}
