use super::*;
use chrono::{TimeZone, Utc};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use shared::models::{Card, CardStatus, CardWithOrders, Delivery, Order, OrderType, PaymentStatus};
use std::str::FromStr;

const TZ: Tz = chrono_tz::Africa::Kinshasa;

fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> i64 {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap().timestamp_millis()
}

fn order(id: i64, order_type: OrderType, amount: &str, paid: &str, date: Option<i64>) -> Order {
    Order {
        id,
        order_type,
        name: None,
        amount: Some(dec(amount)),
        amount_paid: Some(dec(paid)),
        amount_to_be_delivered: None,
        voucher: None,
        voucher_paid: None,
        date_ordered: date,
        card_id: None,
        customer_id: None,
        user_id: 1,
        deliveries: Vec::new(),
    }
}

fn card(id: i64, number: i64, status: CardStatus, payment: PaymentStatus, orders: Vec<Order>) -> CardWithOrders {
    CardWithOrders {
        card: Card {
            id,
            card_number: number,
            card_status: status,
            payment_status: payment,
            customer_id: 1,
            extension_id: 1,
            date_created: 0,
        },
        orders,
    }
}

// ========== Year / month ==========

#[test]
fn test_period_empty_input() {
    let report = aggregate_by_period(&[], TZ);
    assert!(report.is_empty());
    assert_eq!(report.skipped_undated, 0);
    assert_eq!(report.grand_total(), PeriodTotals::default());
}

#[test]
fn test_period_buckets_ascending() {
    let orders = vec![
        order(1, OrderType::Order, "10", "0", Some(at(2024, 3, 5, 10))),
        order(2, OrderType::Order, "20", "5", Some(at(2023, 11, 2, 10))),
        order(3, OrderType::Order, "30", "30", Some(at(2024, 1, 20, 10))),
        order(4, OrderType::Order, "40", "0", Some(at(2024, 3, 28, 10))),
    ];
    let report = aggregate_by_period(&orders, TZ);

    let years: Vec<i32> = report.years.keys().copied().collect();
    assert_eq!(years, vec![2023, 2024]);

    let y2024 = &report.years[&2024];
    let months: Vec<u32> = y2024.months.keys().copied().collect();
    assert_eq!(months, vec![1, 3]);
    assert_eq!(y2024.months[&3].order_count, 2);
    assert_eq!(y2024.months[&3].amount, dec("50"));
    assert_eq!(y2024.totals.amount, dec("80"));
    assert_eq!(y2024.totals.amount_paid, dec("30"));
}

#[test]
fn test_period_conserves_dated_sums() {
    let mut orders = Vec::new();
    let mut expected_amount = Decimal::ZERO;
    let mut expected_paid = Decimal::ZERO;
    for i in 0..36i64 {
        let month = (i % 12) as u32 + 1;
        let year = 2022 + (i / 12) as i32;
        let amount = format!("{}.{:02}", i * 7 + 1, i % 100);
        let paid = format!("{}.5", i);
        expected_amount += dec(&amount);
        expected_paid += dec(&paid);
        orders.push(order(i, OrderType::Order, &amount, &paid, Some(at(year, month, 15, 12))));
    }
    // Undated orders must not leak into any bucket
    orders.push(order(100, OrderType::Order, "999", "1", None));
    orders.push(order(101, OrderType::CashSale, "888", "2", None));

    let report = aggregate_by_period(&orders, TZ);
    let total = report.grand_total();

    assert_eq!(report.skipped_undated, 2);
    assert_eq!(total.order_count, 36);
    assert_eq!(total.amount, expected_amount);
    assert_eq!(total.amount_paid, expected_paid);

    let month_sum: Decimal = report
        .years
        .values()
        .flat_map(|y| y.months.values())
        .map(|m| m.amount)
        .sum();
    assert_eq!(month_sum, expected_amount);
}

#[test]
fn test_period_keeps_fractional_cents() {
    let orders = vec![
        order(1, OrderType::Order, "0.005", "0", Some(at(2024, 6, 1, 12))),
        order(2, OrderType::Order, "0.005", "0", Some(at(2024, 6, 2, 12))),
        order(3, OrderType::Order, "10.333", "0", Some(at(2024, 6, 3, 12))),
    ];
    let report = aggregate_by_period(&orders, TZ);
    assert_eq!(report.years[&2024].months[&6].amount, dec("10.343"));
}

#[test]
fn test_period_uses_business_timezone() {
    // 23:30 UTC on Jan 31 is already Feb 1 in Kinshasa (UTC+1)
    let ms = Utc.with_ymd_and_hms(2024, 1, 31, 23, 30, 0).unwrap().timestamp_millis();
    let orders = vec![order(1, OrderType::Order, "10", "0", Some(ms))];

    let local = aggregate_by_period(&orders, TZ);
    assert!(local.years[&2024].months.contains_key(&2));

    let utc = aggregate_by_period(&orders, chrono_tz::UTC);
    assert!(utc.years[&2024].months.contains_key(&1));
}

#[test]
fn test_period_counts_types_in_same_month() {
    let orders = vec![
        order(1, OrderType::CashSale, "15", "15", Some(at(2024, 5, 2, 9))),
        order(2, OrderType::Order, "100", "60", Some(at(2024, 5, 3, 9))),
        order(3, OrderType::Order, "50", "50", Some(at(2024, 5, 20, 9))),
        order(4, OrderType::Donation, "7", "0", Some(at(2024, 5, 21, 9))),
    ];
    let report = aggregate_by_period(&orders, TZ);
    let may = &report.years[&2024].months[&5];

    assert_eq!(may.order_count, 4);
    assert_eq!(may.count_of(OrderType::Order), 2);
    assert_eq!(may.count_of(OrderType::CashSale), 1);
    assert_eq!(may.count_of(OrderType::Donation), 1);
    assert_eq!(may.count_of(OrderType::Charge), 0);
    assert_eq!(may.by_type[&OrderType::Order].amount, dec("150"));
    assert_eq!(may.by_type[&OrderType::CashSale].amount, dec("15"));
}

#[test]
fn test_period_expected_amount_excludes_losses() {
    let orders = vec![
        order(1, OrderType::Order, "100", "60", Some(at(2024, 6, 2, 9))),
        order(2, OrderType::CashSale, "15", "15", Some(at(2024, 6, 3, 9))),
        order(3, OrderType::Donation, "7", "0", Some(at(2024, 6, 4, 9))),
        order(4, OrderType::Damage, "3", "0", Some(at(2024, 7, 1, 9))),
    ];
    let report = aggregate_by_period(&orders, TZ);
    let year = &report.years[&2024];

    assert_eq!(year.months[&6].amount, dec("122"));
    assert_eq!(year.months[&6].amount_expected, dec("115"));
    assert_eq!(year.months[&7].amount_expected, Decimal::ZERO);
    assert_eq!(year.totals.amount_expected, dec("115"));
    assert_eq!(report.grand_total().amount_expected, dec("115"));
}

#[test]
fn test_period_sums_deliveries_and_treats_missing_as_zero() {
    let mut delivered = order(1, OrderType::CashSale, "100", "100", Some(at(2024, 8, 1, 9)));
    delivered.amount_to_be_delivered = Some(dec("100"));
    delivered.deliveries = vec![
        Delivery { id: 1, order_id: 1, amount_delivered: Some(dec("40")), date_delivered: None },
        Delivery { id: 2, order_id: 1, amount_delivered: None, date_delivered: None },
        Delivery { id: 3, order_id: 1, amount_delivered: Some(dec("25.5")), date_delivered: None },
    ];

    let mut sparse = order(2, OrderType::Order, "0", "0", Some(at(2024, 8, 2, 9)));
    sparse.amount = None;
    sparse.amount_paid = None;
    sparse.voucher = Some(dec("12"));
    sparse.voucher_paid = Some(dec("2"));

    let report = aggregate_by_period(&[delivered, sparse], TZ);
    let aug = &report.years[&2024].months[&8];

    assert_eq!(aug.amount, dec("100"));
    assert_eq!(aug.amount_delivered, dec("65.5"));
    assert_eq!(aug.amount_to_be_delivered, dec("100"));
    assert_eq!(aug.voucher, dec("12"));
    assert_eq!(aug.voucher_paid, dec("2"));
}

#[test]
fn test_period_is_deterministic() {
    let orders = vec![
        order(1, OrderType::Order, "12.5", "2", Some(at(2024, 2, 1, 9))),
        order(2, OrderType::Charge, "3", "3", Some(at(2023, 12, 1, 9))),
        order(3, OrderType::Damage, "8", "0", None),
    ];
    let first = aggregate_by_period(&orders, TZ);
    let second = aggregate_by_period(&orders, TZ);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

// ========== Card metrics ==========

#[test]
fn test_card_metrics_empty_input() {
    let metrics = aggregate_cards(&[]);
    assert!(metrics.cards.is_empty());
    assert_eq!(metrics.totals, CardTotals::default());
    assert_eq!(metrics.totals.standing, BalanceStanding::Settled);
    assert_eq!(metrics.status, StatusCounts::default());
}

#[test]
fn test_card_balance_due() {
    let c = card(
        1,
        1,
        CardStatus::Open,
        PaymentStatus::Unpaid,
        vec![
            order(1, OrderType::Order, "100", "60", Some(at(2024, 1, 1, 9))),
            order(2, OrderType::Order, "50", "50", Some(at(2024, 1, 2, 9))),
        ],
    );
    let summary = summarize_card(&c);
    assert_eq!(summary.totals.order_count, 2);
    assert_eq!(summary.totals.amount, dec("150"));
    assert_eq!(summary.totals.amount_paid, dec("110"));
    assert_eq!(summary.totals.balance_due, dec("40"));
    assert_eq!(summary.totals.standing, BalanceStanding::Due);
}

#[test]
fn test_card_overpaid_is_credit() {
    let c = card(
        1,
        3,
        CardStatus::Closed,
        PaymentStatus::Paid,
        vec![order(1, OrderType::Order, "80", "100", None)],
    );
    let summary = summarize_card(&c);
    assert_eq!(summary.totals.balance_due, dec("-20"));
    assert_eq!(summary.totals.standing, BalanceStanding::Credit);
}

#[test]
fn test_card_metrics_totals_and_status_counts() {
    let cards = vec![
        card(
            3,
            3,
            CardStatus::Open,
            PaymentStatus::Unpaid,
            vec![order(1, OrderType::Order, "100", "60", None)],
        ),
        card(
            2,
            2,
            CardStatus::Closed,
            PaymentStatus::Paid,
            vec![order(2, OrderType::Order, "50", "50", None)],
        ),
        card(1, 1, CardStatus::Closed, PaymentStatus::Unpaid, Vec::new()),
    ];
    let metrics = aggregate_cards(&cards);

    let numbers: Vec<i64> = metrics.cards.iter().map(|s| s.card_number).collect();
    assert_eq!(numbers, vec![3, 2, 1]);

    assert_eq!(metrics.totals.order_count, 2);
    assert_eq!(metrics.totals.amount, dec("150"));
    assert_eq!(metrics.totals.amount_paid, dec("110"));
    assert_eq!(metrics.totals.balance_due, dec("40"));
    assert_eq!(
        metrics.status,
        StatusCounts { open: 1, closed: 2, paid: 1, unpaid: 2 }
    );

    assert_eq!(metrics.cards[2].totals.standing, BalanceStanding::Settled);
    assert_eq!(aggregate_cards(&cards), metrics);
}

#[test]
fn test_card_summary_serializes_flat() {
    let c = card(9, 4, CardStatus::Open, PaymentStatus::Unpaid, vec![order(1, OrderType::Order, "10", "4", None)]);
    let json = serde_json::to_value(summarize_card(&c)).unwrap();
    assert_eq!(json["card_number"], 4);
    assert_eq!(json["card_status"], "OPEN");
    assert_eq!(json["standing"], "DUE");
    assert_eq!(json["balance_due"], "6");
}
