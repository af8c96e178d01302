//! Order Repository
//!
//! Orders are written once and never deleted. Money columns are decimal
//! TEXT; rows are decoded through [`OrderRow`].

use std::collections::HashMap;

use super::{RepoError, RepoResult, delivery};
use crate::money;
use rust_decimal::Decimal;
use shared::models::{Delivery, Order, OrderDetail, OrderType};
use sqlx::SqlitePool;

const ORDER_SELECT: &str = "SELECT o.id, o.type, o.name, o.amount, o.amount_paid, o.amount_to_be_delivered, o.voucher, o.voucher_paid, o.date_ordered, o.card_id, o.customer_id, o.user_id FROM orders o";

const ORDER_DETAIL_SELECT: &str = "SELECT o.id, o.type, o.name, o.amount, o.amount_paid, o.amount_to_be_delivered, o.voucher, o.voucher_paid, o.date_ordered, o.card_id, o.customer_id, o.user_id, c.customer_number, u.name AS user_name FROM orders o JOIN user u ON o.user_id = u.id LEFT JOIN customer c ON o.customer_id = c.id";

#[derive(sqlx::FromRow)]
pub(crate) struct OrderRow {
    id: i64,
    #[sqlx(rename = "type")]
    order_type: String,
    name: Option<String>,
    amount: Option<String>,
    amount_paid: Option<String>,
    amount_to_be_delivered: Option<String>,
    voucher: Option<String>,
    voucher_paid: Option<String>,
    date_ordered: Option<i64>,
    card_id: Option<i64>,
    customer_id: Option<i64>,
    user_id: i64,
}

impl OrderRow {
    pub(crate) fn into_order(self, deliveries: Vec<Delivery>) -> Order {
        Order {
            id: self.id,
            order_type: OrderType::from_tag(&self.order_type),
            name: self.name,
            amount: money::from_stored(self.amount.as_deref(), "orders.amount"),
            amount_paid: money::from_stored(self.amount_paid.as_deref(), "orders.amount_paid"),
            amount_to_be_delivered: money::from_stored(
                self.amount_to_be_delivered.as_deref(),
                "orders.amount_to_be_delivered",
            ),
            voucher: money::from_stored(self.voucher.as_deref(), "orders.voucher"),
            voucher_paid: money::from_stored(self.voucher_paid.as_deref(), "orders.voucher_paid"),
            date_ordered: self.date_ordered,
            card_id: self.card_id,
            customer_id: self.customer_id,
            user_id: self.user_id,
            deliveries,
        }
    }
}

#[derive(sqlx::FromRow)]
struct OrderDetailRow {
    #[sqlx(flatten)]
    order: OrderRow,
    customer_number: Option<String>,
    user_name: String,
}

/// Order ready to insert (handler has resolved defaults and dates)
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_type: OrderType,
    pub name: Option<String>,
    pub amount: Decimal,
    pub amount_paid: Decimal,
    pub voucher: Decimal,
    pub voucher_paid: Decimal,
    pub amount_to_be_delivered: Decimal,
    pub date_ordered: i64,
    pub card_id: Option<i64>,
    pub customer_id: Option<i64>,
    pub user_id: i64,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("{} WHERE o.id = ?", ORDER_SELECT);
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    match row {
        Some(row) => {
            let deliveries = delivery::find_by_order(pool, id).await?;
            Ok(Some(row.into_order(deliveries)))
        }
        None => Ok(None),
    }
}

/// Extension that owns an order (through its recording user)
pub async fn find_extension_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<i64>> {
    let extension_id = sqlx::query_scalar::<_, i64>(
        "SELECT u.extension_id FROM orders o JOIN user u ON o.user_id = u.id WHERE o.id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(extension_id)
}

/// Orders of the given cards, grouped by card id, newest first
///
/// Deliveries are not loaded (card metrics only need order amounts).
pub async fn find_by_cards(
    pool: &SqlitePool,
    card_ids: &[i64],
) -> RepoResult<HashMap<i64, Vec<Order>>> {
    let mut grouped: HashMap<i64, Vec<Order>> = HashMap::new();
    if card_ids.is_empty() {
        return Ok(grouped);
    }

    let placeholders = vec!["?"; card_ids.len()].join(", ");
    let sql = format!(
        "{} WHERE o.card_id IN ({}) ORDER BY o.date_ordered DESC, o.id DESC",
        ORDER_SELECT, placeholders
    );
    let mut query = sqlx::query_as::<_, OrderRow>(&sql);
    for id in card_ids {
        query = query.bind(id);
    }

    for row in query.fetch_all(pool).await? {
        if let Some(card_id) = row.card_id {
            grouped
                .entry(card_id)
                .or_default()
                .push(row.into_order(Vec::new()));
        }
    }
    Ok(grouped)
}

/// Extension-wide orders with deliveries, customer number and user name,
/// newest first
pub async fn find_details_by_extension(
    pool: &SqlitePool,
    extension_id: i64,
    limit: Option<i64>,
    offset: i64,
) -> RepoResult<Vec<OrderDetail>> {
    let sql = format!(
        "{} WHERE u.extension_id = ? ORDER BY o.date_ordered DESC, o.id DESC LIMIT ? OFFSET ?",
        ORDER_DETAIL_SELECT
    );
    let rows = sqlx::query_as::<_, OrderDetailRow>(&sql)
        .bind(extension_id)
        // SQLite: negative LIMIT means no limit
        .bind(limit.unwrap_or(-1))
        .bind(offset)
        .fetch_all(pool)
        .await?;

    let mut deliveries = delivery::find_by_extension(pool, extension_id).await?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let order_deliveries = deliveries.remove(&row.order.id).unwrap_or_default();
            let order = row.order.into_order(order_deliveries);
            OrderDetail {
                type_label: order.order_type.label().to_string(),
                total_delivered: order.total_delivered(),
                customer_number: row.customer_number,
                user_name: row.user_name,
                order,
            }
        })
        .collect())
}

/// Extension-wide orders with deliveries (aggregation input)
pub async fn find_by_extension(pool: &SqlitePool, extension_id: i64) -> RepoResult<Vec<Order>> {
    let details = find_details_by_extension(pool, extension_id, None, 0).await?;
    Ok(details.into_iter().map(|d| d.order).collect())
}

/// Insert an order
///
/// Runs in one transaction with the card check so an order can never land
/// on a card that was closed concurrently.
pub async fn create(pool: &SqlitePool, data: NewOrder) -> RepoResult<i64> {
    let mut tx = pool.begin().await?;

    if let Some(card_id) = data.card_id {
        let card: Option<(String, i64, i64)> = sqlx::query_as(
            "SELECT card_status, customer_id, card_number FROM card WHERE id = ?",
        )
        .bind(card_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (status, customer_id, card_number) =
            card.ok_or_else(|| RepoError::NotFound(format!("Card {card_id} not found")))?;
        if status != "OPEN" {
            return Err(RepoError::Conflict(format!(
                "Card {card_number} is closed and cannot take new orders"
            )));
        }
        if let Some(expected) = data.customer_id
            && expected != customer_id
        {
            return Err(RepoError::Validation(format!(
                "Card {card_id} does not belong to customer {expected}"
            )));
        }
    }

    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO orders (id, type, name, amount, amount_paid, amount_to_be_delivered, voucher, voucher_paid, date_ordered, card_id, customer_id, user_id) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )
    .bind(id)
    .bind(data.order_type.as_tag())
    .bind(&data.name)
    .bind(money::to_stored(data.amount))
    .bind(money::to_stored(data.amount_paid))
    .bind(money::to_stored(data.amount_to_be_delivered))
    .bind(money::to_stored(data.voucher))
    .bind(money::to_stored(data.voucher_paid))
    .bind(data.date_ordered)
    .bind(data.card_id)
    .bind(data.customer_id)
    .bind(data.user_id)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;
    Ok(id)
}
