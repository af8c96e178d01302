//! Delivery Repository

use std::collections::HashMap;

use super::{RepoError, RepoResult};
use crate::money;
use rust_decimal::Decimal;
use shared::models::Delivery;
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct DeliveryRow {
    id: i64,
    order_id: i64,
    amount_delivered: Option<String>,
    date_delivered: Option<i64>,
}

impl From<DeliveryRow> for Delivery {
    fn from(row: DeliveryRow) -> Self {
        Self {
            id: row.id,
            order_id: row.order_id,
            amount_delivered: money::from_stored(
                row.amount_delivered.as_deref(),
                "delivery.amount_delivered",
            ),
            date_delivered: row.date_delivered,
        }
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Delivery>> {
    let row = sqlx::query_as::<_, DeliveryRow>(
        "SELECT id, order_id, amount_delivered, date_delivered FROM delivery WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Delivery::from))
}

pub async fn find_by_order(pool: &SqlitePool, order_id: i64) -> RepoResult<Vec<Delivery>> {
    let rows = sqlx::query_as::<_, DeliveryRow>(
        "SELECT id, order_id, amount_delivered, date_delivered FROM delivery WHERE order_id = ? ORDER BY date_delivered DESC, id DESC",
    )
    .bind(order_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Delivery::from).collect())
}

/// All deliveries of an extension's orders, grouped by order id
pub async fn find_by_extension(
    pool: &SqlitePool,
    extension_id: i64,
) -> RepoResult<HashMap<i64, Vec<Delivery>>> {
    let rows = sqlx::query_as::<_, DeliveryRow>(
        "SELECT d.id, d.order_id, d.amount_delivered, d.date_delivered FROM delivery d JOIN orders o ON d.order_id = o.id JOIN user u ON o.user_id = u.id WHERE u.extension_id = ? ORDER BY d.date_delivered DESC, d.id DESC",
    )
    .bind(extension_id)
    .fetch_all(pool)
    .await?;

    let mut grouped: HashMap<i64, Vec<Delivery>> = HashMap::new();
    for row in rows {
        grouped.entry(row.order_id).or_default().push(row.into());
    }
    Ok(grouped)
}

pub async fn create(
    pool: &SqlitePool,
    order_id: i64,
    amount_delivered: Decimal,
    date_delivered: i64,
) -> RepoResult<Delivery> {
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO delivery (id, order_id, amount_delivered, date_delivered) VALUES (?1, ?2, ?3, ?4)",
    )
    .bind(id)
    .bind(order_id)
    .bind(money::to_stored(amount_delivered))
    .bind(date_delivered)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create delivery".into()))
}
