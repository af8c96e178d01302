//! Card Repository
//!
//! Cards form an append-only chain per customer. The only state changes are
//! `OPEN -> CLOSED` (always paired with opening the successor) and
//! `UNPAID -> PAID`.

use super::{RepoError, RepoResult, order};
use shared::models::{Card, CardWithOrders};
use sqlx::{SqliteConnection, SqlitePool};

const CARD_SELECT: &str = "SELECT id, card_number, card_status, payment_status, customer_id, extension_id, date_created FROM card";

/// Outcome of [`close_and_succeed`]
#[derive(Debug, Clone)]
pub struct ClosedCard {
    pub closed: Card,
    pub successor: Card,
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Card>> {
    let sql = format!("{} WHERE id = ?", CARD_SELECT);
    let card = sqlx::query_as::<_, Card>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(card)
}

/// The customer's current (open) card
pub async fn find_open_by_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<Option<Card>> {
    let sql = format!(
        "{} WHERE customer_id = ? AND card_status = 'OPEN' LIMIT 1",
        CARD_SELECT
    );
    let card = sqlx::query_as::<_, Card>(&sql)
        .bind(customer_id)
        .fetch_optional(pool)
        .await?;
    Ok(card)
}

/// Card with its orders (newest first)
pub async fn find_with_orders(pool: &SqlitePool, id: i64) -> RepoResult<Option<CardWithOrders>> {
    match find_by_id(pool, id).await? {
        Some(card) => Ok(attach_orders(pool, vec![card]).await?.pop()),
        None => Ok(None),
    }
}

/// All cards of a customer with orders, card number descending
pub async fn find_by_customer(pool: &SqlitePool, customer_id: i64) -> RepoResult<Vec<CardWithOrders>> {
    let sql = format!(
        "{} WHERE customer_id = ? ORDER BY card_number DESC",
        CARD_SELECT
    );
    let cards = sqlx::query_as::<_, Card>(&sql)
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
    attach_orders(pool, cards).await
}

/// All cards of an extension with orders, card number descending
pub async fn find_by_extension(
    pool: &SqlitePool,
    extension_id: i64,
) -> RepoResult<Vec<CardWithOrders>> {
    let sql = format!(
        "{} WHERE extension_id = ? ORDER BY card_number DESC, id DESC",
        CARD_SELECT
    );
    let cards = sqlx::query_as::<_, Card>(&sql)
        .bind(extension_id)
        .fetch_all(pool)
        .await?;
    attach_orders(pool, cards).await
}

async fn attach_orders(pool: &SqlitePool, cards: Vec<Card>) -> RepoResult<Vec<CardWithOrders>> {
    let ids: Vec<i64> = cards.iter().map(|c| c.id).collect();
    let mut orders = order::find_by_cards(pool, &ids).await?;
    Ok(cards
        .into_iter()
        .map(|card| CardWithOrders {
            orders: orders.remove(&card.id).unwrap_or_default(),
            card,
        })
        .collect())
}

/// Insert an OPEN card on an existing connection / transaction
pub(crate) async fn insert_open(
    conn: &mut SqliteConnection,
    card_number: i64,
    customer_id: i64,
    extension_id: i64,
) -> RepoResult<Card> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();
    sqlx::query(
        "INSERT INTO card (id, card_number, card_status, payment_status, customer_id, extension_id, date_created) VALUES (?1, ?2, 'OPEN', 'UNPAID', ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(card_number)
    .bind(customer_id)
    .bind(extension_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let sql = format!("{} WHERE id = ?", CARD_SELECT);
    let card = sqlx::query_as::<_, Card>(&sql)
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(card)
}

/// Close a card and open its successor (`card_number + 1`) atomically
///
/// Both writes share one transaction: if opening the successor fails the
/// close is rolled back and the card stays OPEN. The close is guarded on
/// `card_status = 'OPEN'` and `(customer_id, card_number)` is unique, so of
/// two concurrent closures of the same card only one can succeed.
pub async fn close_and_succeed(pool: &SqlitePool, id: i64) -> RepoResult<ClosedCard> {
    let mut tx = pool.begin().await?;

    // Write first so the transaction holds the write lock before reading
    let rows = sqlx::query("UPDATE card SET card_status = 'CLOSED' WHERE id = ? AND card_status = 'OPEN'")
        .bind(id)
        .execute(&mut *tx)
        .await?;

    let sql = format!("{} WHERE id = ?", CARD_SELECT);
    let closed = sqlx::query_as::<_, Card>(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Card {id} not found")))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::Conflict(format!(
            "Card {} is already closed",
            closed.card_number
        )));
    }

    let next_number = closed.card_number + 1;
    let successor = insert_open(&mut tx, next_number, closed.customer_id, closed.extension_id)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => RepoError::Duplicate(format!(
                "Card {} already exists for customer {}",
                next_number, closed.customer_id
            )),
            other => other,
        })?;

    tx.commit().await?;

    Ok(ClosedCard { closed, successor })
}

/// Mark a card as paid (idempotent)
pub async fn mark_paid(pool: &SqlitePool, id: i64) -> RepoResult<Card> {
    let rows = sqlx::query("UPDATE card SET payment_status = 'PAID' WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Card {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Card {id} not found")))
}
