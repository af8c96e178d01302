//! Customer Repository

use super::{RepoError, RepoResult, card};
use shared::models::{Customer, CustomerCreate, CustomerListItem, CustomerWithCards};
use sqlx::SqlitePool;

const CUSTOMER_SELECT: &str =
    "SELECT id, name, customer_number, extension_id, date_created FROM customer";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Customer>> {
    let sql = format!("{} WHERE id = ?", CUSTOMER_SELECT);
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(customer)
}

/// Customers of an extension with their current open card, by name
pub async fn find_all(pool: &SqlitePool, extension_id: i64) -> RepoResult<Vec<CustomerListItem>> {
    let customers = sqlx::query_as::<_, CustomerListItem>(
        "SELECT c.id, c.name, c.customer_number, k.id AS current_card_id FROM customer c LEFT JOIN card k ON k.customer_id = c.id AND k.card_status = 'OPEN' WHERE c.extension_id = ? ORDER BY c.name COLLATE NOCASE, c.id",
    )
    .bind(extension_id)
    .fetch_all(pool)
    .await?;
    Ok(customers)
}

/// Customer with every card and the orders on each
pub async fn find_with_cards(pool: &SqlitePool, id: i64) -> RepoResult<Option<CustomerWithCards>> {
    let Some(customer) = find_by_id(pool, id).await? else {
        return Ok(None);
    };
    let cards = card::find_by_customer(pool, id).await?;
    Ok(Some(CustomerWithCards { customer, cards }))
}

/// Create a customer together with card #1
pub async fn create(
    pool: &SqlitePool,
    extension_id: i64,
    data: CustomerCreate,
) -> RepoResult<Customer> {
    let id = shared::util::snowflake_id();
    let now = shared::util::now_millis();

    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO customer (id, name, customer_number, extension_id, date_created) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.customer_number)
    .bind(extension_id)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    card::insert_open(&mut tx, 1, id, extension_id).await?;

    let sql = format!("{} WHERE id = ?", CUSTOMER_SELECT);
    let customer = sqlx::query_as::<_, Customer>(&sql)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create customer".into()))?;

    tx.commit().await?;
    Ok(customer)
}
