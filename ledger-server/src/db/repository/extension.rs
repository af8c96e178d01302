//! Extension Repository

use super::{RepoError, RepoResult};
use crate::money;
use rust_decimal::Decimal;
use shared::models::Extension;
use sqlx::SqlitePool;

#[derive(sqlx::FromRow)]
struct ExtensionRow {
    id: i64,
    name: String,
    rate: Option<String>,
}

impl From<ExtensionRow> for Extension {
    fn from(row: ExtensionRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            rate: money::from_stored(row.rate.as_deref(), "extension.rate"),
        }
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Extension>> {
    let row = sqlx::query_as::<_, ExtensionRow>("SELECT id, name, rate FROM extension WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(Extension::from))
}

pub async fn create(pool: &SqlitePool, name: &str, rate: Option<Decimal>) -> RepoResult<Extension> {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO extension (id, name, rate) VALUES (?1, ?2, ?3)")
        .bind(id)
        .bind(name)
        .bind(rate.map(money::to_stored))
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create extension".into()))
}
