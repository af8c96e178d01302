//! User Repository

use super::{RepoError, RepoResult};
use shared::models::{User, UserRole};
use sqlx::SqlitePool;

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, role, extension_id FROM user WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn create(
    pool: &SqlitePool,
    name: &str,
    role: UserRole,
    extension_id: i64,
) -> RepoResult<User> {
    let id = shared::util::snowflake_id();
    sqlx::query("INSERT INTO user (id, name, role, extension_id) VALUES (?1, ?2, ?3, ?4)")
        .bind(id)
        .bind(name)
        .bind(role)
        .bind(extension_id)
        .execute(pool)
        .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}
