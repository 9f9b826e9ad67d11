use sqlx::PgPool;

use crate::db::models::Admin;

const COLUMNS: &str = "id, username, hashed_password, full_name, is_active, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as::<_, Admin>(&format!("SELECT {COLUMNS} FROM admins WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_username(
    pool: &PgPool,
    username: &str,
) -> Result<Option<Admin>, sqlx::Error> {
    sqlx::query_as::<_, Admin>(&format!("SELECT {COLUMNS} FROM admins WHERE username = $1"))
        .bind(username)
        .fetch_optional(pool)
        .await
}

pub(crate) struct CreateAdmin<'a> {
    pub(crate) id: &'a str,
    pub(crate) username: &'a str,
    pub(crate) hashed_password: String,
    pub(crate) full_name: &'a str,
    pub(crate) is_active: bool,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateAdmin<'_>) -> Result<Admin, sqlx::Error> {
    sqlx::query_as::<_, Admin>(&format!(
        "INSERT INTO admins (
            id, username, hashed_password, full_name, is_active, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}",
    ))
    .bind(params.id)
    .bind(params.username)
    .bind(params.hashed_password)
    .bind(params.full_name)
    .bind(params.is_active)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

/// Resets the password hash and re-enables the account.
pub(crate) async fn restore(
    pool: &PgPool,
    id: &str,
    hashed_password: &str,
    updated_at: time::PrimitiveDateTime,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE admins SET hashed_password = $1, is_active = TRUE, updated_at = $2 WHERE id = $3",
    )
    .bind(hashed_password)
    .bind(updated_at)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(())
}
