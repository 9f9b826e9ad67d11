use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Examinee;

pub(crate) const COLUMNS: &str =
    "id, name, last_name, middle_name, phone, created_at, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Examinee>, sqlx::Error> {
    sqlx::query_as::<_, Examinee>(&format!("SELECT {COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Exact, case-sensitive match on all three name parts. Newest registration first.
pub(crate) async fn find_by_full_name(
    pool: &PgPool,
    name: &str,
    last_name: &str,
    middle_name: &str,
) -> Result<Option<Examinee>, sqlx::Error> {
    sqlx::query_as::<_, Examinee>(&format!(
        "SELECT {COLUMNS} FROM users
         WHERE name = $1 AND last_name = $2 AND middle_name = $3
         ORDER BY created_at DESC
         LIMIT 1"
    ))
    .bind(name)
    .bind(last_name)
    .bind(middle_name)
    .fetch_optional(pool)
    .await
}

pub(crate) struct ListExaminees {
    pub(crate) search: Option<String>,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

pub(crate) async fn list(pool: &PgPool, params: ListExaminees) -> Result<Vec<Examinee>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM users"));
    push_search(&mut builder, params.search.as_deref());

    builder.push(" ORDER BY last_name, name, created_at OFFSET ");
    builder.push_bind(params.skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(params.limit.clamp(1, 1000));

    builder.build_query_as::<Examinee>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, search: Option<&str>) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
    push_search(&mut builder, search);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

fn push_search(builder: &mut QueryBuilder<'_, Postgres>, search: Option<&str>) {
    let Some(search) = search.map(str::trim).filter(|value| !value.is_empty()) else {
        return;
    };
    let pattern = format!("%{search}%");
    builder.push(" WHERE (name ILIKE ");
    builder.push_bind(pattern.clone());
    builder.push(" OR last_name ILIKE ");
    builder.push_bind(pattern.clone());
    builder.push(" OR middle_name ILIKE ");
    builder.push_bind(pattern.clone());
    builder.push(" OR phone ILIKE ");
    builder.push_bind(pattern);
    builder.push(")");
}

pub(crate) struct CreateExaminee<'a> {
    pub(crate) id: &'a str,
    pub(crate) name: &'a str,
    pub(crate) last_name: &'a str,
    pub(crate) middle_name: Option<&'a str>,
    pub(crate) phone: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateExaminee<'_>,
) -> Result<Examinee, sqlx::Error> {
    sqlx::query_as::<_, Examinee>(&format!(
        "INSERT INTO users (id, name, last_name, middle_name, phone, created_at, updated_at)
         VALUES ($1,$2,$3,$4,$5,$6,$7)
         RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.name)
    .bind(params.last_name)
    .bind(params.middle_name)
    .bind(params.phone)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(pool)
    .await
}

pub(crate) struct UpdateExaminee {
    pub(crate) name: Option<String>,
    pub(crate) last_name: Option<String>,
    pub(crate) middle_name: Option<String>,
    pub(crate) phone: Option<String>,
    pub(crate) updated_at: time::PrimitiveDateTime,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: &str,
    params: UpdateExaminee,
) -> Result<Option<Examinee>, sqlx::Error> {
    sqlx::query_as::<_, Examinee>(&format!(
        "UPDATE users SET
            name = COALESCE($1, name),
            last_name = COALESCE($2, last_name),
            middle_name = COALESCE($3, middle_name),
            phone = COALESCE($4, phone),
            updated_at = $5
         WHERE id = $6
         RETURNING {COLUMNS}"
    ))
    .bind(params.name)
    .bind(params.last_name)
    .bind(params.middle_name)
    .bind(params.phone)
    .bind(params.updated_at)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
