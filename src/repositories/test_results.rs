use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::TestResult;

pub(crate) const COLUMNS: &str = "\
    id, user_id, mock_id, reading_correct_answers, listening_correct_answers, \
    speaking_score, writing_score, test_date, updated_at";

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<TestResult>, sqlx::Error> {
    sqlx::query_as::<_, TestResult>(&format!("SELECT {COLUMNS} FROM test_results WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_id_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<TestResult>, sqlx::Error> {
    sqlx::query_as::<_, TestResult>(&format!(
        "SELECT {COLUMNS} FROM test_results WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

#[derive(Debug, Default)]
pub(crate) struct ListResults {
    pub(crate) user_id: Option<String>,
    pub(crate) mock_id: Option<String>,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

pub(crate) async fn list(pool: &PgPool, params: &ListResults) -> Result<Vec<TestResult>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM test_results"));
    push_filters(&mut builder, params);

    builder.push(" ORDER BY test_date DESC OFFSET ");
    builder.push_bind(params.skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(params.limit.clamp(1, 1000));

    builder.build_query_as::<TestResult>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, params: &ListResults) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM test_results");
    push_filters(&mut builder, params);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, params: &ListResults) {
    let mut has_where = false;
    let mut push_condition = |builder: &mut QueryBuilder<'_, Postgres>, column: &str| {
        builder.push(if has_where { " AND " } else { " WHERE " });
        builder.push(column);
        builder.push(" = ");
        has_where = true;
    };

    if let Some(user_id) = &params.user_id {
        push_condition(builder, "user_id");
        builder.push_bind(user_id.clone());
    }
    if let Some(mock_id) = &params.mock_id {
        push_condition(builder, "mock_id");
        builder.push_bind(mock_id.clone());
    }
}

pub(crate) async fn list_by_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Vec<TestResult>, sqlx::Error> {
    sqlx::query_as::<_, TestResult>(&format!(
        "SELECT {COLUMNS} FROM test_results WHERE user_id = $1 ORDER BY test_date DESC"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub(crate) struct CreateTestResult<'a> {
    pub(crate) id: &'a str,
    pub(crate) user_id: &'a str,
    pub(crate) mock_id: Option<&'a str>,
    pub(crate) reading_correct_answers: i32,
    pub(crate) listening_correct_answers: i32,
    pub(crate) speaking_score: Decimal,
    pub(crate) writing_score: Decimal,
    pub(crate) test_date: PrimitiveDateTime,
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateTestResult<'_>,
) -> Result<TestResult, sqlx::Error> {
    sqlx::query_as::<_, TestResult>(&format!(
        "INSERT INTO test_results (
            id, user_id, mock_id, reading_correct_answers, listening_correct_answers,
            speaking_score, writing_score, test_date, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$8)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.user_id)
    .bind(params.mock_id)
    .bind(params.reading_correct_answers)
    .bind(params.listening_correct_answers)
    .bind(params.speaking_score)
    .bind(params.writing_score)
    .bind(params.test_date)
    .fetch_one(executor)
    .await
}

pub(crate) struct UpdateTestResult<'a> {
    pub(crate) mock_id: Option<&'a str>,
    pub(crate) reading_correct_answers: i32,
    pub(crate) listening_correct_answers: i32,
    pub(crate) speaking_score: Decimal,
    pub(crate) writing_score: Decimal,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    params: UpdateTestResult<'_>,
) -> Result<TestResult, sqlx::Error> {
    sqlx::query_as::<_, TestResult>(&format!(
        "UPDATE test_results SET
            mock_id = $1,
            reading_correct_answers = $2,
            listening_correct_answers = $3,
            speaking_score = $4,
            writing_score = $5,
            updated_at = $6
         WHERE id = $7
         RETURNING {COLUMNS}"
    ))
    .bind(params.mock_id)
    .bind(params.reading_correct_answers)
    .bind(params.listening_correct_answers)
    .bind(params.speaking_score)
    .bind(params.writing_score)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM test_results WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
