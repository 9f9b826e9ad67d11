use sqlx::{PgPool, Postgres, QueryBuilder};
use time::{Date, PrimitiveDateTime};

use crate::db::models::Mock;
use crate::db::types::MockStatus;

pub(crate) const COLUMNS: &str =
    "id, title, number, status, exam_date, duration_minutes, created_at, updated_at";

/// Key of the transaction-scoped advisory lock that serializes every mock save.
const MOCK_SAVE_LOCK_KEY: i64 = 0x6d6f_636b_7361_7665;

pub(crate) struct CreateMock<'a> {
    pub(crate) id: &'a str,
    pub(crate) title: &'a str,
    pub(crate) number: i32,
    pub(crate) status: MockStatus,
    pub(crate) exam_date: Date,
    pub(crate) duration_minutes: i32,
    pub(crate) created_at: PrimitiveDateTime,
    pub(crate) updated_at: PrimitiveDateTime,
}

pub(crate) struct UpdateMock<'a> {
    pub(crate) title: &'a str,
    pub(crate) number: i32,
    pub(crate) status: MockStatus,
    pub(crate) exam_date: Date,
    pub(crate) duration_minutes: i32,
    pub(crate) updated_at: PrimitiveDateTime,
}

/// Test-set ids linked to a mock, one list per skill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct MockContentIds {
    pub(crate) reading: Vec<String>,
    pub(crate) listening: Vec<String>,
    pub(crate) speaking: Vec<String>,
    pub(crate) writing: Vec<String>,
}

const LINK_TABLES: [&str; 4] =
    ["mock_reading_tests", "mock_listening_tests", "mock_speaking_tests", "mock_writing_tests"];

pub(crate) async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Mock>, sqlx::Error> {
    sqlx::query_as::<_, Mock>(&format!("SELECT {COLUMNS} FROM mocks WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn find_by_id_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<Mock>, sqlx::Error> {
    sqlx::query_as::<_, Mock>(&format!("SELECT {COLUMNS} FROM mocks WHERE id = $1 FOR UPDATE"))
        .bind(id)
        .fetch_optional(executor)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    status: Option<MockStatus>,
    skip: i64,
    limit: i64,
) -> Result<Vec<Mock>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM mocks"));

    if let Some(status) = status {
        builder.push(" WHERE status = ");
        builder.push_bind(status);
    }

    builder.push(" ORDER BY exam_date DESC, number DESC OFFSET ");
    builder.push_bind(skip.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit.clamp(1, 1000));

    builder.build_query_as::<Mock>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, status: Option<MockStatus>) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM mocks");

    if let Some(status) = status {
        builder.push(" WHERE status = ");
        builder.push_bind(status);
    }

    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

/// Blocks until no other transaction is saving a mock; released on commit or rollback.
pub(crate) async fn lock_for_save(executor: impl sqlx::PgExecutor<'_>) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MOCK_SAVE_LOCK_KEY)
        .execute(executor)
        .await?;
    Ok(())
}

/// Another mock that is active and whose exam date has not passed yet.
pub(crate) async fn find_other_current_active(
    executor: impl sqlx::PgExecutor<'_>,
    exclude_id: &str,
    today: Date,
) -> Result<Option<Mock>, sqlx::Error> {
    sqlx::query_as::<_, Mock>(&format!(
        "SELECT {COLUMNS} FROM mocks
         WHERE status = $1 AND id <> $2 AND exam_date >= $3
         ORDER BY number
         LIMIT 1"
    ))
    .bind(MockStatus::Active)
    .bind(exclude_id)
    .bind(today)
    .fetch_optional(executor)
    .await
}

/// Flips every active mock except `keep_id` to inactive and returns the flipped ids.
pub(crate) async fn deactivate_others(
    executor: impl sqlx::PgExecutor<'_>,
    keep_id: &str,
    now: PrimitiveDateTime,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "UPDATE mocks SET status = $1, updated_at = $2
         WHERE status = $3 AND id <> $4
         RETURNING id",
    )
    .bind(MockStatus::Inactive)
    .bind(now)
    .bind(MockStatus::Active)
    .bind(keep_id)
    .fetch_all(executor)
    .await
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateMock<'_>,
) -> Result<Mock, sqlx::Error> {
    sqlx::query_as::<_, Mock>(&format!(
        "INSERT INTO mocks (
            id, title, number, status, exam_date, duration_minutes, created_at, updated_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.title)
    .bind(params.number)
    .bind(params.status)
    .bind(params.exam_date)
    .bind(params.duration_minutes)
    .bind(params.created_at)
    .bind(params.updated_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    params: UpdateMock<'_>,
) -> Result<Mock, sqlx::Error> {
    sqlx::query_as::<_, Mock>(&format!(
        "UPDATE mocks
         SET title = $1, number = $2, status = $3, exam_date = $4,
             duration_minutes = $5, updated_at = $6
         WHERE id = $7
         RETURNING {COLUMNS}"
    ))
    .bind(params.title)
    .bind(params.number)
    .bind(params.status)
    .bind(params.exam_date)
    .bind(params.duration_minutes)
    .bind(params.updated_at)
    .bind(id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM mocks WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// The active mock scheduled for `today`, if any.
pub(crate) async fn find_servable(pool: &PgPool, today: Date) -> Result<Option<Mock>, sqlx::Error> {
    sqlx::query_as::<_, Mock>(&format!(
        "SELECT {COLUMNS} FROM mocks
         WHERE status = $1 AND exam_date = $2
         ORDER BY number
         LIMIT 1"
    ))
    .bind(MockStatus::Active)
    .bind(today)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn content_ids(
    executor: impl sqlx::PgExecutor<'_>,
    mock_id: &str,
) -> Result<MockContentIds, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT 'reading', test_id FROM mock_reading_tests WHERE mock_id = $1
         UNION ALL
         SELECT 'listening', test_id FROM mock_listening_tests WHERE mock_id = $1
         UNION ALL
         SELECT 'speaking', test_id FROM mock_speaking_tests WHERE mock_id = $1
         UNION ALL
         SELECT 'writing', test_id FROM mock_writing_tests WHERE mock_id = $1",
    )
    .bind(mock_id)
    .fetch_all(executor)
    .await?;

    Ok(group_by_skill(rows))
}

fn group_by_skill(rows: Vec<(String, String)>) -> MockContentIds {
    let mut ids = MockContentIds::default();
    for (skill, test_id) in rows {
        match skill.as_str() {
            "reading" => ids.reading.push(test_id),
            "listening" => ids.listening.push(test_id),
            "speaking" => ids.speaking.push(test_id),
            "writing" => ids.writing.push(test_id),
            other => {
                tracing::warn!(skill = other, test_id = %test_id, "Skipping link with unknown skill")
            }
        }
    }
    for list in [&mut ids.reading, &mut ids.listening, &mut ids.speaking, &mut ids.writing] {
        list.sort();
    }
    ids
}

pub(crate) async fn replace_content(
    tx: &mut sqlx::Transaction<'_, Postgres>,
    mock_id: &str,
    content: &MockContentIds,
) -> Result<(), sqlx::Error> {
    let lists = [&content.reading, &content.listening, &content.speaking, &content.writing];

    for (table, test_ids) in LINK_TABLES.iter().zip(lists) {
        sqlx::query(&format!("DELETE FROM {table} WHERE mock_id = $1"))
            .bind(mock_id)
            .execute(&mut **tx)
            .await?;

        if test_ids.is_empty() {
            continue;
        }

        sqlx::query(&format!(
            "INSERT INTO {table} (mock_id, test_id)
             SELECT $1, UNNEST($2::varchar[])
             ON CONFLICT DO NOTHING"
        ))
        .bind(mock_id)
        .bind(test_ids)
        .execute(&mut **tx)
        .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::group_by_skill;

    fn link(skill: &str, test_id: &str) -> (String, String) {
        (skill.to_string(), test_id.to_string())
    }

    #[test]
    fn links_are_grouped_by_skill_and_sorted() {
        let ids = group_by_skill(vec![
            link("writing", "w-2"),
            link("reading", "r-1"),
            link("writing", "w-1"),
            link("speaking", "s-1"),
            link("listening", "l-1"),
        ]);

        assert_eq!(ids.reading, vec!["r-1"]);
        assert_eq!(ids.listening, vec!["l-1"]);
        assert_eq!(ids.speaking, vec!["s-1"]);
        assert_eq!(ids.writing, vec!["w-1", "w-2"]);
    }

    #[test]
    fn unknown_skill_is_not_filed_under_writing() {
        let ids = group_by_skill(vec![link("grammar", "g-1"), link("writing", "w-1")]);

        assert_eq!(ids.writing, vec!["w-1"]);
        assert!(ids.reading.is_empty() && ids.listening.is_empty() && ids.speaking.is_empty());
    }
}
