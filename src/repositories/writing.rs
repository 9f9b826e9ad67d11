use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{WritingTask1, WritingTask2, WritingTest};

const TEST_COLUMNS: &str = "id, title, created_at";

pub(crate) async fn create_test(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    title: &str,
    created_at: PrimitiveDateTime,
) -> Result<WritingTest, sqlx::Error> {
    sqlx::query_as::<_, WritingTest>(&format!(
        "INSERT INTO writing_tests (id, title, created_at) VALUES ($1,$2,$3)
         RETURNING {TEST_COLUMNS}"
    ))
    .bind(id)
    .bind(title)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn add_task1(
    executor: impl sqlx::PgExecutor<'_>,
    task: &WritingTask1,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO writing_task1 (id, test_id, question_text, image, position)
         VALUES ($1,$2,$3,$4,$5)",
    )
    .bind(&task.id)
    .bind(&task.test_id)
    .bind(&task.question_text)
    .bind(&task.image)
    .bind(task.position)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn add_task2(
    executor: impl sqlx::PgExecutor<'_>,
    task: &WritingTask2,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO writing_task2 (id, test_id, question_text, position) VALUES ($1,$2,$3,$4)",
    )
    .bind(&task.id)
    .bind(&task.test_id)
    .bind(&task.question_text)
    .bind(task.position)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn list_tests(pool: &PgPool) -> Result<Vec<WritingTest>, sqlx::Error> {
    sqlx::query_as::<_, WritingTest>(&format!(
        "SELECT {TEST_COLUMNS} FROM writing_tests ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_test(pool: &PgPool, id: &str) -> Result<Option<WritingTest>, sqlx::Error> {
    sqlx::query_as::<_, WritingTest>(&format!("SELECT {TEST_COLUMNS} FROM writing_tests WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_tests_for_mock(
    pool: &PgPool,
    mock_id: &str,
) -> Result<Vec<WritingTest>, sqlx::Error> {
    sqlx::query_as::<_, WritingTest>(
        "SELECT t.id, t.title, t.created_at
         FROM writing_tests t
         JOIN mock_writing_tests m ON m.test_id = t.id
         WHERE m.mock_id = $1
         ORDER BY t.created_at, t.id",
    )
    .bind(mock_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_test(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM writing_tests WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn task1_for_tests(
    pool: &PgPool,
    test_ids: &[String],
) -> Result<Vec<WritingTask1>, sqlx::Error> {
    if test_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, WritingTask1>(
        "SELECT id, test_id, question_text, image, position FROM writing_task1
         WHERE test_id = ANY($1)
         ORDER BY position, id",
    )
    .bind(test_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn task2_for_tests(
    pool: &PgPool,
    test_ids: &[String],
) -> Result<Vec<WritingTask2>, sqlx::Error> {
    if test_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, WritingTask2>(
        "SELECT id, test_id, question_text, position FROM writing_task2
         WHERE test_id = ANY($1)
         ORDER BY position, id",
    )
    .bind(test_ids)
    .fetch_all(pool)
    .await
}
