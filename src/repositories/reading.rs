use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{ReadingPassage, ReadingQuestion, ReadingTest};
use crate::db::types::ReadingQuestionType;

const TEST_COLUMNS: &str = "id, title, duration_minutes, created_at";
const PASSAGE_COLUMNS: &str = "id, test_id, instruction, title, text, passage_order";
const QUESTION_COLUMNS: &str = "\
    id, passage_id, instruction, question_type, question_text, question_number, options, \
    summary_text, diagram_labels, paragraph_mapping, correct_answer";

pub(crate) async fn create_test(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    title: &str,
    duration_minutes: i32,
    created_at: PrimitiveDateTime,
) -> Result<ReadingTest, sqlx::Error> {
    sqlx::query_as::<_, ReadingTest>(&format!(
        "INSERT INTO reading_tests (id, title, duration_minutes, created_at)
         VALUES ($1,$2,$3,$4)
         RETURNING {TEST_COLUMNS}"
    ))
    .bind(id)
    .bind(title)
    .bind(duration_minutes)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub(crate) struct CreatePassage<'a> {
    pub(crate) id: &'a str,
    pub(crate) test_id: &'a str,
    pub(crate) instruction: &'a str,
    pub(crate) title: &'a str,
    pub(crate) text: &'a str,
    pub(crate) passage_order: i32,
}

pub(crate) async fn create_passage(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreatePassage<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO reading_passages (id, test_id, instruction, title, text, passage_order)
         VALUES ($1,$2,$3,$4,$5,$6)",
    )
    .bind(params.id)
    .bind(params.test_id)
    .bind(params.instruction)
    .bind(params.title)
    .bind(params.text)
    .bind(params.passage_order)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) passage_id: &'a str,
    pub(crate) instruction: Option<&'a str>,
    pub(crate) question_type: ReadingQuestionType,
    pub(crate) question_text: &'a str,
    pub(crate) question_number: i32,
    pub(crate) options: Option<&'a serde_json::Value>,
    pub(crate) summary_text: Option<&'a str>,
    pub(crate) diagram_labels: Option<&'a serde_json::Value>,
    pub(crate) paragraph_mapping: Option<&'a serde_json::Value>,
    pub(crate) correct_answer: &'a serde_json::Value,
}

pub(crate) async fn create_question(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO reading_questions (
            id, passage_id, instruction, question_type, question_text, question_number,
            options, summary_text, diagram_labels, paragraph_mapping, correct_answer
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)",
    )
    .bind(params.id)
    .bind(params.passage_id)
    .bind(params.instruction)
    .bind(params.question_type)
    .bind(params.question_text)
    .bind(params.question_number)
    .bind(params.options.map(Json))
    .bind(params.summary_text)
    .bind(params.diagram_labels.map(Json))
    .bind(params.paragraph_mapping.map(Json))
    .bind(Json(params.correct_answer))
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn list_tests(pool: &PgPool) -> Result<Vec<ReadingTest>, sqlx::Error> {
    sqlx::query_as::<_, ReadingTest>(&format!(
        "SELECT {TEST_COLUMNS} FROM reading_tests ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_test(pool: &PgPool, id: &str) -> Result<Option<ReadingTest>, sqlx::Error> {
    sqlx::query_as::<_, ReadingTest>(&format!("SELECT {TEST_COLUMNS} FROM reading_tests WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list_tests_for_mock(
    pool: &PgPool,
    mock_id: &str,
) -> Result<Vec<ReadingTest>, sqlx::Error> {
    sqlx::query_as::<_, ReadingTest>(
        "SELECT t.id, t.title, t.duration_minutes, t.created_at
         FROM reading_tests t
         JOIN mock_reading_tests m ON m.test_id = t.id
         WHERE m.mock_id = $1
         ORDER BY t.created_at, t.id",
    )
    .bind(mock_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_test(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM reading_tests WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn passages_for_tests(
    pool: &PgPool,
    test_ids: &[String],
) -> Result<Vec<ReadingPassage>, sqlx::Error> {
    if test_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, ReadingPassage>(&format!(
        "SELECT {PASSAGE_COLUMNS} FROM reading_passages
         WHERE test_id = ANY($1)
         ORDER BY passage_order"
    ))
    .bind(test_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_passage(
    pool: &PgPool,
    test_id: &str,
    passage_order: i32,
) -> Result<Option<ReadingPassage>, sqlx::Error> {
    sqlx::query_as::<_, ReadingPassage>(&format!(
        "SELECT {PASSAGE_COLUMNS} FROM reading_passages WHERE test_id = $1 AND passage_order = $2"
    ))
    .bind(test_id)
    .bind(passage_order)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn questions_for_passages(
    pool: &PgPool,
    passage_ids: &[String],
) -> Result<Vec<ReadingQuestion>, sqlx::Error> {
    if passage_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, ReadingQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM reading_questions
         WHERE passage_id = ANY($1)
         ORDER BY question_number"
    ))
    .bind(passage_ids)
    .fetch_all(pool)
    .await
}
