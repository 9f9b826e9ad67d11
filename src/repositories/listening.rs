use sqlx::types::Json;
use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{ListeningQuestion, ListeningSection, ListeningTest};
use crate::db::types::ListeningQuestionType;

const TEST_COLUMNS: &str = "id, title, created_at";
const SECTION_COLUMNS: &str = "\
    id, test_id, section_number, instruction, start_time_seconds, end_time_seconds, audio_file";
const QUESTION_COLUMNS: &str = "\
    id, section_id, question_number, question_type, question_text, options, correct_answer, \
    instruction, map_image";

pub(crate) async fn create_test(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    title: &str,
    created_at: PrimitiveDateTime,
) -> Result<ListeningTest, sqlx::Error> {
    sqlx::query_as::<_, ListeningTest>(&format!(
        "INSERT INTO listening_tests (id, title, created_at) VALUES ($1,$2,$3)
         RETURNING {TEST_COLUMNS}"
    ))
    .bind(id)
    .bind(title)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub(crate) struct CreateSection<'a> {
    pub(crate) id: &'a str,
    pub(crate) test_id: &'a str,
    pub(crate) section_number: i32,
    pub(crate) instruction: Option<&'a str>,
    pub(crate) start_time_seconds: Option<i32>,
    pub(crate) end_time_seconds: Option<i32>,
    pub(crate) audio_file: Option<&'a str>,
}

pub(crate) async fn create_section(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateSection<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO listening_sections (
            id, test_id, section_number, instruction, start_time_seconds, end_time_seconds,
            audio_file
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)",
    )
    .bind(params.id)
    .bind(params.test_id)
    .bind(params.section_number)
    .bind(params.instruction)
    .bind(params.start_time_seconds)
    .bind(params.end_time_seconds)
    .bind(params.audio_file)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) struct CreateQuestion<'a> {
    pub(crate) id: &'a str,
    pub(crate) section_id: &'a str,
    pub(crate) question_number: i32,
    pub(crate) question_type: ListeningQuestionType,
    pub(crate) question_text: &'a str,
    pub(crate) options: Option<&'a serde_json::Value>,
    pub(crate) correct_answer: &'a serde_json::Value,
    pub(crate) instruction: Option<&'a str>,
    pub(crate) map_image: Option<&'a str>,
}

pub(crate) async fn create_question(
    executor: impl sqlx::PgExecutor<'_>,
    params: CreateQuestion<'_>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO listening_questions (
            id, section_id, question_number, question_type, question_text, options,
            correct_answer, instruction, map_image
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9)",
    )
    .bind(params.id)
    .bind(params.section_id)
    .bind(params.question_number)
    .bind(params.question_type)
    .bind(params.question_text)
    .bind(params.options.map(Json))
    .bind(Json(params.correct_answer))
    .bind(params.instruction)
    .bind(params.map_image)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn list_tests(pool: &PgPool) -> Result<Vec<ListeningTest>, sqlx::Error> {
    sqlx::query_as::<_, ListeningTest>(&format!(
        "SELECT {TEST_COLUMNS} FROM listening_tests ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_test(pool: &PgPool, id: &str) -> Result<Option<ListeningTest>, sqlx::Error> {
    sqlx::query_as::<_, ListeningTest>(&format!(
        "SELECT {TEST_COLUMNS} FROM listening_tests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_tests_for_mock(
    pool: &PgPool,
    mock_id: &str,
) -> Result<Vec<ListeningTest>, sqlx::Error> {
    sqlx::query_as::<_, ListeningTest>(
        "SELECT t.id, t.title, t.created_at
         FROM listening_tests t
         JOIN mock_listening_tests m ON m.test_id = t.id
         WHERE m.mock_id = $1
         ORDER BY t.created_at, t.id",
    )
    .bind(mock_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_test(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM listening_tests WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn sections_for_tests(
    pool: &PgPool,
    test_ids: &[String],
) -> Result<Vec<ListeningSection>, sqlx::Error> {
    if test_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, ListeningSection>(&format!(
        "SELECT {SECTION_COLUMNS} FROM listening_sections
         WHERE test_id = ANY($1)
         ORDER BY section_number"
    ))
    .bind(test_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_section(
    pool: &PgPool,
    test_id: &str,
    section_number: i32,
) -> Result<Option<ListeningSection>, sqlx::Error> {
    sqlx::query_as::<_, ListeningSection>(&format!(
        "SELECT {SECTION_COLUMNS} FROM listening_sections
         WHERE test_id = $1 AND section_number = $2"
    ))
    .bind(test_id)
    .bind(section_number)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn questions_for_sections(
    pool: &PgPool,
    section_ids: &[String],
) -> Result<Vec<ListeningQuestion>, sqlx::Error> {
    if section_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, ListeningQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM listening_questions
         WHERE section_id = ANY($1)
         ORDER BY question_number"
    ))
    .bind(section_ids)
    .fetch_all(pool)
    .await
}
