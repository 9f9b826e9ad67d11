use sqlx::types::Json;
use sqlx::PgPool;

use crate::db::models::{QuestionTable, QuestionTableAnswer, QuestionTableRow};

const TABLE_COLUMNS: &str = "id, reading_question_id, listening_question_id, columns";
const ROW_COLUMNS: &str = "id, table_id, row_data, row_order";
const ANSWER_COLUMNS: &str = "id, table_id, number, correct_answer";

/// The question a completion table belongs to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TableOwner<'a> {
    Reading(&'a str),
    Listening(&'a str),
}

pub(crate) async fn create(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    owner: TableOwner<'_>,
    columns: &[String],
) -> Result<(), sqlx::Error> {
    let (reading_question_id, listening_question_id) = match owner {
        TableOwner::Reading(question_id) => (Some(question_id), None),
        TableOwner::Listening(question_id) => (None, Some(question_id)),
    };

    sqlx::query(
        "INSERT INTO question_tables (id, reading_question_id, listening_question_id, columns)
         VALUES ($1,$2,$3,$4)",
    )
    .bind(id)
    .bind(reading_question_id)
    .bind(listening_question_id)
    .bind(Json(columns))
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn add_row(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    table_id: &str,
    row_data: &[String],
    row_order: i32,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO question_table_rows (id, table_id, row_data, row_order) VALUES ($1,$2,$3,$4)",
    )
    .bind(id)
    .bind(table_id)
    .bind(Json(row_data))
    .bind(row_order)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn add_answer(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    table_id: &str,
    number: i32,
    correct_answer: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO question_table_answers (id, table_id, number, correct_answer)
         VALUES ($1,$2,$3,$4)",
    )
    .bind(id)
    .bind(table_id)
    .bind(number)
    .bind(correct_answer)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn list_for_reading_questions(
    pool: &PgPool,
    question_ids: &[String],
) -> Result<Vec<QuestionTable>, sqlx::Error> {
    list_for_questions(pool, "reading_question_id", question_ids).await
}

pub(crate) async fn list_for_listening_questions(
    pool: &PgPool,
    question_ids: &[String],
) -> Result<Vec<QuestionTable>, sqlx::Error> {
    list_for_questions(pool, "listening_question_id", question_ids).await
}

async fn list_for_questions(
    pool: &PgPool,
    owner_column: &str,
    question_ids: &[String],
) -> Result<Vec<QuestionTable>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionTable>(&format!(
        "SELECT {TABLE_COLUMNS} FROM question_tables WHERE {owner_column} = ANY($1)"
    ))
    .bind(question_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn rows_for_tables(
    pool: &PgPool,
    table_ids: &[String],
) -> Result<Vec<QuestionTableRow>, sqlx::Error> {
    if table_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionTableRow>(&format!(
        "SELECT {ROW_COLUMNS} FROM question_table_rows
         WHERE table_id = ANY($1)
         ORDER BY row_order, id"
    ))
    .bind(table_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn answers_for_tables(
    pool: &PgPool,
    table_ids: &[String],
) -> Result<Vec<QuestionTableAnswer>, sqlx::Error> {
    if table_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, QuestionTableAnswer>(&format!(
        "SELECT {ANSWER_COLUMNS} FROM question_table_answers
         WHERE table_id = ANY($1)
         ORDER BY number"
    ))
    .bind(table_ids)
    .fetch_all(pool)
    .await
}
