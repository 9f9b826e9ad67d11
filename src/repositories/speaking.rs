use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::{SpeakingCueCard, SpeakingQuestion, SpeakingTest};

const TEST_COLUMNS: &str = "id, title, created_at";
const QUESTION_COLUMNS: &str = "id, test_id, title, question_text, position";
const CUE_CARD_COLUMNS: &str = "id, test_id, topic, description, position";

/// Interview parts made of plain questions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum QuestionPart {
    One,
    Three,
}

impl QuestionPart {
    fn table(self) -> &'static str {
        match self {
            Self::One => "speaking_part1_questions",
            Self::Three => "speaking_part3_questions",
        }
    }
}

pub(crate) async fn create_test(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
    title: &str,
    created_at: PrimitiveDateTime,
) -> Result<SpeakingTest, sqlx::Error> {
    sqlx::query_as::<_, SpeakingTest>(&format!(
        "INSERT INTO speaking_tests (id, title, created_at) VALUES ($1,$2,$3)
         RETURNING {TEST_COLUMNS}"
    ))
    .bind(id)
    .bind(title)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub(crate) async fn add_question(
    executor: impl sqlx::PgExecutor<'_>,
    part: QuestionPart,
    question: &SpeakingQuestion,
) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "INSERT INTO {} (id, test_id, title, question_text, position) VALUES ($1,$2,$3,$4,$5)",
        part.table()
    ))
    .bind(&question.id)
    .bind(&question.test_id)
    .bind(&question.title)
    .bind(&question.question_text)
    .bind(question.position)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn add_cue_card(
    executor: impl sqlx::PgExecutor<'_>,
    card: &SpeakingCueCard,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO speaking_part2_cue_cards (id, test_id, topic, description, position)
         VALUES ($1,$2,$3,$4,$5)",
    )
    .bind(&card.id)
    .bind(&card.test_id)
    .bind(&card.topic)
    .bind(&card.description)
    .bind(card.position)
    .execute(executor)
    .await?;
    Ok(())
}

pub(crate) async fn list_tests(pool: &PgPool) -> Result<Vec<SpeakingTest>, sqlx::Error> {
    sqlx::query_as::<_, SpeakingTest>(&format!(
        "SELECT {TEST_COLUMNS} FROM speaking_tests ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_test(pool: &PgPool, id: &str) -> Result<Option<SpeakingTest>, sqlx::Error> {
    sqlx::query_as::<_, SpeakingTest>(&format!(
        "SELECT {TEST_COLUMNS} FROM speaking_tests WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_tests_for_mock(
    pool: &PgPool,
    mock_id: &str,
) -> Result<Vec<SpeakingTest>, sqlx::Error> {
    sqlx::query_as::<_, SpeakingTest>(
        "SELECT t.id, t.title, t.created_at
         FROM speaking_tests t
         JOIN mock_speaking_tests m ON m.test_id = t.id
         WHERE m.mock_id = $1
         ORDER BY t.created_at, t.id",
    )
    .bind(mock_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn delete_test(pool: &PgPool, id: &str) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM speaking_tests WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub(crate) async fn questions_for_tests(
    pool: &PgPool,
    part: QuestionPart,
    test_ids: &[String],
) -> Result<Vec<SpeakingQuestion>, sqlx::Error> {
    if test_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, SpeakingQuestion>(&format!(
        "SELECT {QUESTION_COLUMNS} FROM {} WHERE test_id = ANY($1) ORDER BY position, id",
        part.table()
    ))
    .bind(test_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn cue_cards_for_tests(
    pool: &PgPool,
    test_ids: &[String],
) -> Result<Vec<SpeakingCueCard>, sqlx::Error> {
    if test_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, SpeakingCueCard>(&format!(
        "SELECT {CUE_CARD_COLUMNS} FROM speaking_part2_cue_cards
         WHERE test_id = ANY($1)
         ORDER BY position, id"
    ))
    .bind(test_ids)
    .fetch_all(pool)
    .await
}
