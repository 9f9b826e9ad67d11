//! Raw result bookkeeping. Every write of a result recomputes its band score in the same
//! transaction, so the two rows never disagree.

use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::core::{metrics, time::primitive_now_utc};
use crate::db::models::{BandScore, TestResult};
use crate::repositories::{band_scores, test_results};
use crate::services::banding::{self, BandInputError, RawScores};

const USER_FOREIGN_KEY: &str = "test_results_user_id_fkey";
const MOCK_FOREIGN_KEY: &str = "test_results_mock_id_fkey";

#[derive(Debug, Error)]
pub(crate) enum ResultWorkflowError {
    #[error(transparent)]
    InvalidScores(#[from] BandInputError),
    #[error("Examinee not found")]
    ExamineeNotFound,
    #[error("Mock not found")]
    MockNotFound,
    #[error("Test result not found")]
    NotFound,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub(crate) struct NewResult {
    pub(crate) user_id: String,
    pub(crate) mock_id: Option<String>,
    pub(crate) raw: RawScores,
}

/// Partial correction of a recorded attempt. `mock_id: Some(None)` detaches the mock.
#[derive(Debug, Default)]
pub(crate) struct ResultCorrection {
    pub(crate) mock_id: Option<Option<String>>,
    pub(crate) reading_correct: Option<i32>,
    pub(crate) listening_correct: Option<i32>,
    pub(crate) speaking_score: Option<rust_decimal::Decimal>,
    pub(crate) writing_score: Option<rust_decimal::Decimal>,
}

#[derive(Debug)]
pub(crate) struct ScoredResult {
    pub(crate) result: TestResult,
    pub(crate) band_score: BandScore,
}

pub(crate) async fn record_result(
    pool: &PgPool,
    input: NewResult,
    max_correct: i32,
) -> Result<ScoredResult, ResultWorkflowError> {
    banding::validate_raw_scores(&input.raw, max_correct)?;

    let now = primitive_now_utc();
    let id = Uuid::new_v4().to_string();
    let mut tx = pool.begin().await?;

    let result = test_results::create(
        &mut *tx,
        test_results::CreateTestResult {
            id: &id,
            user_id: &input.user_id,
            mock_id: input.mock_id.as_deref(),
            reading_correct_answers: input.raw.reading_correct,
            listening_correct_answers: input.raw.listening_correct,
            speaking_score: input.raw.speaking_score,
            writing_score: input.raw.writing_score,
            test_date: now,
        },
    )
    .await
    .map_err(map_write_error)?;

    let bands = banding::compute_bands(&input.raw);
    let band_score = band_scores::upsert(&mut *tx, &result.id, &bands, now).await?;

    tx.commit().await?;
    metrics::record_band_score("created");

    tracing::info!(
        result_id = %result.id,
        user_id = %result.user_id,
        overall_band = %band_score.overall_band,
        "Test result recorded"
    );

    Ok(ScoredResult { result, band_score })
}

pub(crate) async fn correct_result(
    pool: &PgPool,
    result_id: &str,
    correction: ResultCorrection,
    max_correct: i32,
) -> Result<ScoredResult, ResultWorkflowError> {
    let mut tx = pool.begin().await?;

    let current = test_results::find_by_id_for_update(&mut *tx, result_id)
        .await?
        .ok_or(ResultWorkflowError::NotFound)?;

    let raw = RawScores {
        reading_correct: correction.reading_correct.unwrap_or(current.reading_correct_answers),
        listening_correct: correction
            .listening_correct
            .unwrap_or(current.listening_correct_answers),
        speaking_score: correction.speaking_score.unwrap_or(current.speaking_score),
        writing_score: correction.writing_score.unwrap_or(current.writing_score),
    };
    banding::validate_raw_scores(&raw, max_correct)?;

    let mock_id = correction.mock_id.unwrap_or(current.mock_id);
    let now = primitive_now_utc();

    let result = test_results::update(
        &mut *tx,
        result_id,
        test_results::UpdateTestResult {
            mock_id: mock_id.as_deref(),
            reading_correct_answers: raw.reading_correct,
            listening_correct_answers: raw.listening_correct,
            speaking_score: raw.speaking_score,
            writing_score: raw.writing_score,
            updated_at: now,
        },
    )
    .await
    .map_err(map_write_error)?;

    let bands = banding::compute_bands(&raw);
    let band_score = band_scores::upsert(&mut *tx, &result.id, &bands, now).await?;

    tx.commit().await?;
    metrics::record_band_score("updated");

    tracing::info!(
        result_id = %result.id,
        overall_band = %band_score.overall_band,
        "Test result corrected"
    );

    Ok(ScoredResult { result, band_score })
}

fn map_write_error(err: sqlx::Error) -> ResultWorkflowError {
    if let sqlx::Error::Database(db_err) = &err {
        match db_err.constraint() {
            Some(USER_FOREIGN_KEY) => return ResultWorkflowError::ExamineeNotFound,
            Some(MOCK_FOREIGN_KEY) => return ResultWorkflowError::MockNotFound,
            _ => {}
        }
    }
    ResultWorkflowError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).expect("decimal")
    }

    fn raw(reading: i32, listening: i32, speaking: &str, writing: &str) -> RawScores {
        RawScores {
            reading_correct: reading,
            listening_correct: listening,
            speaking_score: dec(speaking),
            writing_score: dec(writing),
        }
    }

    #[tokio::test]
    async fn recording_a_result_stores_matching_bands() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db();
        let examinee = test_support::insert_examinee(pool, "Aziz", "Karimov", "Bakhtiyorovich").await;

        let scored = record_result(
            pool,
            NewResult { user_id: examinee.id.clone(), mock_id: None, raw: raw(30, 26, "6.5", "6.0") },
            40,
        )
        .await
        .expect("recorded");

        assert_eq!(scored.band_score.reading_band, dec("7.0"));
        assert_eq!(scored.band_score.listening_band, dec("6.5"));
        assert_eq!(scored.band_score.overall_band, dec("6.5"));

        let stored = band_scores::find_by_result(pool, &scored.result.id)
            .await
            .expect("query")
            .expect("band score row");
        assert_eq!(stored, scored.band_score);
    }

    #[tokio::test]
    async fn correcting_a_result_recomputes_bands() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db();
        let examinee = test_support::insert_examinee(pool, "Aziz", "Karimov", "B").await;

        let scored = record_result(
            pool,
            NewResult { user_id: examinee.id, mock_id: None, raw: raw(10, 10, "5.0", "5.0") },
            40,
        )
        .await
        .expect("recorded");

        let corrected = correct_result(
            pool,
            &scored.result.id,
            ResultCorrection { reading_correct: Some(39), ..ResultCorrection::default() },
            40,
        )
        .await
        .expect("corrected");

        assert_eq!(corrected.result.reading_correct_answers, 39);
        assert_eq!(corrected.result.listening_correct_answers, 10);
        assert_eq!(corrected.band_score.reading_band, dec("9.0"));
        // (9.0 + 4.0 + 5.0 + 5.0) / 4 = 5.75
        assert_eq!(corrected.band_score.overall_band, dec("6.0"));
    }

    #[tokio::test]
    async fn invalid_scores_leave_nothing_behind() {
        let ctx = test_support::setup_test_context().await;
        let pool = ctx.state.db();
        let examinee = test_support::insert_examinee(pool, "Aziz", "Karimov", "B").await;

        let err = record_result(
            pool,
            NewResult { user_id: examinee.id, mock_id: None, raw: raw(41, 10, "5.0", "5.0") },
            40,
        )
        .await
        .expect_err("rejected");

        assert!(matches!(err, ResultWorkflowError::InvalidScores(_)));
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM test_results")
            .fetch_one(pool)
            .await
            .expect("count");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn unknown_examinee_is_reported() {
        let ctx = test_support::setup_test_context().await;

        let err = record_result(
            ctx.state.db(),
            NewResult {
                user_id: Uuid::new_v4().to_string(),
                mock_id: None,
                raw: raw(20, 20, "6.0", "6.0"),
            },
            40,
        )
        .await
        .expect_err("rejected");

        assert!(matches!(err, ResultWorkflowError::ExamineeNotFound));
    }

    #[tokio::test]
    async fn correcting_missing_result_is_not_found() {
        let ctx = test_support::setup_test_context().await;

        let err = correct_result(ctx.state.db(), "missing", ResultCorrection::default(), 40)
            .await
            .expect_err("missing");

        assert!(matches!(err, ResultWorkflowError::NotFound));
    }
}
