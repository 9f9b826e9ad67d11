use sqlx::PgPool;
use time::PrimitiveDateTime;

use crate::db::models::BandScore;
use crate::services::banding::BandBreakdown;

pub(crate) const COLUMNS: &str = "\
    test_result_id, reading_band, listening_band, speaking_band, writing_band, \
    overall_band, computed_at";

pub(crate) async fn find_by_result(
    pool: &PgPool,
    test_result_id: &str,
) -> Result<Option<BandScore>, sqlx::Error> {
    sqlx::query_as::<_, BandScore>(&format!(
        "SELECT {COLUMNS} FROM band_scores WHERE test_result_id = $1"
    ))
    .bind(test_result_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn list_by_results(
    pool: &PgPool,
    test_result_ids: &[String],
) -> Result<Vec<BandScore>, sqlx::Error> {
    if test_result_ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, BandScore>(&format!(
        "SELECT {COLUMNS} FROM band_scores WHERE test_result_id = ANY($1)"
    ))
    .bind(test_result_ids)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list(pool: &PgPool, skip: i64, limit: i64) -> Result<Vec<BandScore>, sqlx::Error> {
    sqlx::query_as::<_, BandScore>(&format!(
        "SELECT {COLUMNS} FROM band_scores
         ORDER BY computed_at DESC
         OFFSET $1 LIMIT $2"
    ))
    .bind(skip.max(0))
    .bind(limit.clamp(1, 1000))
    .fetch_all(pool)
    .await
}

pub(crate) async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM band_scores").fetch_one(pool).await
}

/// Band score of the examinee's most recent attempt.
pub(crate) async fn latest_for_user(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<BandScore>, sqlx::Error> {
    sqlx::query_as::<_, BandScore>(
        "SELECT b.test_result_id, b.reading_band, b.listening_band, b.speaking_band,
                b.writing_band, b.overall_band, b.computed_at
         FROM band_scores b
         JOIN test_results r ON r.id = b.test_result_id
         WHERE r.user_id = $1
         ORDER BY r.test_date DESC
         LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn upsert(
    executor: impl sqlx::PgExecutor<'_>,
    test_result_id: &str,
    bands: &BandBreakdown,
    computed_at: PrimitiveDateTime,
) -> Result<BandScore, sqlx::Error> {
    sqlx::query_as::<_, BandScore>(&format!(
        "INSERT INTO band_scores (
            test_result_id, reading_band, listening_band, speaking_band, writing_band,
            overall_band, computed_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        ON CONFLICT (test_result_id) DO UPDATE SET
            reading_band = EXCLUDED.reading_band,
            listening_band = EXCLUDED.listening_band,
            speaking_band = EXCLUDED.speaking_band,
            writing_band = EXCLUDED.writing_band,
            overall_band = EXCLUDED.overall_band,
            computed_at = EXCLUDED.computed_at
        RETURNING {COLUMNS}"
    ))
    .bind(test_result_id)
    .bind(bands.reading)
    .bind(bands.listening)
    .bind(bands.speaking)
    .bind(bands.writing)
    .bind(bands.overall)
    .bind(computed_at)
    .fetch_one(executor)
    .await
}
