use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::PaginatedResponse;
use crate::api::results::lookup_examinee;
use crate::api::validation::{require_id, validate_pagination};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::examinee::{ExamineeLookup, ExamineeResponse};
use crate::schemas::result::{BandScoreListQuery, BandScoreResponse, ExamineeBandsResponse};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_band_scores))
        .route("/by-user-info", post(band_scores_by_user_info))
        .route("/:result_id", get(get_band_score))
}

async fn list_band_scores(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<BandScoreListQuery>,
) -> Result<Json<PaginatedResponse<BandScoreResponse>>, ApiError> {
    validate_pagination(params.skip, params.limit)?;

    let scores = repositories::band_scores::list(state.db(), params.skip, params.limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list band scores"))?;
    let total_count = repositories::band_scores::count(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count band scores"))?;

    Ok(Json(PaginatedResponse {
        items: scores.into_iter().map(BandScoreResponse::from).collect(),
        total_count,
        skip: params.skip,
        limit: params.limit,
    }))
}

async fn get_band_score(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(result_id): Path<String>,
) -> Result<Json<BandScoreResponse>, ApiError> {
    let result_id = require_id(&result_id, "result id")?;
    let score = repositories::band_scores::find_by_result(state.db(), result_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch band score"))?
        .ok_or_else(|| ApiError::NotFound("Band score not found".to_string()))?;

    Ok(Json(BandScoreResponse::from(score)))
}

/// Band scores of the examinee's most recent attempt.
async fn band_scores_by_user_info(
    State(state): State<AppState>,
    Json(payload): Json<ExamineeLookup>,
) -> Result<Json<ExamineeBandsResponse>, ApiError> {
    let examinee = lookup_examinee(&state, &payload).await?;
    let score = repositories::band_scores::latest_for_user(state.db(), &examinee.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch band score"))?
        .ok_or_else(|| ApiError::NotFound("No results recorded for this examinee".to_string()))?;

    Ok(Json(ExamineeBandsResponse {
        user: ExamineeResponse::from(examinee),
        band_score: BandScoreResponse::from(score),
    }))
}
