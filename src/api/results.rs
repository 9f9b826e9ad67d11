use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::PaginatedResponse;
use crate::api::validation::{require_id, validate_pagination, validate_payload};
use crate::core::state::AppState;
use crate::db::models::{Examinee, TestResult};
use crate::repositories;
use crate::schemas::examinee::{ExamineeLookup, ExamineeResponse};
use crate::schemas::result::{
    ExamineeResultsResponse, TestResultCreate, TestResultListQuery, TestResultResponse,
    TestResultUpdate,
};
use crate::services::results::{self, NewResult, ResultCorrection};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_results).post(create_result))
        .route("/by-user-info", post(results_by_user_info))
        .route("/:result_id", get(get_result).patch(update_result).delete(delete_result))
}

/// Pairs each result with its band score, keeping the result order.
pub(crate) async fn with_band_scores(
    state: &AppState,
    results: Vec<TestResult>,
) -> Result<Vec<TestResultResponse>, ApiError> {
    let ids: Vec<String> = results.iter().map(|result| result.id.clone()).collect();
    let mut bands: HashMap<String, _> = repositories::band_scores::list_by_results(state.db(), &ids)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load band scores"))?
        .into_iter()
        .map(|band| (band.test_result_id.clone(), band))
        .collect();

    Ok(results
        .into_iter()
        .map(|result| {
            let band = bands.remove(&result.id);
            TestResultResponse::new(result, band)
        })
        .collect())
}

/// Exact full-name match; the newest registration wins when names repeat.
pub(crate) async fn lookup_examinee(
    state: &AppState,
    lookup: &ExamineeLookup,
) -> Result<Examinee, ApiError> {
    validate_payload(lookup)?;
    repositories::examinees::find_by_full_name(
        state.db(),
        lookup.name.trim(),
        lookup.last_name.trim(),
        lookup.middle_name.trim(),
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to look up examinee"))?
    .ok_or_else(|| ApiError::NotFound("Examinee not found".to_string()))
}

async fn list_results(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<TestResultListQuery>,
) -> Result<Json<PaginatedResponse<TestResultResponse>>, ApiError> {
    validate_pagination(params.skip, params.limit)?;

    let filter = repositories::test_results::ListResults {
        user_id: params.user_id,
        mock_id: params.mock_id,
        skip: params.skip,
        limit: params.limit,
    };
    let results = repositories::test_results::list(state.db(), &filter)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list test results"))?;
    let total_count = repositories::test_results::count(state.db(), &filter)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count test results"))?;

    Ok(Json(PaginatedResponse {
        items: with_band_scores(&state, results).await?,
        total_count,
        skip: params.skip,
        limit: params.limit,
    }))
}

async fn create_result(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<TestResultCreate>,
) -> Result<(StatusCode, Json<TestResultResponse>), ApiError> {
    let user_id = require_id(&payload.user_id, "user id")?.to_string();
    let mock_id = match payload.mock_id.as_deref() {
        Some(mock_id) => Some(require_id(mock_id, "mock id")?.to_string()),
        None => None,
    };

    let scored = results::record_result(
        state.db(),
        NewResult { user_id, mock_id, raw: payload.raw_scores() },
        state.settings().exam().max_correct_answers,
    )
    .await?;

    tracing::info!(admin_id = %admin.id, result_id = %scored.result.id, "Result entered");
    Ok((
        StatusCode::CREATED,
        Json(TestResultResponse::new(scored.result, Some(scored.band_score))),
    ))
}

async fn get_result(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(result_id): Path<String>,
) -> Result<Json<TestResultResponse>, ApiError> {
    let result_id = require_id(&result_id, "result id")?;
    let result = repositories::test_results::find_by_id(state.db(), result_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch test result"))?
        .ok_or_else(|| ApiError::NotFound("Test result not found".to_string()))?;
    let band = repositories::band_scores::find_by_result(state.db(), result_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch band score"))?;

    Ok(Json(TestResultResponse::new(result, band)))
}

async fn update_result(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(result_id): Path<String>,
    Json(payload): Json<TestResultUpdate>,
) -> Result<Json<TestResultResponse>, ApiError> {
    let result_id = require_id(&result_id, "result id")?;

    let scored = results::correct_result(
        state.db(),
        result_id,
        ResultCorrection {
            mock_id: payload.mock_id,
            reading_correct: payload.reading_correct_answers,
            listening_correct: payload.listening_correct_answers,
            speaking_score: payload.speaking_score,
            writing_score: payload.writing_score,
        },
        state.settings().exam().max_correct_answers,
    )
    .await?;

    tracing::info!(admin_id = %admin.id, result_id, "Result corrected");
    Ok(Json(TestResultResponse::new(scored.result, Some(scored.band_score))))
}

async fn delete_result(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(result_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let result_id = require_id(&result_id, "result id")?;
    let deleted = repositories::test_results::delete_by_id(state.db(), result_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete test result"))?;

    if !deleted {
        return Err(ApiError::NotFound("Test result not found".to_string()));
    }

    tracing::info!(admin_id = %admin.id, result_id, "Result deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn results_by_user_info(
    State(state): State<AppState>,
    Json(payload): Json<ExamineeLookup>,
) -> Result<Json<ExamineeResultsResponse>, ApiError> {
    let examinee = lookup_examinee(&state, &payload).await?;
    let results = repositories::test_results::list_by_user(state.db(), &examinee.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list test results"))?;

    Ok(Json(ExamineeResultsResponse {
        results: with_band_scores(&state, results).await?,
        user: ExamineeResponse::from(examinee),
    }))
}

#[cfg(test)]
mod tests;
