use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::PaginatedResponse;
use crate::api::validation::{require_id, validate_pagination, validate_payload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::examinee::{
    ExamineeCreate, ExamineeListQuery, ExamineeResponse, ExamineeUpdate,
};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_examinees).post(create_examinee))
        .route("/:user_id", get(get_examinee).patch(update_examinee).delete(delete_examinee))
}

async fn list_examinees(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<ExamineeListQuery>,
) -> Result<Json<PaginatedResponse<ExamineeResponse>>, ApiError> {
    validate_pagination(params.skip, params.limit)?;

    let total_count = repositories::examinees::count(state.db(), params.search.as_deref())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count examinees"))?;
    let examinees = repositories::examinees::list(
        state.db(),
        repositories::examinees::ListExaminees {
            search: params.search,
            skip: params.skip,
            limit: params.limit,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to list examinees"))?;

    Ok(Json(PaginatedResponse {
        items: examinees.into_iter().map(ExamineeResponse::from).collect(),
        total_count,
        skip: params.skip,
        limit: params.limit,
    }))
}

async fn create_examinee(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ExamineeCreate>,
) -> Result<(StatusCode, Json<ExamineeResponse>), ApiError> {
    validate_payload(&payload)?;

    let now = primitive_now_utc();
    let examinee = repositories::examinees::create(
        state.db(),
        repositories::examinees::CreateExaminee {
            id: &Uuid::new_v4().to_string(),
            name: payload.name.trim(),
            last_name: payload.last_name.trim(),
            middle_name: payload.middle_name.as_deref().map(str::trim),
            phone: payload.phone.trim(),
            created_at: now,
            updated_at: now,
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create examinee"))?;

    tracing::info!(admin_id = %admin.id, user_id = %examinee.id, "Examinee registered");
    Ok((StatusCode::CREATED, Json(ExamineeResponse::from(examinee))))
}

async fn get_examinee(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ExamineeResponse>, ApiError> {
    let user_id = require_id(&user_id, "user id")?;
    let examinee = repositories::examinees::find_by_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch examinee"))?
        .ok_or_else(|| ApiError::NotFound("Examinee not found".to_string()))?;

    Ok(Json(ExamineeResponse::from(examinee)))
}

async fn update_examinee(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(payload): Json<ExamineeUpdate>,
) -> Result<Json<ExamineeResponse>, ApiError> {
    validate_payload(&payload)?;
    let user_id = require_id(&user_id, "user id")?;

    let trimmed = |value: Option<String>| value.map(|v| v.trim().to_string());
    let examinee = repositories::examinees::update(
        state.db(),
        user_id,
        repositories::examinees::UpdateExaminee {
            name: trimmed(payload.name),
            last_name: trimmed(payload.last_name),
            middle_name: trimmed(payload.middle_name),
            phone: trimmed(payload.phone),
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update examinee"))?
    .ok_or_else(|| ApiError::NotFound("Examinee not found".to_string()))?;

    tracing::info!(admin_id = %admin.id, user_id, "Examinee updated");
    Ok(Json(ExamineeResponse::from(examinee)))
}

async fn delete_examinee(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let user_id = require_id(&user_id, "user id")?;
    let deleted = repositories::examinees::delete_by_id(state.db(), user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete examinee"))?;

    if !deleted {
        return Err(ApiError::NotFound("Examinee not found".to_string()));
    }

    tracing::info!(admin_id = %admin.id, user_id, "Examinee deleted with their results");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests;
