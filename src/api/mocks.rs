use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::PaginatedResponse;
use crate::api::validation::{require_id, validate_pagination, validate_payload};
use crate::core::state::AppState;
use crate::db::{models::Mock, types::MockStatus};
use crate::repositories;
use crate::repositories::mocks::MockContentIds;
use crate::schemas::mock::{
    MockContentUpdate, MockCreate, MockListQuery, MockResponse, MockUpdate,
};
use crate::services::mock_activation::{self, MockChanges, MockSave, NewMock};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_mocks).post(create_mock))
        .route("/:mock_id", get(get_mock).patch(update_mock).delete(delete_mock))
        .route("/:mock_id/content", put(replace_mock_content))
}

async fn list_mocks(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Query(params): Query<MockListQuery>,
) -> Result<Json<PaginatedResponse<MockResponse>>, ApiError> {
    validate_pagination(params.skip, params.limit)?;

    let mocks = repositories::mocks::list(state.db(), params.status, params.skip, params.limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list mocks"))?;
    let total_count = repositories::mocks::count(state.db(), params.status)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count mocks"))?;

    let mut items = Vec::with_capacity(mocks.len());
    for mock in mocks {
        items.push(mock_response(&state, mock).await?);
    }

    Ok(Json(PaginatedResponse { items, total_count, skip: params.skip, limit: params.limit }))
}

async fn create_mock(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<MockCreate>,
) -> Result<(StatusCode, Json<MockResponse>), ApiError> {
    validate_payload(&payload)?;

    let save = MockSave::Create(NewMock {
        title: payload.title.trim().to_string(),
        number: payload.number,
        status: payload.status.unwrap_or(MockStatus::Pending),
        exam_date: payload.exam_date,
        duration_minutes: payload
            .duration_minutes
            .unwrap_or(state.settings().exam().default_mock_duration_minutes),
    });
    let saved = mock_activation::save_mock(state.db(), save, state.exam_today()).await?;

    tracing::info!(
        admin_id = %admin.id,
        mock_id = %saved.mock.id,
        status = ?saved.mock.status,
        "Mock created"
    );

    Ok((StatusCode::CREATED, Json(mock_response(&state, saved.mock).await?)))
}

async fn get_mock(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
) -> Result<Json<MockResponse>, ApiError> {
    let mock_id = require_id(&mock_id, "mock id")?;
    let mock = repositories::mocks::find_by_id(state.db(), mock_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch mock"))?
        .ok_or_else(|| ApiError::NotFound("Mock not found".to_string()))?;

    Ok(Json(mock_response(&state, mock).await?))
}

async fn update_mock(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    Json(payload): Json<MockUpdate>,
) -> Result<Json<MockResponse>, ApiError> {
    validate_payload(&payload)?;
    let mock_id = require_id(&mock_id, "mock id")?;

    let save = MockSave::Update {
        id: mock_id.to_string(),
        changes: MockChanges {
            title: payload.title.map(|title| title.trim().to_string()),
            number: payload.number,
            status: payload.status,
            exam_date: payload.exam_date,
            duration_minutes: payload.duration_minutes,
        },
    };
    let saved = mock_activation::save_mock(state.db(), save, state.exam_today()).await?;

    tracing::info!(
        admin_id = %admin.id,
        mock_id = %saved.mock.id,
        status = ?saved.mock.status,
        "Mock updated"
    );

    Ok(Json(mock_response(&state, saved.mock).await?))
}

async fn delete_mock(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let mock_id = require_id(&mock_id, "mock id")?;
    let deleted = repositories::mocks::delete_by_id(state.db(), mock_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete mock"))?;

    if !deleted {
        return Err(ApiError::NotFound("Mock not found".to_string()));
    }

    tracing::info!(admin_id = %admin.id, mock_id, "Mock deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn replace_mock_content(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(mock_id): Path<String>,
    Json(payload): Json<MockContentUpdate>,
) -> Result<Json<MockResponse>, ApiError> {
    let mock_id = require_id(&mock_id, "mock id")?;
    let content: MockContentIds = payload.into();

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to begin transaction"))?;

    let mock = repositories::mocks::find_by_id_for_update(&mut *tx, mock_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch mock"))?
        .ok_or_else(|| ApiError::NotFound("Mock not found".to_string()))?;

    repositories::mocks::replace_content(&mut tx, mock_id, &content).await.map_err(|e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
            ApiError::BadRequest("Unknown test id in mock content".to_string())
        }
        _ => ApiError::internal(e, "Failed to replace mock content"),
    })?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit mock content"))?;

    tracing::info!(admin_id = %admin.id, mock_id, "Mock content replaced");
    Ok(Json(MockResponse::new(mock, content)))
}

async fn mock_response(
    state: &AppState,
    mock: Mock,
) -> Result<MockResponse, ApiError> {
    let content = repositories::mocks::content_ids(state.db(), &mock.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load mock content"))?;
    Ok(MockResponse::new(mock, content))
}
