use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation::{require_id, validate_payload};
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::content::{
    ContentSummary, ListeningTestCreate, ListeningTestView, ReadingTestCreate, ReadingTestView,
    SpeakingTestCreate, SpeakingTestView, WritingTestCreate, WritingTestView,
};
use crate::schemas::format_primitive;
use crate::services::content::{self, Answers};

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/reading", get(list_reading).post(create_reading))
        .route("/reading/:test_id", get(get_reading).delete(delete_reading))
        .route("/listening", get(list_listening).post(create_listening))
        .route("/listening/:test_id", get(get_listening).delete(delete_listening))
        .route("/speaking", get(list_speaking).post(create_speaking))
        .route("/speaking/:test_id", get(get_speaking).delete(delete_speaking))
        .route("/writing", get(list_writing).post(create_writing))
        .route("/writing/:test_id", get(get_writing).delete(delete_writing))
}

fn not_found(what: &str) -> ApiError {
    ApiError::NotFound(format!("{what} not found"))
}

fn deleted(found: bool, what: &str) -> Result<StatusCode, ApiError> {
    if found {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(what))
    }
}

async fn create_reading(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ReadingTestCreate>,
) -> Result<(StatusCode, Json<ReadingTestView>), ApiError> {
    validate_payload(&payload)?;
    let test = content::create_reading_test(state.db(), &payload).await?;
    tracing::info!(admin_id = %admin.id, test_id = %test.id, "Reading test added");

    let view = content::assemble_reading_tests(state.db(), vec![test], Answers::Revealed)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load reading test"))?
        .pop()
        .ok_or_else(|| not_found("Reading test"))?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_reading(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentSummary>>, ApiError> {
    let tests = repositories::reading::list_tests(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list reading tests"))?;
    Ok(Json(
        tests
            .into_iter()
            .map(|test| ContentSummary {
                id: test.id,
                title: test.title,
                created_at: format_primitive(test.created_at),
            })
            .collect(),
    ))
}

async fn get_reading(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<ReadingTestView>, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let test = repositories::reading::find_test(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch reading test"))?
        .ok_or_else(|| not_found("Reading test"))?;

    content::assemble_reading_tests(state.db(), vec![test], Answers::Revealed)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load reading test"))?
        .pop()
        .map(Json)
        .ok_or_else(|| not_found("Reading test"))
}

async fn delete_reading(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let found = repositories::reading::delete_test(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete reading test"))?;
    if found {
        tracing::info!(admin_id = %admin.id, test_id, "Reading test deleted");
    }
    deleted(found, "Reading test")
}

async fn create_listening(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<ListeningTestCreate>,
) -> Result<(StatusCode, Json<ListeningTestView>), ApiError> {
    validate_payload(&payload)?;
    let test = content::create_listening_test(state.db(), &payload).await?;
    tracing::info!(admin_id = %admin.id, test_id = %test.id, "Listening test added");

    let view = content::assemble_listening_tests(state.db(), vec![test], Answers::Revealed)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load listening test"))?
        .pop()
        .ok_or_else(|| not_found("Listening test"))?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_listening(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentSummary>>, ApiError> {
    let tests = repositories::listening::list_tests(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list listening tests"))?;
    Ok(Json(
        tests
            .into_iter()
            .map(|test| ContentSummary {
                id: test.id,
                title: test.title,
                created_at: format_primitive(test.created_at),
            })
            .collect(),
    ))
}

async fn get_listening(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<ListeningTestView>, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let test = repositories::listening::find_test(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch listening test"))?
        .ok_or_else(|| not_found("Listening test"))?;

    content::assemble_listening_tests(state.db(), vec![test], Answers::Revealed)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load listening test"))?
        .pop()
        .map(Json)
        .ok_or_else(|| not_found("Listening test"))
}

async fn delete_listening(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let found = repositories::listening::delete_test(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete listening test"))?;
    if found {
        tracing::info!(admin_id = %admin.id, test_id, "Listening test deleted");
    }
    deleted(found, "Listening test")
}

async fn create_speaking(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<SpeakingTestCreate>,
) -> Result<(StatusCode, Json<SpeakingTestView>), ApiError> {
    validate_payload(&payload)?;
    let test = content::create_speaking_test(state.db(), &payload).await?;
    tracing::info!(admin_id = %admin.id, test_id = %test.id, "Speaking test added");

    let view = content::assemble_speaking_tests(state.db(), vec![test])
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load speaking test"))?
        .pop()
        .ok_or_else(|| not_found("Speaking test"))?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_speaking(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentSummary>>, ApiError> {
    let tests = repositories::speaking::list_tests(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list speaking tests"))?;
    Ok(Json(
        tests
            .into_iter()
            .map(|test| ContentSummary {
                id: test.id,
                title: test.title,
                created_at: format_primitive(test.created_at),
            })
            .collect(),
    ))
}

async fn get_speaking(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<SpeakingTestView>, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let test = repositories::speaking::find_test(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch speaking test"))?
        .ok_or_else(|| not_found("Speaking test"))?;

    content::assemble_speaking_tests(state.db(), vec![test])
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load speaking test"))?
        .pop()
        .map(Json)
        .ok_or_else(|| not_found("Speaking test"))
}

async fn delete_speaking(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let found = repositories::speaking::delete_test(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete speaking test"))?;
    if found {
        tracing::info!(admin_id = %admin.id, test_id, "Speaking test deleted");
    }
    deleted(found, "Speaking test")
}

async fn create_writing(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<WritingTestCreate>,
) -> Result<(StatusCode, Json<WritingTestView>), ApiError> {
    validate_payload(&payload)?;
    let test = content::create_writing_test(state.db(), &payload).await?;
    tracing::info!(admin_id = %admin.id, test_id = %test.id, "Writing test added");

    let view = content::assemble_writing_tests(state.db(), vec![test])
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load writing test"))?
        .pop()
        .ok_or_else(|| not_found("Writing test"))?;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn list_writing(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContentSummary>>, ApiError> {
    let tests = repositories::writing::list_tests(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list writing tests"))?;
    Ok(Json(
        tests
            .into_iter()
            .map(|test| ContentSummary {
                id: test.id,
                title: test.title,
                created_at: format_primitive(test.created_at),
            })
            .collect(),
    ))
}

async fn get_writing(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<WritingTestView>, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let test = repositories::writing::find_test(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch writing test"))?
        .ok_or_else(|| not_found("Writing test"))?;

    content::assemble_writing_tests(state.db(), vec![test])
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load writing test"))?
        .pop()
        .map(Json)
        .ok_or_else(|| not_found("Writing test"))
}

async fn delete_writing(
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let found = repositories::writing::delete_test(state.db(), test_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete writing test"))?;
    if found {
        tracing::info!(admin_id = %admin.id, test_id, "Writing test deleted");
    }
    deleted(found, "Writing test")
}
