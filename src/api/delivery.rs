//! Public content delivery. Everything here is served from the one mock that is active
//! and dated today; correct answers never leave through these routes.

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::validation::require_id;
use crate::core::state::AppState;
use crate::db::models::Mock;
use crate::repositories;
use crate::repositories::mocks::MockContentIds;
use crate::schemas::content::{
    ListeningSectionView, ListeningTestView, PassageView, ReadingTestView, SpeakingTestView,
    WritingTestView,
};
use crate::schemas::mock::TodayMockResponse;
use crate::services::content::{self, Answers};
use crate::services::mock_activation;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/today", get(today_mock))
        .route("/reading", get(reading_tests))
        .route("/reading/:test_id/passages", get(reading_passages))
        .route("/reading/:test_id/passage/:order", get(reading_passage))
        .route("/listening", get(listening_tests))
        .route("/listening/:test_id/section/:section_number", get(listening_section))
        .route("/speaking", get(speaking_tests))
        .route("/writing", get(writing_tests))
}

async fn servable(state: &AppState) -> Result<Mock, ApiError> {
    Ok(mock_activation::select_servable_mock(state.db(), state.exam_today()).await?)
}

async fn servable_content(state: &AppState) -> Result<MockContentIds, ApiError> {
    let mock = servable(state).await?;
    repositories::mocks::content_ids(state.db(), &mock.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load mock content"))
}

fn ensure_linked(linked: &[String], test_id: &str, what: &str) -> Result<(), ApiError> {
    if linked.iter().any(|id| id == test_id) {
        Ok(())
    } else {
        Err(ApiError::NotFound(format!("{what} not found in today's exam")))
    }
}

async fn today_mock(State(state): State<AppState>) -> Result<Json<TodayMockResponse>, ApiError> {
    let mock = servable(&state).await?;
    let content = repositories::mocks::content_ids(state.db(), &mock.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load mock content"))?;

    Ok(Json(TodayMockResponse::new(mock, content)))
}

async fn reading_tests(
    State(state): State<AppState>,
) -> Result<Json<Vec<ReadingTestView>>, ApiError> {
    let mock = servable(&state).await?;
    let tests = repositories::reading::list_tests_for_mock(state.db(), &mock.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list reading tests"))?;
    let views = content::assemble_reading_tests(state.db(), tests, Answers::Hidden)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load reading tests"))?;

    Ok(Json(views))
}

async fn reading_passages(
    State(state): State<AppState>,
    Path(test_id): Path<String>,
) -> Result<Json<Vec<PassageView>>, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let linked = servable_content(&state).await?;
    ensure_linked(&linked.reading, test_id, "Reading test")?;

    let passages = repositories::reading::passages_for_tests(state.db(), &[test_id.to_string()])
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list passages"))?;
    let views = content::assemble_passages(state.db(), passages, Answers::Hidden)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load passages"))?;

    Ok(Json(views))
}

async fn reading_passage(
    State(state): State<AppState>,
    Path((test_id, order)): Path<(String, i32)>,
) -> Result<Json<PassageView>, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let linked = servable_content(&state).await?;
    ensure_linked(&linked.reading, test_id, "Reading test")?;

    let passage = repositories::reading::find_passage(state.db(), test_id, order)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch passage"))?
        .ok_or_else(|| ApiError::NotFound("Passage not found".to_string()))?;

    content::assemble_passages(state.db(), vec![passage], Answers::Hidden)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load passage"))?
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Passage not found".to_string()))
}

async fn listening_tests(
    State(state): State<AppState>,
) -> Result<Json<Vec<ListeningTestView>>, ApiError> {
    let mock = servable(&state).await?;
    let tests = repositories::listening::list_tests_for_mock(state.db(), &mock.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list listening tests"))?;
    let views = content::assemble_listening_tests(state.db(), tests, Answers::Hidden)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load listening tests"))?;

    Ok(Json(views))
}

async fn listening_section(
    State(state): State<AppState>,
    Path((test_id, section_number)): Path<(String, i32)>,
) -> Result<Json<ListeningSectionView>, ApiError> {
    let test_id = require_id(&test_id, "test id")?;
    let linked = servable_content(&state).await?;
    ensure_linked(&linked.listening, test_id, "Listening test")?;

    let section = repositories::listening::find_section(state.db(), test_id, section_number)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch section"))?
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))?;

    content::assemble_sections(state.db(), vec![section], Answers::Hidden)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load section"))?
        .pop()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Section not found".to_string()))
}

async fn speaking_tests(
    State(state): State<AppState>,
) -> Result<Json<Vec<SpeakingTestView>>, ApiError> {
    let mock = servable(&state).await?;
    let tests = repositories::speaking::list_tests_for_mock(state.db(), &mock.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list speaking tests"))?;
    let views = content::assemble_speaking_tests(state.db(), tests)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load speaking tests"))?;

    Ok(Json(views))
}

async fn writing_tests(
    State(state): State<AppState>,
) -> Result<Json<Vec<WritingTestView>>, ApiError> {
    let mock = servable(&state).await?;
    let tests = repositories::writing::list_tests_for_mock(state.db(), &mock.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list writing tests"))?;
    let views = content::assemble_writing_tests(state.db(), tests)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load writing tests"))?;

    Ok(Json(views))
}

#[cfg(test)]
mod tests;
