use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::services::banding::BandInputError;
use crate::services::content::ContentError;
use crate::services::mock_activation::{ActivationError, ServableMockError};
use crate::services::results::ResultWorkflowError;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    status: u16,
    detail: String,
}

#[derive(Debug)]
pub(crate) enum ApiError {
    Unauthorized(&'static str),
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    TooManyRequests(&'static str),
    Internal(String),
}

impl ApiError {
    /// Log the underlying error with context and return an `Internal` variant.
    pub(crate) fn internal(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Internal(context.to_string())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests(_) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            ApiError::Unauthorized(message) | ApiError::TooManyRequests(message) => {
                message.to_string()
            }
            ApiError::Internal(message) => {
                tracing::error!(error = %message, "Internal server error");
                message
            }
            ApiError::BadRequest(message)
            | ApiError::NotFound(message)
            | ApiError::Conflict(message) => message,
        };

        let mut response =
            (status, Json(ErrorResponse { status: status.as_u16(), detail })).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

impl From<BandInputError> for ApiError {
    fn from(err: BandInputError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<ActivationError> for ApiError {
    fn from(err: ActivationError) -> Self {
        match err {
            ActivationError::AnotherMockActive { .. } | ActivationError::DuplicateNumber(_) => {
                ApiError::Conflict(err.to_string())
            }
            ActivationError::ExamDateInPast { .. } => ApiError::BadRequest(err.to_string()),
            ActivationError::NotFound => ApiError::NotFound(err.to_string()),
            ActivationError::Database(err) => ApiError::internal(err, "Failed to save mock"),
        }
    }
}

impl From<ServableMockError> for ApiError {
    fn from(err: ServableMockError) -> Self {
        match err {
            ServableMockError::NotFound => ApiError::NotFound(err.to_string()),
            ServableMockError::Database(err) => {
                ApiError::internal(err, "Failed to select today's mock")
            }
        }
    }
}

impl From<ContentError> for ApiError {
    fn from(err: ContentError) -> Self {
        match err {
            ContentError::Invalid(message) => ApiError::BadRequest(message),
            ContentError::Duplicate(_) => ApiError::Conflict(err.to_string()),
            ContentError::Database(err) => ApiError::internal(err, "Failed to save content"),
        }
    }
}

impl From<ResultWorkflowError> for ApiError {
    fn from(err: ResultWorkflowError) -> Self {
        match err {
            ResultWorkflowError::InvalidScores(err) => err.into(),
            ResultWorkflowError::ExamineeNotFound | ResultWorkflowError::MockNotFound => {
                ApiError::BadRequest(err.to_string())
            }
            ResultWorkflowError::NotFound => ApiError::NotFound(err.to_string()),
            ResultWorkflowError::Database(err) => {
                ApiError::internal(err, "Failed to save test result")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use time::macros::date;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn error_body_carries_status_and_detail() {
        let response = ApiError::NotFound("Mock not found".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["status"], 404);
        assert_eq!(body["detail"], "Mock not found");
    }

    #[test]
    fn unauthorized_sets_bearer_challenge() {
        let response = ApiError::Unauthorized("Could not validate credentials").into_response();
        assert_eq!(
            response.headers().get(header::WWW_AUTHENTICATE).map(|v| v.as_bytes()),
            Some(&b"Bearer"[..])
        );
    }

    #[test]
    fn activation_errors_map_to_client_statuses() {
        let conflict: ApiError = ActivationError::AnotherMockActive { number: 3 }.into();
        assert_eq!(conflict.status(), StatusCode::CONFLICT);

        let past: ApiError =
            ActivationError::ExamDateInPast { exam_date: date!(2024 - 01 - 01) }.into();
        assert_eq!(past.status(), StatusCode::BAD_REQUEST);

        let missing: ApiError = ServableMockError::NotFound.into();
        assert!(matches!(missing, ApiError::NotFound(ref detail) if detail == "No exam is available today"));
    }
}
