use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::validation::validate_payload;
use crate::core::security;
use crate::core::state::AppState;
use crate::repositories;
use crate::schemas::auth::{AdminLogin, AdminResponse, TokenResponse};

/// Max login attempts per username per window.
const LOGIN_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const LOGIN_RATE_WINDOW_SECONDS: u64 = 60;

pub(crate) fn router() -> Router<AppState> {
    Router::new().route("/login", post(login)).route("/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLogin>,
) -> Result<Json<TokenResponse>, ApiError> {
    validate_payload(&payload)?;
    let username = payload.username.trim();

    let rate_key = format!("rl:login:{username}");
    let allowed = state
        .redis()
        .rate_limit(&rate_key, LOGIN_RATE_LIMIT, LOGIN_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if !allowed {
        return Err(ApiError::TooManyRequests("Too many login attempts, try again later"));
    }

    let admin = repositories::admins::find_by_username(state.db(), username)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load admin"))?
        .ok_or(ApiError::Unauthorized("Incorrect username or password"))?;

    let verified = security::verify_password(&payload.password, &admin.hashed_password)
        .map_err(|_| ApiError::Unauthorized("Incorrect username or password"))?;

    if !verified {
        return Err(ApiError::Unauthorized("Incorrect username or password"));
    }

    if !admin.is_active {
        return Err(ApiError::BadRequest("Inactive admin".to_string()));
    }

    let token = security::create_access_token(&admin.id, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    tracing::info!(admin_id = %admin.id, "Admin logged in");

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        admin: AdminResponse::from(admin),
    }))
}

async fn me(CurrentAdmin(admin): CurrentAdmin) -> Json<AdminResponse> {
    Json(AdminResponse::from(admin))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use tower::ServiceExt;

    use crate::test_support;

    #[tokio::test]
    async fn login_returns_token_usable_for_me() {
        let ctx = test_support::setup_test_context().await;
        test_support::insert_admin(ctx.state.db(), "examiner", "Head Examiner", "s3cret-pass").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({"username": "examiner", "password": "s3cret-pass"})),
            ))
            .await
            .expect("login");
        assert_eq!(response.status(), StatusCode::OK);
        let body = test_support::read_json(response).await;
        assert_eq!(body["token_type"], "bearer");
        let token = body["access_token"].as_str().expect("token").to_string();

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", Some(&token), None))
            .await
            .expect("me");
        assert_eq!(response.status(), StatusCode::OK);
        let body = test_support::read_json(response).await;
        assert_eq!(body["username"], "examiner");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let ctx = test_support::setup_test_context().await;
        test_support::insert_admin(ctx.state.db(), "examiner", "Head Examiner", "s3cret-pass").await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(serde_json::json!({"username": "examiner", "password": "nope"})),
            ))
            .await
            .expect("login");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn me_requires_token() {
        let ctx = test_support::setup_test_context().await;

        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(Method::GET, "/api/v1/auth/me", None, None))
            .await
            .expect("me");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn login_is_rate_limited_per_username() {
        let ctx = test_support::setup_test_context().await;

        let mut last = StatusCode::OK;
        for _ in 0..11 {
            let response = ctx
                .app
                .clone()
                .oneshot(test_support::json_request(
                    Method::POST,
                    "/api/v1/auth/login",
                    None,
                    Some(serde_json::json!({"username": "ghost", "password": "whatever"})),
                ))
                .await
                .expect("login");
            last = response.status();
        }

        assert_eq!(last, StatusCode::TOO_MANY_REQUESTS);
    }
}
