use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

use crate::api::errors::ApiError;
use crate::core::{security, state::AppState};
use crate::db::models::Admin;
use crate::repositories;

/// An authenticated, active administrator.
pub(crate) struct CurrentAdmin(pub(crate) Admin);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token =
            bearer_token(parts).ok_or(ApiError::Unauthorized("Invalid authentication credentials"))?;

        let claims = security::verify_token(token, state.settings())
            .map_err(|_| ApiError::Unauthorized("Invalid authentication credentials"))?;

        let admin = repositories::admins::find_by_id(state.db(), &claims.sub)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load admin"))?;

        match admin {
            Some(admin) if admin.is_active => Ok(CurrentAdmin(admin)),
            Some(_) => Err(ApiError::Unauthorized("Invalid authentication credentials")),
            None => Err(ApiError::Unauthorized("Admin not found")),
        }
    }
}
