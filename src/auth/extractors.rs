use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use tracing::warn;

use crate::auth::claims::PrincipalKind;
use crate::auth::jwt::{JwtKeys, TokenError};
use crate::auth::repo::Admin;
use crate::auth::services::{resolve_principal, Principal};
use crate::error::ApiError;
use crate::state::AppState;

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(ApiError::Unauthorized)?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .ok_or(ApiError::Unauthorized)
}

fn token_error(e: TokenError) -> ApiError {
    match e {
        TokenError::Expired => ApiError::TokenExpired,
        TokenError::Malformed => ApiError::TokenMalformed,
    }
}

/// Validates the bearer token and resolves it against the user store.
pub struct AuthUser(pub i64);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let keys = JwtKeys::from_ref(state);
        keys.validate(token).map_err(token_error)?;

        match resolve_principal(&state.db, &keys, token, PrincipalKind::User).await? {
            Some(Principal::User(user)) => Ok(AuthUser(user.id)),
            _ => {
                warn!("token valid but user not found");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

/// Validates the bearer token and resolves it against the admin store.
pub struct AuthAdmin(pub Admin);

#[async_trait]
impl FromRequestParts<AppState> for AuthAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let keys = JwtKeys::from_ref(state);
        keys.validate(token).map_err(token_error)?;

        match resolve_principal(&state.db, &keys, token, PrincipalKind::Admin).await? {
            Some(Principal::Admin(admin)) => Ok(AuthAdmin(admin)),
            _ => {
                warn!("token valid but admin not found");
                Err(ApiError::Unauthorized)
            }
        }
    }
}
