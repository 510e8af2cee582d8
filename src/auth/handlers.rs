use axum::extract::{FromRef, State};
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tracing::{info, instrument};

use crate::auth::dto::{
    AdminAuthResponse, AdminLoginRequest, AdminProfile, AuthResponse, LoginRequest,
    PositionRequest, PublicUser, RegisterRequest,
};
use crate::auth::extractors::{AuthAdmin, AuthUser};
use crate::auth::jwt::JwtKeys;
use crate::auth::repo::User;
use crate::auth::services::{login_admin, login_user, register_user, Registration};
use crate::error::ApiError;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/admin/login", post(admin_login))
        .route("/auth/admin/me", get(admin_me))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/me/position", put(update_position))
}

#[instrument(skip(state, payload))]
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let (user, issued) = register_user(
        &state.db,
        &keys,
        Registration {
            email: payload.email,
            phone: payload.phone,
            password: payload.password,
            first_name: payload.first_name,
            last_name: payload.last_name,
        },
    )
    .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok(Json(AuthResponse {
        token: issued.token,
        expires_at_ms: issued.expires_at_ms,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, payload))]
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let (user, issued) = login_user(&state.db, &keys, &payload.email, &payload.password).await?;

    info!(user_id = user.id, email = %user.email, "user logged in");
    Ok(Json(AuthResponse {
        token: issued.token,
        expires_at_ms: issued.expires_at_ms,
        user: PublicUser::from(&user),
    }))
}

#[instrument(skip(state, payload))]
async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<AdminAuthResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let (admin, issued) =
        login_admin(&state.db, &keys, &payload.username, &payload.password).await?;

    info!(admin_id = admin.id, username = %admin.username, "admin logged in");
    Ok(Json(AdminAuthResponse {
        token: issued.token,
        expires_at_ms: issued.expires_at_ms,
        username: admin.username,
        is_super_user: admin.is_super_user,
    }))
}

#[instrument(skip(state))]
async fn get_me(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(ApiError::NotFound("user"))?;
    Ok(Json(PublicUser::from(&user)))
}

#[instrument(skip_all)]
async fn admin_me(AuthAdmin(admin): AuthAdmin) -> Json<AdminProfile> {
    Json(AdminProfile {
        id: admin.id,
        username: admin.username,
        is_super_user: admin.is_super_user,
    })
}

#[instrument(skip(state, payload))]
async fn update_position(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<PositionRequest>,
) -> Result<StatusCode, ApiError> {
    User::update_position(&state.db, user_id, payload.latitude, payload.longitude).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_user_serializes_without_password_hash() {
        let user = PublicUser {
            id: 1,
            email: "test@example.com".to_string(),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("test@example.com"));
        assert!(!json.contains("password"));
    }
}
