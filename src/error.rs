use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Domain-level failure kinds. Expected conditions travel through these;
/// only misconfiguration and unavailable storage end up as `Internal`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid credentials or missing token")]
    Unauthorized,
    #[error("token expired")]
    TokenExpired,
    #[error("malformed token")]
    TokenMalformed,
    #[error("insufficient household rights")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0} already in use")]
    AlreadyInUse(&'static str),
    #[error("user is already a member of this household")]
    AlreadyMember,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized | ApiError::TokenExpired | ApiError::TokenMalformed => {
                StatusCode::UNAUTHORIZED
            }
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::AlreadyInUse(_) | ApiError::AlreadyMember => StatusCode::CONFLICT,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Internal(e.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if let ApiError::Internal(e) = &self {
            error!(error = %e, "internal error");
            "internal server error".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Postgres unique-constraint violation (SQLSTATE 23505); services map these
/// to `AlreadyInUse` / `AlreadyMember` instead of leaking storage errors.
pub fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .and_then(|d| d.code())
        .map_or(false, |c| c == "23505")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kinds_map_to_expected_statuses() {
        assert_eq!(ApiError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenExpired.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::TokenMalformed.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::NotFound("household").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::AlreadyInUse("email").status(), StatusCode::CONFLICT);
        assert_eq!(ApiError::AlreadyMember.status(), StatusCode::CONFLICT);
        assert_eq!(
            ApiError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn internal_errors_hide_their_message() {
        let resp = ApiError::Internal(anyhow::anyhow!("connection refused")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
