use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub phone: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

/// Returned after register or login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at_ms: i64,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct AdminAuthResponse {
    pub token: String,
    pub expires_at_ms: i64,
    pub username: String,
    pub is_super_user: bool,
}

/// Last-known position reported by the client.
#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Serialize)]
pub struct AdminProfile {
    pub id: i64,
    pub username: String,
    pub is_super_user: bool,
}

/// Public part of a user returned to clients.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<&User> for PublicUser {
    fn from(u: &User) -> Self {
        Self {
            id: u.id,
            email: u.email.clone(),
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
        }
    }
}
