use lazy_static::lazy_static;
use regex::Regex;
use sqlx::PgPool;
use tracing::warn;

use crate::auth::claims::PrincipalKind;
use crate::auth::jwt::{IssuedToken, JwtKeys};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo::{Admin, NewUser, User};
use crate::error::{is_unique_violation, ApiError};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// An authenticated identity, either a user or a global admin.
#[derive(Debug, Clone)]
pub enum Principal {
    User(User),
    Admin(Admin),
}

pub struct Registration {
    pub email: String,
    pub phone: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

pub async fn register_user(
    db: &PgPool,
    keys: &JwtKeys,
    mut reg: Registration,
) -> Result<(User, IssuedToken), ApiError> {
    reg.email = reg.email.trim().to_lowercase();

    if !is_valid_email(&reg.email) {
        return Err(ApiError::Validation("invalid email".into()));
    }
    if reg.password.len() < 8 {
        return Err(ApiError::Validation("password too short".into()));
    }
    if reg.phone.trim().is_empty() {
        return Err(ApiError::Validation("phone is required".into()));
    }

    let hash = hash_password(&reg.password)
        .ok_or_else(|| ApiError::Validation("password is required".into()))?;

    let user = User::create(
        db,
        NewUser {
            email: &reg.email,
            phone: reg.phone.trim(),
            password_hash: Some(&hash),
            first_name: reg.first_name.trim(),
            last_name: reg.last_name.trim(),
        },
    )
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            let field = match e.as_database_error().and_then(|d| d.constraint()) {
                Some("users_phone_key") => "phone",
                _ => "email",
            };
            warn!(email = %reg.email, field, "registration conflict");
            ApiError::AlreadyInUse(field)
        } else {
            e.into()
        }
    })?;

    let issued = keys.issue_default(user.id)?;
    Ok((user, issued))
}

/// Verifies user credentials and issues a token. Unknown email and wrong
/// password both yield `Unauthorized`, indistinguishably.
pub async fn login_user(
    db: &PgPool,
    keys: &JwtKeys,
    email: &str,
    password: &str,
) -> Result<(User, IssuedToken), ApiError> {
    let email = email.trim().to_lowercase();
    let user = User::find_by_email(db, &email)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    let ok = user
        .password_hash
        .as_deref()
        .map_or(false, |hash| verify_password(password, hash));
    if !ok {
        warn!(email = %email, "login failed");
        return Err(ApiError::Unauthorized);
    }

    let issued = keys.issue_default(user.id)?;
    Ok((user, issued))
}

pub async fn login_admin(
    db: &PgPool,
    keys: &JwtKeys,
    username: &str,
    password: &str,
) -> Result<(Admin, IssuedToken), ApiError> {
    let admin = Admin::find_by_username(db, username)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !verify_password(password, &admin.password_hash) {
        warn!(username, "admin login failed");
        return Err(ApiError::Unauthorized);
    }

    let issued = keys.issue_default(admin.id)?;
    Ok((admin, issued))
}

/// Resolves a token's subject against the store named by `kind`. Returns
/// `None` both for a failed validation and for a subject that no longer
/// exists; callers wanting the expired/malformed distinction use `validate`.
pub async fn resolve_principal(
    db: &PgPool,
    keys: &JwtKeys,
    token: &str,
    kind: PrincipalKind,
) -> sqlx::Result<Option<Principal>> {
    let Some(id) = keys.extract_principal_id(token) else {
        return Ok(None);
    };
    let principal = match kind {
        PrincipalKind::User => User::find_by_id(db, id).await?.map(Principal::User),
        PrincipalKind::Admin => Admin::find_by_id(db, id).await?.map(Principal::Admin),
    };
    Ok(principal)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@example.co.uk"));
    }

    #[test]
    fn rejects_junk() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("no-at-sign"));
        assert!(!is_valid_email("two@@example.com "));
        assert!(!is_valid_email("spaces in@example.com"));
    }
}
