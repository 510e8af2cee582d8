use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::auth::claims::Claims;
use crate::state::AppState;

/// Why a token failed validation. Callers react differently: `Expired` means
/// re-authenticate, `Malformed` means the client sent garbage or a forgery.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at_ms: i64,
}

/// Process-wide signing state, built once from configuration and read-only
/// afterwards. The signature prevents tampering, not eavesdropping.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    default_ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let cfg = &state.config.jwt;
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            default_ttl: Duration::minutes(cfg.ttl_minutes),
        }
    }
}

impl JwtKeys {
    pub fn new(secret: &[u8], default_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            default_ttl,
        }
    }

    /// Signs a token whose subject is the principal's id in string form.
    pub fn issue(&self, principal_id: i64, ttl: Duration) -> anyhow::Result<IssuedToken> {
        let now = OffsetDateTime::now_utc();
        let exp = now + ttl;
        let claims = Claims {
            sub: principal_id.to_string(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(principal_id, "jwt signed");
        Ok(IssuedToken {
            token,
            expires_at_ms: (exp.unix_timestamp_nanos() / 1_000_000) as i64,
        })
    }

    pub fn issue_default(&self, principal_id: i64) -> anyhow::Result<IssuedToken> {
        self.issue(principal_id, self.default_ttl)
    }

    /// `Expired` exactly when the expiration claim is past; `Malformed` for
    /// empty input, structural damage, or a bad signature.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        if token.is_empty() {
            return Err(TokenError::Malformed);
        }
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        match decode::<Claims>(token, &self.decoding, &validation) {
            Ok(data) => {
                // RFC 7519 §4.1.4: a token is invalid on or after `exp`. The
                // decoder only rejects `exp < now`, so a token expired by
                // less than a second would otherwise slip through.
                if data.claims.exp as i64 <= OffsetDateTime::now_utc().unix_timestamp() {
                    return Err(TokenError::Expired);
                }
                Ok(data.claims)
            }
            Err(e) => match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => Err(TokenError::Expired),
                _ => Err(TokenError::Malformed),
            },
        }
    }

    /// Best-effort identity peek: `None` on any validation failure. Callers
    /// needing the expired/malformed distinction call `validate` themselves.
    pub fn extract_principal_id(&self, token: &str) -> Option<i64> {
        self.validate(token).ok().and_then(|c| c.sub.parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::new(b"test-secret", Duration::hours(2))
    }

    #[test]
    fn fresh_token_validates_and_carries_principal_id() {
        let keys = make_keys();
        let issued = keys.issue(42, Duration::hours(1)).expect("issue");
        let claims = keys.validate(&issued.token).expect("validate");
        assert_eq!(claims.sub, "42");
        assert_eq!(keys.extract_principal_id(&issued.token), Some(42));
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn expires_at_matches_claim() {
        let keys = make_keys();
        let issued = keys.issue(7, Duration::hours(2)).expect("issue");
        let claims = keys.validate(&issued.token).expect("validate");
        assert_eq!(issued.expires_at_ms / 1000, claims.exp as i64);
    }

    #[test]
    fn already_expired_token_fails_with_expired_not_malformed() {
        let keys = make_keys();
        let issued = keys.issue(42, Duration::seconds(-1)).expect("issue");
        assert_eq!(keys.validate(&issued.token), Err(TokenError::Expired));
        assert_eq!(keys.extract_principal_id(&issued.token), None);
    }

    #[test]
    fn token_expired_by_under_a_second_fails_with_expired() {
        let keys = make_keys();
        let issued = keys.issue(1, Duration::milliseconds(-1)).expect("issue");
        assert_eq!(keys.validate(&issued.token), Err(TokenError::Expired));
    }

    #[test]
    fn truncated_token_is_malformed() {
        let keys = make_keys();
        let issued = keys.issue(42, Duration::hours(1)).expect("issue");
        let truncated = &issued.token[..issued.token.len() - 10];
        assert_eq!(keys.validate(truncated), Err(TokenError::Malformed));
    }

    #[test]
    fn token_signed_with_other_key_is_malformed() {
        let keys = make_keys();
        let other = JwtKeys::new(b"another-secret", Duration::hours(2));
        let issued = other.issue(42, Duration::hours(1)).expect("issue");
        assert_eq!(keys.validate(&issued.token), Err(TokenError::Malformed));
    }

    #[test]
    fn empty_token_is_malformed() {
        let keys = make_keys();
        assert_eq!(keys.validate(""), Err(TokenError::Malformed));
        assert_eq!(keys.extract_principal_id(""), None);
    }

    #[tokio::test]
    async fn keys_build_from_app_state() {
        let state = crate::state::AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let issued = keys.issue_default(5).expect("issue");
        assert_eq!(keys.extract_principal_id(&issued.token), Some(5));
    }

    #[test]
    fn garbage_token_is_malformed() {
        let keys = make_keys();
        assert_eq!(keys.validate("not.a.jwt"), Err(TokenError::Malformed));
    }
}
