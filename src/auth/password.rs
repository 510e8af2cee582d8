use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;
use tracing::error;

/// Hashes a password with a fresh random salt. Returns `None` for an empty
/// password: no hash is produced and no error is raised, callers must treat
/// the account as having no usable credential.
pub fn hash_password(plain: &str) -> Option<String> {
    if plain.is_empty() {
        return None;
    }
    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(plain.as_bytes(), &salt) {
        Ok(hash) => Some(hash.to_string()),
        Err(e) => {
            error!(error = %e, "argon2 hash_password error");
            None
        }
    }
}

/// Verifies a password against a stored hash. Never errors: empty password,
/// empty or malformed hash, and plain mismatch all return `false`.
pub fn verify_password(plain: &str, hash: &str) -> bool {
    if plain.is_empty() || hash.is_empty() {
        return false;
    }
    let parsed = match PasswordHash::new(hash) {
        Ok(p) => p,
        Err(_) => return false,
    };
    Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let password = "Secur3P@ssw0rd!";
        let hash = hash_password(password).expect("hashing should produce a hash");
        assert!(verify_password(password, &hash));
    }

    #[test]
    fn salts_differ_between_calls() {
        let h1 = hash_password("same-password").unwrap();
        let h2 = hash_password("same-password").unwrap();
        assert_ne!(h1, h2);
        assert!(verify_password("same-password", &h1));
        assert!(verify_password("same-password", &h2));
    }

    #[test]
    fn hashes_verify_only_against_their_own_password() {
        let h1 = hash_password("first-password").unwrap();
        let h2 = hash_password("second-password").unwrap();
        assert!(!verify_password("first-password", &h2));
        assert!(!verify_password("second-password", &h1));
    }

    #[test]
    fn empty_password_produces_no_hash() {
        assert!(hash_password("").is_none());
    }

    #[test]
    fn verify_is_false_for_empty_inputs() {
        let hash = hash_password("something").unwrap();
        assert!(!verify_password("", &hash));
        assert!(!verify_password("something", ""));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn verify_is_false_for_malformed_hash() {
        assert!(!verify_password("anything", "not-a-valid-hash"));
    }
}
