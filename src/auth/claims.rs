use serde::{Deserialize, Serialize};

/// Which principal store a token's subject resolves against. The token
/// itself carries no type tag, so the caller must supply this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    User,
    Admin,
}

/// JWT payload. The subject is the string form of the principal's numeric id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // principal id
    pub iat: usize,  // issued at (unix timestamp)
    pub exp: usize,  // expires at (unix timestamp)
}
