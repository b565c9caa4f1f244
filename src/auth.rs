use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::model::Role;

/// Bearer-token lifetime: one day, matching what the login flow promises.
const TOKEN_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject — the authenticated user's id.
    pub sub: Ulid,
    pub role: Role,
    /// Expiry, seconds since the Unix epoch.
    pub exp: u64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AuthError {
    /// No bearer token on the request.
    Missing,
    /// Token present but expired, malformed, or signed with another key.
    Invalid,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::Missing => write!(f, "No token provided"),
            AuthError::Invalid => write!(f, "Invalid token"),
        }
    }
}

impl std::error::Error for AuthError {}

/// The one authentication gate. Every protected endpoint verifies its
/// bearer token here instead of re-decoding JWTs per route module.
pub struct AuthGate {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl AuthGate {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, subject: Ulid, role: Role) -> Result<String, AuthError> {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_secs();
        let claims = Claims {
            sub: subject,
            role,
            exp: now + TOKEN_TTL_SECS,
        };
        encode(&Header::default(), &claims, &self.encoding).map_err(|_| AuthError::Invalid)
    }

    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|_| AuthError::Invalid)
    }

    /// Extract the token from an `Authorization` header value.
    pub fn bearer(header: Option<&str>) -> Result<&str, AuthError> {
        let header = header.ok_or(AuthError::Missing)?;
        header.split_whitespace().nth(1).ok_or(AuthError::Invalid)
    }
}

pub fn hash_password(password: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(password, 10)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}
