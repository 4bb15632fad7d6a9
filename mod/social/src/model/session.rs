use serde::{Deserialize, Serialize};

/// A token issuance record. One per login; revoked on refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// The user the tokens were issued to.
    pub user_id: String,

    /// Whether the session (and its tokens) has been revoked.
    #[serde(default)]
    pub revoked: bool,

    /// RFC 3339 issuance timestamp.
    pub issued_at: String,

    /// RFC 3339 expiry of the refresh token.
    pub expires_at: String,
}

/// JWT claims payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id.
    pub sub: String,
    /// Login name, for logging and display.
    pub username: String,
    /// Session id.
    pub sid: String,
    /// Token kind: "access" or "refresh". Access endpoints reject
    /// refresh tokens and vice versa.
    pub typ: String,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiration (unix timestamp).
    pub exp: i64,
}

/// Access + refresh token pair returned by login and refresh.
#[derive(Debug, Clone, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}
