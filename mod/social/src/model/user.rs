use serde::{Deserialize, Serialize};

/// A login identity. Exactly one Profile exists per user.
///
/// The password hash is part of the stored document but never leaves
/// the service layer — API responses are built from views or selected
/// fields, never by serializing a `User` directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Login name. Unique across all users.
    pub username: String,

    /// Email address (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Argon2id PHC-format password hash.
    pub password_hash: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for registering a new user.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUser {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}
