use serde::{Deserialize, Serialize};

/// A public persona. Exactly one per user, created at registration
/// (or lazily via get-or-create).
///
/// Follow edges live in their own table; `followers` / `following`
/// are always derived queries over that table, never stored here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Owning user id. Unique — the 1:1 invariant lives in the schema.
    pub user_id: String,

    /// Display name.
    pub profilename: String,

    /// Contact email (optional, unique when present).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Profile image reference (URL or media id).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profileimage: Option<String>,

    /// RFC 3339 creation timestamp.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for explicitly creating a profile (POST /profile/).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateProfile {
    #[serde(default)]
    pub profilename: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub profileimage: Option<String>,
}

/// Read-time projection of a profile, enriched with the viewer's
/// relationship to it. Computed per request, never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub id: String,
    /// Owning user id.
    pub user: String,
    pub user_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    pub profilename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profileimage: Option<String>,
    pub followers_count: i64,
    pub following_count: i64,
    pub is_following: bool,
    #[serde(rename = "isOwner")]
    pub is_owner: bool,
}
