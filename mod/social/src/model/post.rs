use serde::{Deserialize, Serialize};

/// A text post. Owner and created_at are immutable after creation;
/// updated_at is bumped on every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// Text content. Never empty.
    pub content: String,

    /// Owning user id. Immutable.
    pub owner_id: String,

    /// RFC 3339 creation timestamp. Immutable.
    pub created_at: String,

    /// RFC 3339 last update timestamp.
    pub updated_at: String,
}

/// Input for creating a post.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatePost {
    #[serde(default)]
    pub content: String,
}

/// Read-time projection of a post for API responses.
///
/// `is_owner`, `is_liked` and `likes_count` depend on the viewer and
/// on the like ledger; they are computed at the presentation boundary
/// and never persisted on the post itself.
#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub content: String,
    /// Owning user id.
    pub owner: String,
    pub owner_username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_profile_image: Option<String>,
    #[serde(rename = "isOwner")]
    pub is_owner: bool,
    #[serde(rename = "isLiked")]
    pub is_liked: bool,
    pub likes_count: i64,
    pub created_at: String,
    pub updated_at: String,
}
