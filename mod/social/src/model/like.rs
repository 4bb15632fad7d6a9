use serde::{Deserialize, Serialize};

/// A like fact: user X liked post Y.
///
/// The (post_id, owner_id) pair is unique in the schema. A like is
/// created on toggle-on and deleted on toggle-off, never updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Like {
    /// Unique identifier (UUIDv4, no dashes).
    pub id: String,

    /// The liked post.
    pub post_id: String,

    /// The user who liked it.
    pub owner_id: String,

    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// Result of a like toggle. The caller cannot force an end state,
/// only flip the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeOutcome {
    Liked,
    Unliked,
}
