use mingle_core::{new_id, now_rfc3339};
use mingle_sql::Value;

use crate::model::{Like, LikeOutcome, Post};
use crate::service::{SocialError, SocialService};

impl SocialService {
    /// Flip the like fact (post, owner).
    ///
    /// Delete-first: if a row was removed the caller had a like and it
    /// is now gone; otherwise insert, and if the insert was ignored
    /// (lost a race to a concurrent toggle) remove the winner's row.
    /// Concurrent toggles always land on a single row or none.
    pub fn toggle_like(&self, post_id: &str, owner_id: &str) -> Result<LikeOutcome, SocialError> {
        let _: Post = self.get_record("posts", post_id)?;

        let removed = self.sql
            .exec(
                "DELETE FROM likes WHERE post_id = ?1 AND owner_id = ?2",
                &[
                    Value::Text(post_id.to_string()),
                    Value::Text(owner_id.to_string()),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        if removed > 0 {
            return Ok(LikeOutcome::Unliked);
        }

        let like = Like {
            id: new_id(),
            post_id: post_id.to_string(),
            owner_id: owner_id.to_string(),
            created_at: now_rfc3339(),
        };
        let data = serde_json::to_string(&like)
            .map_err(|e| SocialError::Internal(e.to_string()))?;

        let inserted = self.sql
            .exec(
                "INSERT OR IGNORE INTO likes (id, data, post_id, owner_id, created_at) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                &[
                    Value::Text(like.id),
                    Value::Text(data),
                    Value::Text(like.post_id),
                    Value::Text(like.owner_id),
                    Value::Text(like.created_at),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        if inserted > 0 {
            return Ok(LikeOutcome::Liked);
        }

        // A concurrent toggle inserted first; finish as an unlike.
        self.sql
            .exec(
                "DELETE FROM likes WHERE post_id = ?1 AND owner_id = ?2",
                &[
                    Value::Text(post_id.to_string()),
                    Value::Text(owner_id.to_string()),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(LikeOutcome::Unliked)
    }

    /// True iff the like fact (post, owner) exists.
    pub fn is_liked(&self, post_id: &str, owner_id: &str) -> Result<bool, SocialError> {
        let rows = self.sql
            .query(
                "SELECT 1 AS hit FROM likes WHERE post_id = ?1 AND owner_id = ?2",
                &[
                    Value::Text(post_id.to_string()),
                    Value::Text(owner_id.to_string()),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(!rows.is_empty())
    }

    /// Number of distinct users who currently like this post.
    pub fn likes_count(&self, post_id: &str) -> Result<i64, SocialError> {
        let rows = self.sql
            .query(
                "SELECT COUNT(*) AS cnt FROM likes WHERE post_id = ?1",
                &[Value::Text(post_id.to_string())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CreatePost, RegisterUser, User};
    use crate::service::test_support::test_service;

    fn register(svc: &SocialService, name: &str) -> User {
        svc.register(RegisterUser {
            username: name.to_string(),
            password: "pw".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_toggle_like_alternates() {
        let svc = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");
        let post = svc.create_post(&alice.id, CreatePost { content: "hi".into() }).unwrap();

        assert!(matches!(svc.toggle_like(&post.id, &bob.id).unwrap(), LikeOutcome::Liked));
        assert!(svc.is_liked(&post.id, &bob.id).unwrap());
        assert_eq!(svc.likes_count(&post.id).unwrap(), 1);

        assert!(matches!(svc.toggle_like(&post.id, &bob.id).unwrap(), LikeOutcome::Unliked));
        assert!(!svc.is_liked(&post.id, &bob.id).unwrap());
        assert_eq!(svc.likes_count(&post.id).unwrap(), 0);

        assert!(matches!(svc.toggle_like(&post.id, &bob.id).unwrap(), LikeOutcome::Liked));
        assert_eq!(svc.likes_count(&post.id).unwrap(), 1);
    }

    #[test]
    fn test_like_counts_distinct_users() {
        let svc = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");
        let carol = register(&svc, "carol");
        let post = svc.create_post(&alice.id, CreatePost { content: "hi".into() }).unwrap();

        svc.toggle_like(&post.id, &bob.id).unwrap();
        svc.toggle_like(&post.id, &carol.id).unwrap();
        svc.toggle_like(&post.id, &alice.id).unwrap(); // liking own post is fine
        assert_eq!(svc.likes_count(&post.id).unwrap(), 3);

        svc.toggle_like(&post.id, &carol.id).unwrap();
        assert_eq!(svc.likes_count(&post.id).unwrap(), 2);
        assert!(svc.is_liked(&post.id, &bob.id).unwrap());
        assert!(!svc.is_liked(&post.id, &carol.id).unwrap());
    }

    #[test]
    fn test_like_missing_post() {
        let svc = test_service();
        let bob = register(&svc, "bob");

        let err = svc.toggle_like("nope", &bob.id).unwrap_err();
        assert!(matches!(err, SocialError::NotFound(_)));
    }
}
