use mingle_core::{merge_patch, new_id, now_rfc3339};
use mingle_sql::Value;

use crate::model::{CreatePost, Post, PostView, User};
use crate::service::{SocialError, SocialService};

impl SocialService {
    /// Create a new post owned by the given user.
    pub fn create_post(&self, owner_id: &str, input: CreatePost) -> Result<Post, SocialError> {
        if input.content.trim().is_empty() {
            return Err(SocialError::Validation("content must not be empty".into()));
        }

        let now = now_rfc3339();
        let post = Post {
            id: new_id(),
            content: input.content,
            owner_id: owner_id.to_string(),
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "posts",
            &post.id,
            &post,
            &[
                ("owner_id", Value::Text(post.owner_id.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )?;
        Ok(post)
    }

    /// Get a post by id.
    pub fn get_post(&self, id: &str) -> Result<Post, SocialError> {
        self.get_record("posts", id)
    }

    /// Update a post with JSON merge-patch semantics.
    /// Only the owner may edit; owner and created_at are immutable.
    pub fn update_post(
        &self,
        id: &str,
        requester_id: &str,
        patch: serde_json::Value,
    ) -> Result<Post, SocialError> {
        let current: Post = self.get_record("posts", id)?;
        if current.owner_id != requester_id {
            return Err(SocialError::Forbidden(
                "you do not have permission to edit this post".into(),
            ));
        }

        let now = now_rfc3339();
        let mut base = serde_json::to_value(&current)
            .map_err(|e| SocialError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        base["updated_at"] = serde_json::json!(now);
        base["id"] = serde_json::json!(current.id);
        base["owner_id"] = serde_json::json!(current.owner_id);
        base["created_at"] = serde_json::json!(current.created_at);

        // A patch that nulls or mistypes a required field is client
        // input, not a server fault.
        let updated: Post = serde_json::from_value(base)
            .map_err(|e| SocialError::Validation(format!("invalid patch: {}", e)))?;

        if updated.content.trim().is_empty() {
            return Err(SocialError::Validation("content must not be empty".into()));
        }

        self.update_record(
            "posts",
            id,
            &updated,
            &[("updated_at", Value::Text(now))],
        )?;
        Ok(updated)
    }

    /// Delete a post. Only the owner may delete; the post's likes are
    /// removed first so no stale like facts survive.
    pub fn delete_post(&self, id: &str, requester_id: &str) -> Result<(), SocialError> {
        let post: Post = self.get_record("posts", id)?;
        if post.owner_id != requester_id {
            return Err(SocialError::Forbidden(
                "not authorized to delete this post".into(),
            ));
        }

        self.sql
            .exec(
                "DELETE FROM likes WHERE post_id = ?1",
                &[Value::Text(id.to_string())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        self.delete_record("posts", id)
    }

    /// Project a post into its API view for the given viewer.
    ///
    /// is_owner / is_liked / likes_count and the owner's display data
    /// are computed at request time from current state.
    pub fn project_post(&self, viewer_id: &str, post: &Post) -> Result<PostView, SocialError> {
        let owner: User = self.get_record("users", &post.owner_id)?;
        let owner_profile = self.get_profile_by_user(&post.owner_id)?;

        Ok(PostView {
            id: post.id.clone(),
            content: post.content.clone(),
            owner: post.owner_id.clone(),
            owner_username: owner.username,
            owner_profile_image: owner_profile.and_then(|p| p.profileimage),
            is_owner: post.owner_id == viewer_id,
            is_liked: self.is_liked(&post.id, viewer_id)?,
            likes_count: self.likes_count(&post.id)?,
            created_at: post.created_at.clone(),
            updated_at: post.updated_at.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::RegisterUser;
    use crate::service::test_support::test_service;

    fn register(svc: &SocialService, name: &str) -> User {
        svc.register(RegisterUser {
            username: name.to_string(),
            password: "pw".to_string(),
        })
        .unwrap()
    }

    #[test]
    fn test_create_and_get_post() {
        let svc = test_service();
        let alice = register(&svc, "alice");

        let post = svc.create_post(&alice.id, CreatePost { content: "hi".into() }).unwrap();
        assert_eq!(post.owner_id, alice.id);
        assert_eq!(post.created_at, post.updated_at);

        let fetched = svc.get_post(&post.id).unwrap();
        assert_eq!(fetched.content, "hi");
    }

    #[test]
    fn test_create_post_rejects_empty_content() {
        let svc = test_service();
        let alice = register(&svc, "alice");

        let err = svc.create_post(&alice.id, CreatePost { content: "   ".into() }).unwrap_err();
        assert!(matches!(err, SocialError::Validation(_)));
    }

    #[test]
    fn test_update_post_owner_only() {
        let svc = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");

        let post = svc.create_post(&alice.id, CreatePost { content: "v1".into() }).unwrap();

        let err = svc
            .update_post(&post.id, &bob.id, serde_json::json!({"content": "hacked"}))
            .unwrap_err();
        assert!(matches!(err, SocialError::Forbidden(_)));

        let updated = svc
            .update_post(&post.id, &alice.id, serde_json::json!({"content": "v2"}))
            .unwrap();
        assert_eq!(updated.content, "v2");
        assert_eq!(updated.owner_id, alice.id);
        assert_eq!(updated.created_at, post.created_at);
    }

    #[test]
    fn test_update_post_null_content_is_validation() {
        let svc = test_service();
        let alice = register(&svc, "alice");

        let post = svc.create_post(&alice.id, CreatePost { content: "v1".into() }).unwrap();
        let err = svc
            .update_post(&post.id, &alice.id, serde_json::json!({"content": null}))
            .unwrap_err();
        assert!(matches!(err, SocialError::Validation(_)));

        // The post is untouched.
        assert_eq!(svc.get_post(&post.id).unwrap().content, "v1");
    }

    #[test]
    fn test_update_post_ignores_owner_patch() {
        let svc = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");

        let post = svc.create_post(&alice.id, CreatePost { content: "mine".into() }).unwrap();
        let updated = svc
            .update_post(&post.id, &alice.id, serde_json::json!({"owner_id": bob.id}))
            .unwrap();
        assert_eq!(updated.owner_id, alice.id);
    }

    #[test]
    fn test_delete_post_owner_only_and_cascades_likes() {
        let svc = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");

        let post = svc.create_post(&alice.id, CreatePost { content: "hi".into() }).unwrap();
        svc.toggle_like(&post.id, &bob.id).unwrap();
        assert_eq!(svc.likes_count(&post.id).unwrap(), 1);

        let err = svc.delete_post(&post.id, &bob.id).unwrap_err();
        assert!(matches!(err, SocialError::Forbidden(_)));

        svc.delete_post(&post.id, &alice.id).unwrap();
        assert!(matches!(svc.get_post(&post.id), Err(SocialError::NotFound(_))));

        // No stale like facts survive the cascade.
        assert_eq!(svc.likes_count(&post.id).unwrap(), 0);
        assert!(!svc.is_liked(&post.id, &bob.id).unwrap());
    }

    #[test]
    fn test_projection_fields() {
        let svc = test_service();
        let alice = register(&svc, "alice");
        let bob = register(&svc, "bob");

        svc.update_profile(&alice.id, serde_json::json!({"profileimage": "/img/a.png"}))
            .unwrap();
        let post = svc.create_post(&alice.id, CreatePost { content: "hi".into() }).unwrap();
        svc.toggle_like(&post.id, &bob.id).unwrap();

        let view = svc.project_post(&bob.id, &post).unwrap();
        assert!(!view.is_owner);
        assert!(view.is_liked);
        assert_eq!(view.likes_count, 1);
        assert_eq!(view.owner_username, "alice");
        assert_eq!(view.owner_profile_image.as_deref(), Some("/img/a.png"));

        let own = svc.project_post(&alice.id, &post).unwrap();
        assert!(own.is_owner);
        assert!(!own.is_liked);
    }
}
