use mingle_core::now_rfc3339;
use mingle_sql::Value;

use crate::model::Profile;
use crate::service::{SocialError, SocialService};

impl SocialService {
    /// Add the directed edge actor→target. Idempotent: following a
    /// profile you already follow is a no-op, not an error.
    ///
    /// Self-follow is rejected at every layer, not silently ignored.
    pub fn follow(&self, actor_id: &str, target_id: &str) -> Result<(), SocialError> {
        if actor_id == target_id {
            return Err(SocialError::Validation("you cannot follow yourself".into()));
        }

        // Both endpoints must exist.
        let _: Profile = self.get_record("profiles", actor_id)?;
        let _: Profile = self.get_record("profiles", target_id)?;

        self.sql
            .exec(
                "INSERT OR IGNORE INTO follows (follower_id, followed_id, added_at) VALUES (?1, ?2, ?3)",
                &[
                    Value::Text(actor_id.to_string()),
                    Value::Text(target_id.to_string()),
                    Value::Text(now_rfc3339()),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Remove the edge actor→target if present. Idempotent no-op when absent.
    pub fn unfollow(&self, actor_id: &str, target_id: &str) -> Result<(), SocialError> {
        if actor_id == target_id {
            return Err(SocialError::Validation("you cannot follow yourself".into()));
        }

        self.sql
            .exec(
                "DELETE FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
                &[
                    Value::Text(actor_id.to_string()),
                    Value::Text(target_id.to_string()),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        Ok(())
    }

    /// True iff the edge actor→target exists.
    pub fn is_following(&self, actor_id: &str, target_id: &str) -> Result<bool, SocialError> {
        let rows = self.sql
            .query(
                "SELECT 1 AS hit FROM follows WHERE follower_id = ?1 AND followed_id = ?2",
                &[
                    Value::Text(actor_id.to_string()),
                    Value::Text(target_id.to_string()),
                ],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(!rows.is_empty())
    }

    /// Number of profiles following this one.
    pub fn followers_count(&self, profile_id: &str) -> Result<i64, SocialError> {
        self.count_edges("followed_id", profile_id)
    }

    /// Number of profiles this one follows. Derived from the same edge
    /// table as followers — never stored separately.
    pub fn following_count(&self, profile_id: &str) -> Result<i64, SocialError> {
        self.count_edges("follower_id", profile_id)
    }

    fn count_edges(&self, column: &str, profile_id: &str) -> Result<i64, SocialError> {
        let sql = format!("SELECT COUNT(*) AS cnt FROM follows WHERE {} = ?1", column);
        let rows = self.sql
            .query(&sql, &[Value::Text(profile_id.to_string())])
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        Ok(rows.first().and_then(|r| r.get_i64("cnt")).unwrap_or(0))
    }

    /// Flip the follow edge actor→target.
    /// Returns true if the actor now follows the target.
    pub fn toggle_follow(&self, actor_id: &str, target_id: &str) -> Result<bool, SocialError> {
        if self.is_following(actor_id, target_id)? {
            self.unfollow(actor_id, target_id)?;
            Ok(false)
        } else {
            self.follow(actor_id, target_id)?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::model::RegisterUser;
    use crate::service::SocialError;
    use crate::service::test_support::test_service;

    fn two_profiles(svc: &crate::service::SocialService) -> (String, String) {
        let a = svc.register(RegisterUser {
            username: "alice".to_string(),
            password: "pw".to_string(),
        }).unwrap();
        let b = svc.register(RegisterUser {
            username: "bob".to_string(),
            password: "pw".to_string(),
        }).unwrap();
        let pa = svc.get_profile_by_user(&a.id).unwrap().unwrap();
        let pb = svc.get_profile_by_user(&b.id).unwrap().unwrap();
        (pa.id, pb.id)
    }

    #[test]
    fn test_follow_sets_edge_and_counts() {
        let svc = test_service();
        let (a, b) = two_profiles(&svc);

        assert!(!svc.is_following(&a, &b).unwrap());

        svc.follow(&a, &b).unwrap();
        assert!(svc.is_following(&a, &b).unwrap());
        // The edge is directed.
        assert!(!svc.is_following(&b, &a).unwrap());
        assert_eq!(svc.followers_count(&b).unwrap(), 1);
        assert_eq!(svc.following_count(&a).unwrap(), 1);
        assert_eq!(svc.followers_count(&a).unwrap(), 0);
        assert_eq!(svc.following_count(&b).unwrap(), 0);
    }

    #[test]
    fn test_follow_is_idempotent() {
        let svc = test_service();
        let (a, b) = two_profiles(&svc);

        svc.follow(&a, &b).unwrap();
        svc.follow(&a, &b).unwrap(); // no-op, not an error

        assert_eq!(svc.followers_count(&b).unwrap(), 1);
        assert_eq!(svc.following_count(&a).unwrap(), 1);
    }

    #[test]
    fn test_unfollow_restores_counts() {
        let svc = test_service();
        let (a, b) = two_profiles(&svc);

        svc.follow(&a, &b).unwrap();
        svc.unfollow(&a, &b).unwrap();
        assert!(!svc.is_following(&a, &b).unwrap());
        assert_eq!(svc.followers_count(&b).unwrap(), 0);
        assert_eq!(svc.following_count(&a).unwrap(), 0);

        // Unfollow without a prior follow is a legal no-op.
        svc.unfollow(&a, &b).unwrap();
        assert_eq!(svc.followers_count(&b).unwrap(), 0);
    }

    #[test]
    fn test_self_follow_rejected() {
        let svc = test_service();
        let (a, _) = two_profiles(&svc);

        let err = svc.follow(&a, &a).unwrap_err();
        assert!(matches!(err, SocialError::Validation(_)));
        assert!(!svc.is_following(&a, &a).unwrap());
        assert_eq!(svc.followers_count(&a).unwrap(), 0);
    }

    #[test]
    fn test_follow_missing_profile() {
        let svc = test_service();
        let (a, _) = two_profiles(&svc);

        let err = svc.follow(&a, "nope").unwrap_err();
        assert!(matches!(err, SocialError::NotFound(_)));
    }

    #[test]
    fn test_toggle_follow() {
        let svc = test_service();
        let (a, b) = two_profiles(&svc);

        assert!(svc.toggle_follow(&a, &b).unwrap());
        assert!(svc.is_following(&a, &b).unwrap());

        assert!(!svc.toggle_follow(&a, &b).unwrap());
        assert!(!svc.is_following(&a, &b).unwrap());
    }
}
