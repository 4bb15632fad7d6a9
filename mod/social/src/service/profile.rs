use mingle_core::{merge_patch, new_id, now_rfc3339};
use mingle_sql::Value;

use crate::model::{CreateProfile, Profile, ProfileView, User};
use crate::service::{SocialError, SocialService};

/// Profile search is capped at a small fixed number of hits.
const SEARCH_LIMIT: i64 = 4;

impl SocialService {
    /// Get the profile for a user, creating it if absent.
    ///
    /// Safe under concurrent first-time calls: the insert relies on the
    /// UNIQUE(user_id) constraint, and on conflict the winner's row is
    /// re-fetched. At most one profile ever exists per identity.
    pub fn get_or_create_profile(&self, user: &User) -> Result<Profile, SocialError> {
        if let Some(existing) = self.get_profile_by_user(&user.id)? {
            return Ok(existing);
        }

        let now = now_rfc3339();
        let profile = Profile {
            id: new_id(),
            user_id: user.id.clone(),
            profilename: user.username.clone(),
            email: None,
            profileimage: None,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        match self.insert_profile(&profile) {
            Ok(()) => Ok(profile),
            // Lost the race: another request created the row first.
            Err(SocialError::Conflict(_)) => self
                .get_profile_by_user(&user.id)?
                .ok_or_else(|| SocialError::Internal("profile vanished after conflict".into())),
            Err(e) => Err(e),
        }
    }

    /// Explicitly create a profile for a user (POST /profile/).
    /// Fails with `Conflict` if one already exists.
    pub fn create_profile(
        &self,
        user: &User,
        input: CreateProfile,
    ) -> Result<Profile, SocialError> {
        let now = now_rfc3339();
        let profile = Profile {
            id: new_id(),
            user_id: user.id.clone(),
            profilename: input
                .profilename
                .unwrap_or_else(|| user.username.clone()),
            email: input.email,
            profileimage: input.profileimage,
            created_at: now.clone(),
            updated_at: now,
        };

        self.insert_profile(&profile).map_err(|e| match e {
            SocialError::Conflict(m) if m.contains("user_id") => {
                SocialError::Conflict("profile already exists".into())
            }
            other => other,
        })?;
        Ok(profile)
    }

    fn insert_profile(&self, profile: &Profile) -> Result<(), SocialError> {
        let mut indexes: Vec<(&str, Value)> = vec![
            ("user_id", Value::Text(profile.user_id.clone())),
            ("profilename", Value::Text(profile.profilename.clone())),
            ("created_at", Value::Text(profile.created_at.clone())),
            ("updated_at", Value::Text(profile.updated_at.clone())),
        ];
        if let Some(ref email) = profile.email {
            indexes.push(("email", Value::Text(email.clone())));
        }
        self.insert_record("profiles", &profile.id, profile, &indexes)
    }

    /// Get a profile by id.
    pub fn get_profile(&self, id: &str) -> Result<Profile, SocialError> {
        self.get_record("profiles", id)
    }

    /// Get a profile by owning user id, if one exists.
    pub fn get_profile_by_user(&self, user_id: &str) -> Result<Option<Profile>, SocialError> {
        let rows = self.sql
            .query(
                "SELECT data FROM profiles WHERE user_id = ?1",
                &[Value::Text(user_id.to_string())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        match rows.first().and_then(|r| r.get_str("data")) {
            Some(data) => serde_json::from_str(data)
                .map(Some)
                .map_err(|e| SocialError::Internal(e.to_string())),
            None => Ok(None),
        }
    }

    /// Update a user's profile with JSON merge-patch semantics.
    ///
    /// A duplicate email surfaces as `Conflict` via the partial unique
    /// index on profiles(email).
    pub fn update_profile(
        &self,
        user_id: &str,
        patch: serde_json::Value,
    ) -> Result<Profile, SocialError> {
        let current = self
            .get_profile_by_user(user_id)?
            .ok_or_else(|| SocialError::NotFound("profile not found".into()))?;
        let now = now_rfc3339();

        let mut base = serde_json::to_value(&current)
            .map_err(|e| SocialError::Internal(e.to_string()))?;
        merge_patch(&mut base, &patch);
        // Force updated_at and preserve identity fields.
        base["updated_at"] = serde_json::json!(now);
        base["id"] = serde_json::json!(current.id);
        base["user_id"] = serde_json::json!(current.user_id);
        base["created_at"] = serde_json::json!(current.created_at);

        // A patch that nulls or mistypes a required field is client
        // input, not a server fault.
        let updated: Profile = serde_json::from_value(base)
            .map_err(|e| SocialError::Validation(format!("invalid patch: {}", e)))?;

        if updated.profilename.trim().is_empty() {
            return Err(SocialError::Validation("profilename must not be empty".into()));
        }

        // Views surface the login identity's email, so a patched email
        // must land on the user record too. Its cross-user uniqueness
        // check runs before the profile row is touched.
        if let Some(email) = patch.get("email").and_then(|v| v.as_str()) {
            self.update_user_email(user_id, email)?;
        }

        let email_value = match updated.email {
            Some(ref e) => Value::Text(e.clone()),
            None => Value::Null,
        };
        self.update_record(
            "profiles",
            &current.id,
            &updated,
            &[
                ("profilename", Value::Text(updated.profilename.clone())),
                ("email", email_value),
                ("updated_at", Value::Text(now)),
            ],
        )
        .map_err(|e| match e {
            SocialError::Conflict(_) => {
                SocialError::Conflict("this email is already in use".into())
            }
            other => other,
        })?;

        Ok(updated)
    }

    /// Delete a user's profile, removing all of its follow edges.
    pub fn delete_profile(&self, user_id: &str) -> Result<(), SocialError> {
        let profile = self
            .get_profile_by_user(user_id)?
            .ok_or_else(|| SocialError::NotFound("profile not found".into()))?;

        self.sql
            .exec(
                "DELETE FROM follows WHERE follower_id = ?1 OR followed_id = ?1",
                &[Value::Text(profile.id.clone())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        self.delete_record("profiles", &profile.id)
    }

    /// Case-insensitive substring search on display name, capped at 4.
    /// Order is whatever the store returns (stable by insertion).
    ///
    /// LIKE metacharacters in the query are escaped, so `%` and `_`
    /// match literally instead of as wildcards.
    pub fn search_profiles(&self, query: &str) -> Result<Vec<Profile>, SocialError> {
        let escaped = query
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{}%", escaped);
        let rows = self.sql
            .query(
                "SELECT data FROM profiles WHERE profilename LIKE ?1 ESCAPE '\\' LIMIT ?2",
                &[Value::Text(pattern), Value::Integer(SEARCH_LIMIT)],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        let mut profiles = Vec::new();
        for row in &rows {
            let data = row
                .get_str("data")
                .ok_or_else(|| SocialError::Internal("missing data column".into()))?;
            profiles.push(
                serde_json::from_str(data).map_err(|e| SocialError::Internal(e.to_string()))?,
            );
        }
        Ok(profiles)
    }

    /// Project a profile into its API view for the given viewer.
    /// Relationship fields are computed from current state, never cached.
    pub fn project_profile(
        &self,
        viewer_user_id: &str,
        profile: &Profile,
    ) -> Result<ProfileView, SocialError> {
        let owner: User = self.get_record("users", &profile.user_id)?;

        let is_following = match self.get_profile_by_user(viewer_user_id)? {
            Some(viewer_profile) => self.is_following(&viewer_profile.id, &profile.id)?,
            None => false,
        };

        Ok(ProfileView {
            id: profile.id.clone(),
            user: profile.user_id.clone(),
            user_username: owner.username,
            user_email: owner.email,
            profilename: profile.profilename.clone(),
            profileimage: profile.profileimage.clone(),
            followers_count: self.followers_count(&profile.id)?,
            following_count: self.following_count(&profile.id)?,
            is_following,
            is_owner: profile.user_id == viewer_user_id,
        })
    }
}
