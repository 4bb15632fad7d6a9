use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use tracing::info;

use mingle_core::{new_id, now_rfc3339};
use mingle_sql::Value;

use crate::model::{RegisterUser, User};
use crate::service::{SocialError, SocialService};

impl SocialService {
    /// Register a new user and auto-create their profile.
    ///
    /// The profile is seeded with the username as display name. A
    /// duplicate username surfaces as `Conflict`.
    pub fn register(&self, input: RegisterUser) -> Result<User, SocialError> {
        let username = input.username.trim();
        if username.is_empty() || input.password.is_empty() {
            return Err(SocialError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let now = now_rfc3339();
        let user = User {
            id: new_id(),
            username: username.to_string(),
            email: None,
            password_hash,
            created_at: now.clone(),
            updated_at: now.clone(),
        };

        self.insert_record(
            "users",
            &user.id,
            &user,
            &[
                ("username", Value::Text(user.username.clone())),
                ("created_at", Value::Text(now.clone())),
                ("updated_at", Value::Text(now)),
            ],
        )
        .map_err(|e| match e {
            SocialError::Conflict(_) => {
                SocialError::Conflict(format!("username '{}' already taken", username))
            }
            other => other,
        })?;

        // One profile per identity, created at registration time.
        self.get_or_create_profile(&user)?;

        info!("registered user '{}'", user.username);
        Ok(user)
    }

    /// Verify a username/password pair and return the user.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<User, SocialError> {
        let rows = self.sql
            .query(
                "SELECT data FROM users WHERE username = ?1",
                &[Value::Text(username.to_string())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;

        let user: User = rows
            .first()
            .and_then(|r| r.get_str("data"))
            .and_then(|d| serde_json::from_str(d).ok())
            .ok_or_else(|| SocialError::Unauthorized("invalid credentials".into()))?;

        if !verify_password(password, &user.password_hash) {
            return Err(SocialError::Unauthorized("invalid credentials".into()));
        }

        Ok(user)
    }

    /// Get a user by id.
    pub fn get_user(&self, id: &str) -> Result<User, SocialError> {
        self.get_record("users", id)
    }

    /// Update a user's email, enforcing uniqueness across users.
    pub fn update_user_email(&self, id: &str, email: &str) -> Result<User, SocialError> {
        let conflict = self.sql
            .query(
                "SELECT id FROM users WHERE email = ?1 AND id != ?2",
                &[Value::Text(email.to_string()), Value::Text(id.to_string())],
            )
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        if !conflict.is_empty() {
            return Err(SocialError::Conflict("this email is already in use".into()));
        }

        let mut user: User = self.get_record("users", id)?;
        user.email = Some(email.to_string());
        user.updated_at = now_rfc3339();

        self.update_record(
            "users",
            id,
            &user,
            &[
                ("email", Value::Text(email.to_string())),
                ("updated_at", Value::Text(user.updated_at.clone())),
            ],
        )?;
        Ok(user)
    }
}

/// Hash a password with argon2id (PHC string format).
fn hash_password(password: &str) -> Result<String, SocialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| SocialError::Internal(format!("password hashing failed: {}", e)))
}

/// Verify a password against a stored argon2id hash.
fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::test_support::test_service;

    #[test]
    fn test_register_creates_user_and_profile() {
        let svc = test_service();

        let user = svc.register(RegisterUser {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        }).unwrap();
        assert_eq!(user.username, "alice");

        // Profile auto-created, seeded with the username.
        let profile = svc.get_profile_by_user(&user.id).unwrap().unwrap();
        assert_eq!(profile.profilename, "alice");
        assert_eq!(profile.user_id, user.id);
    }

    #[test]
    fn test_register_rejects_missing_fields() {
        let svc = test_service();

        let err = svc.register(RegisterUser {
            username: "".to_string(),
            password: "pw".to_string(),
        }).unwrap_err();
        assert!(matches!(err, SocialError::Validation(_)));

        let err = svc.register(RegisterUser {
            username: "bob".to_string(),
            password: "".to_string(),
        }).unwrap_err();
        assert!(matches!(err, SocialError::Validation(_)));
    }

    #[test]
    fn test_register_duplicate_username() {
        let svc = test_service();

        svc.register(RegisterUser {
            username: "alice".to_string(),
            password: "pw1".to_string(),
        }).unwrap();

        let err = svc.register(RegisterUser {
            username: "alice".to_string(),
            password: "pw2".to_string(),
        }).unwrap_err();
        assert!(matches!(err, SocialError::Conflict(_)));
    }

    #[test]
    fn test_authenticate() {
        let svc = test_service();

        let user = svc.register(RegisterUser {
            username: "alice".to_string(),
            password: "hunter2".to_string(),
        }).unwrap();

        let found = svc.authenticate("alice", "hunter2").unwrap();
        assert_eq!(found.id, user.id);

        assert!(svc.authenticate("alice", "wrong").is_err());
        assert!(svc.authenticate("nobody", "hunter2").is_err());
    }

    #[test]
    fn test_update_user_email_conflict() {
        let svc = test_service();

        let a = svc.register(RegisterUser {
            username: "alice".to_string(),
            password: "pw".to_string(),
        }).unwrap();
        let b = svc.register(RegisterUser {
            username: "bob".to_string(),
            password: "pw".to_string(),
        }).unwrap();

        svc.update_user_email(&a.id, "shared@example.com").unwrap();
        let err = svc.update_user_email(&b.id, "shared@example.com").unwrap_err();
        assert!(matches!(err, SocialError::Conflict(_)));
    }
}
