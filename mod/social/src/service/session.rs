use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};

use mingle_core::new_id;
use mingle_sql::Value;

use crate::model::{Claims, Session, TokenPair, User};
use crate::service::{SocialError, SocialService};

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

impl SocialService {
    /// Issue a JWT token pair (access + refresh) for a user.
    ///
    /// Creates a session record and returns signed tokens.
    pub fn issue_tokens(&self, user: &User) -> Result<TokenPair, SocialError> {
        let session_id = new_id();
        let now = chrono::Utc::now();
        let access_exp = now + chrono::Duration::seconds(self.config.access_token_ttl);
        let refresh_exp = now + chrono::Duration::seconds(self.config.refresh_token_ttl);

        let access_claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            sid: session_id.clone(),
            typ: TOKEN_TYPE_ACCESS.to_string(),
            iat: now.timestamp(),
            exp: access_exp.timestamp(),
        };

        let refresh_claims = Claims {
            sub: user.id.clone(),
            username: user.username.clone(),
            sid: session_id.clone(),
            typ: TOKEN_TYPE_REFRESH.to_string(),
            iat: now.timestamp(),
            exp: refresh_exp.timestamp(),
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let access_token = encode(&Header::default(), &access_claims, &key)
            .map_err(|e| SocialError::Internal(format!("JWT encode failed: {}", e)))?;
        let refresh_token = encode(&Header::default(), &refresh_claims, &key)
            .map_err(|e| SocialError::Internal(format!("JWT encode failed: {}", e)))?;

        let session = Session {
            id: session_id,
            user_id: user.id.clone(),
            revoked: false,
            issued_at: now.to_rfc3339(),
            expires_at: refresh_exp.to_rfc3339(),
        };

        self.insert_record(
            "sessions",
            &session.id,
            &session,
            &[
                ("user_id", Value::Text(session.user_id.clone())),
                ("revoked", Value::Integer(0)),
                ("issued_at", Value::Text(session.issued_at.clone())),
                ("expires_at", Value::Text(session.expires_at.clone())),
            ],
        )?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.config.access_token_ttl,
        })
    }

    /// Verify and decode a JWT access token.
    /// Returns the claims if valid and the session is not revoked.
    /// A refresh token is not an access token and is rejected here.
    pub fn verify_token(&self, token: &str) -> Result<Claims, SocialError> {
        self.decode_token(token, TOKEN_TYPE_ACCESS)
    }

    fn decode_token(&self, token: &str, expected_typ: &str) -> Result<Claims, SocialError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.config.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| SocialError::Unauthorized(format!("invalid token: {}", e)))?;

        let claims = token_data.claims;

        if claims.typ != expected_typ {
            return Err(SocialError::Unauthorized(format!(
                "expected {} token",
                expected_typ
            )));
        }

        if let Ok(session) = self.get_record::<Session>("sessions", &claims.sid) {
            if session.revoked {
                return Err(SocialError::Unauthorized("session has been revoked".into()));
            }
        }

        Ok(claims)
    }

    /// Refresh an access token using a refresh token.
    /// Validates the refresh token, revokes the old session, and issues a new pair.
    pub fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenPair, SocialError> {
        let claims = self.decode_token(refresh_token, TOKEN_TYPE_REFRESH)?;

        let user: User = self.get_record("users", &claims.sub)
            .map_err(|_| SocialError::Unauthorized("user not found".into()))?;

        self.revoke_session(&claims.sid)?;
        self.issue_tokens(&user)
    }

    /// Revoke a session (its tokens become invalid).
    pub fn revoke_session(&self, session_id: &str) -> Result<(), SocialError> {
        let mut session: Session = self.get_record("sessions", session_id)?;
        session.revoked = true;

        self.update_record(
            "sessions",
            session_id,
            &session,
            &[("revoked", Value::Integer(1))],
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::model::RegisterUser;
    use crate::service::test_support::test_service;

    #[test]
    fn test_issue_and_verify_token() {
        let svc = test_service();

        let user = svc.register(RegisterUser {
            username: "alice".to_string(),
            password: "pw".to_string(),
        }).unwrap();

        let tokens = svc.issue_tokens(&user).unwrap();
        assert!(!tokens.access_token.is_empty());
        assert!(!tokens.refresh_token.is_empty());
        assert_eq!(tokens.token_type, "Bearer");

        let claims = svc.verify_token(&tokens.access_token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
    }

    #[test]
    fn test_refresh_revokes_old_session() {
        let svc = test_service();

        let user = svc.register(RegisterUser {
            username: "bob".to_string(),
            password: "pw".to_string(),
        }).unwrap();

        let tokens1 = svc.issue_tokens(&user).unwrap();
        let tokens2 = svc.refresh_tokens(&tokens1.refresh_token).unwrap();
        assert_ne!(tokens2.access_token, tokens1.access_token);

        // Old token is revoked, new one works.
        assert!(svc.verify_token(&tokens1.access_token).is_err());
        assert!(svc.verify_token(&tokens2.access_token).is_ok());
    }

    #[test]
    fn test_invalid_token() {
        let svc = test_service();
        assert!(svc.verify_token("this.is.not.a.valid.jwt").is_err());
    }

    #[test]
    fn test_token_types_are_not_interchangeable() {
        let svc = test_service();

        let user = svc.register(RegisterUser {
            username: "carol".to_string(),
            password: "pw".to_string(),
        }).unwrap();

        let tokens = svc.issue_tokens(&user).unwrap();

        // A refresh token is not accepted where an access token is
        // required, and vice versa.
        assert!(svc.verify_token(&tokens.refresh_token).is_err());
        assert!(svc.refresh_tokens(&tokens.access_token).is_err());

        // The session is untouched by the rejections.
        assert!(svc.verify_token(&tokens.access_token).is_ok());
    }
}
