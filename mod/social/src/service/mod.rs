pub mod schema;
pub mod account;
pub mod session;
pub mod profile;
pub mod follow;
pub mod post;
pub mod like;
pub mod feed;

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use mingle_sql::{SQLStore, Value};

/// Social service error type.
#[derive(Debug, Error)]
pub enum SocialError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("validation: {0}")]
    Validation(String),

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("storage: {0}")]
    Storage(String),

    #[error("internal: {0}")]
    Internal(String),
}

impl From<SocialError> for mingle_core::ServiceError {
    fn from(e: SocialError) -> Self {
        match e {
            SocialError::NotFound(m) => mingle_core::ServiceError::NotFound(m),
            SocialError::Conflict(m) => mingle_core::ServiceError::Conflict(m),
            SocialError::Validation(m) => mingle_core::ServiceError::Validation(m),
            SocialError::Unauthorized(m) => mingle_core::ServiceError::Unauthorized(m),
            SocialError::Forbidden(m) => mingle_core::ServiceError::Forbidden(m),
            SocialError::Storage(m) => mingle_core::ServiceError::Storage(m),
            SocialError::Internal(m) => mingle_core::ServiceError::Internal(m),
        }
    }
}

/// Configuration for the social service.
#[derive(Debug, Clone)]
pub struct SocialConfig {
    /// JWT signing secret.
    pub jwt_secret: String,
    /// Access token lifetime in seconds (default: 24h).
    pub access_token_ttl: i64,
    /// Refresh token lifetime in seconds (default: 7 days).
    pub refresh_token_ttl: i64,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "mingle-dev-secret-change-me".to_string(),
            access_token_ttl: 86400,    // 24h
            refresh_token_ttl: 604800,  // 7 days
        }
    }
}

/// The social service. Holds the storage backend and configuration.
///
/// All operations take the caller's identity explicitly — there is no
/// ambient "current user".
pub struct SocialService {
    pub(crate) sql: Arc<dyn SQLStore>,
    pub(crate) config: SocialConfig,
}

impl SocialService {
    /// Create a new SocialService, initializing the DB schema.
    pub fn new(
        sql: Arc<dyn SQLStore>,
        config: SocialConfig,
    ) -> Result<Arc<Self>, SocialError> {
        schema::init_schema(sql.as_ref())?;
        Ok(Arc::new(Self { sql, config }))
    }

    // ── Generic CRUD helpers ──

    /// Insert a record as JSON into a table with indexed columns.
    ///
    /// UNIQUE constraint violations surface as `Conflict` so callers
    /// can apply the create-or-fetch pattern.
    pub(crate) fn insert_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), SocialError> {
        let json = serde_json::to_string(record)
            .map_err(|e| SocialError::Internal(e.to_string()))?;

        let mut cols = vec!["id", "data"];
        let mut placeholders = vec!["?1".to_string(), "?2".to_string()];
        let mut params = vec![Value::Text(id.to_string()), Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 3;
            cols.push(col);
            placeholders.push(format!("?{}", idx));
            params.push(val.clone());
        }

        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            cols.join(", "),
            placeholders.join(", "),
        );

        self.sql.exec(&sql, &params).map_err(|e| {
            if e.is_unique_violation() {
                SocialError::Conflict(e.to_string())
            } else {
                SocialError::Storage(e.to_string())
            }
        })?;

        Ok(())
    }

    /// Get a record by id, deserializing the JSON `data` column.
    pub(crate) fn get_record<T: DeserializeOwned>(
        &self,
        table: &str,
        id: &str,
    ) -> Result<T, SocialError> {
        let sql = format!("SELECT data FROM {} WHERE id = ?1", table);
        let rows = self.sql
            .query(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        let row = rows
            .first()
            .ok_or_else(|| SocialError::NotFound(format!("{}/{}", table, id)))?;
        let data = row
            .get_str("data")
            .ok_or_else(|| SocialError::Internal("missing data column".into()))?;
        serde_json::from_str(data).map_err(|e| SocialError::Internal(e.to_string()))
    }

    /// Update a record's JSON data and indexed columns.
    ///
    /// Like inserts, a UNIQUE violation (e.g. changing a profile email
    /// to one already taken) maps to `Conflict`.
    pub(crate) fn update_record<T: Serialize>(
        &self,
        table: &str,
        id: &str,
        record: &T,
        indexes: &[(&str, Value)],
    ) -> Result<(), SocialError> {
        let json = serde_json::to_string(record)
            .map_err(|e| SocialError::Internal(e.to_string()))?;

        let mut sets = vec!["data = ?1".to_string()];
        let mut params: Vec<Value> = vec![Value::Text(json)];

        for (i, (col, val)) in indexes.iter().enumerate() {
            let idx = i + 2;
            sets.push(format!("{} = ?{}", col, idx));
            params.push(val.clone());
        }

        let id_idx = params.len() + 1;
        params.push(Value::Text(id.to_string()));

        let sql = format!(
            "UPDATE {} SET {} WHERE id = ?{}",
            table,
            sets.join(", "),
            id_idx,
        );

        let affected = self.sql.exec(&sql, &params).map_err(|e| {
            if e.is_unique_violation() {
                SocialError::Conflict(e.to_string())
            } else {
                SocialError::Storage(e.to_string())
            }
        })?;

        if affected == 0 {
            return Err(SocialError::NotFound(format!("{}/{}", table, id)));
        }

        Ok(())
    }

    /// Delete a record by id.
    pub(crate) fn delete_record(&self, table: &str, id: &str) -> Result<(), SocialError> {
        let sql = format!("DELETE FROM {} WHERE id = ?1", table);
        let affected = self.sql
            .exec(&sql, &[Value::Text(id.to_string())])
            .map_err(|e| SocialError::Storage(e.to_string()))?;
        if affected == 0 {
            return Err(SocialError::NotFound(format!("{}/{}", table, id)));
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use mingle_sql::SqliteStore;

    use super::{SocialConfig, SocialService};

    pub fn test_service() -> Arc<SocialService> {
        let sql = Arc::new(SqliteStore::open_in_memory().unwrap());
        SocialService::new(sql, SocialConfig::default()).unwrap()
    }
}
