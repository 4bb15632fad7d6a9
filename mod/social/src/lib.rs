//! Social module — accounts, profiles, follow graph, posts and likes.
//!
//! # Resources
//!
//! - **User** — login identity (username + password hash)
//! - **Profile** — public persona, exactly one per user
//! - **Follow edge** — directed profile→profile relation
//! - **Post** — text content owned by a user
//! - **Like** — at most one per (post, user) pair
//! - **Session** — JWT issuance record
//!
//! # Usage
//!
//! ```ignore
//! use social::{SocialModule, service::SocialConfig};
//!
//! let module = SocialModule::new(sql, SocialConfig::default())?;
//! let router = module.routes(); // Merged at the root
//! ```

pub mod model;
pub mod service;
pub mod api;

use std::sync::Arc;

use axum::Router;

use mingle_core::Module;

use crate::service::{SocialConfig, SocialService};

/// Social module implementing the Module trait.
///
/// Holds the SocialService and provides HTTP routes for all endpoints.
pub struct SocialModule {
    service: Arc<SocialService>,
}

impl SocialModule {
    /// Create a new SocialModule.
    pub fn new(
        sql: Arc<dyn mingle_sql::SQLStore>,
        config: SocialConfig,
    ) -> Result<Self, mingle_core::ServiceError> {
        let service = SocialService::new(sql, config)
            .map_err(mingle_core::ServiceError::from)?;
        Ok(Self { service })
    }

    /// Get a reference to the underlying SocialService.
    pub fn service(&self) -> &Arc<SocialService> {
        &self.service
    }
}

impl Module for SocialModule {
    fn name(&self) -> &str {
        "social"
    }

    fn routes(&self) -> Router {
        api::build_router(self.service.clone())
    }
}
