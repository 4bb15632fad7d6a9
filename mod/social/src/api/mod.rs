mod accounts;
mod profiles;
mod posts;
mod middleware;

use std::sync::Arc;

use axum::Router;

use crate::service::SocialService;

/// Shared application state.
pub type AppState = Arc<SocialService>;

/// Build the complete social API router.
///
/// Routes use absolute paths and are merged into the root router by the
/// binary. The auth middleware wraps everything; registration and token
/// endpoints are exempted inside the middleware itself.
pub fn build_router(svc: Arc<SocialService>) -> Router {
    Router::new()
        .merge(accounts::routes())
        .merge(profiles::routes())
        .merge(posts::routes())
        .layer(axum::middleware::from_fn_with_state(
            svc.clone(),
            middleware::auth_middleware,
        ))
        .with_state(svc)
}
