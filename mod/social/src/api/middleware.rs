use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use mingle_core::ServiceError;

use crate::api::AppState;

/// Paths that don't require authentication.
const PUBLIC_PATHS: &[&str] = &["/user/", "/token/"];

/// JWT authentication middleware.
///
/// Checks for a Bearer token in the Authorization header. Registration
/// and token issuance are public. On success the decoded Claims are
/// stored as a request extension for handlers to read via
/// `Extension<Claims>`.
pub async fn auth_middleware(
    State(svc): State<AppState>,
    mut req: Request<axum::body::Body>,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();

    if is_public_path(&path) {
        return next.run(req).await;
    }

    let token = match extract_bearer(req.headers()) {
        Some(t) => t.to_string(),
        None => {
            return ServiceError::Unauthorized("missing authorization header".into())
                .into_response();
        }
    };

    match svc.verify_token(&token) {
        Ok(claims) => {
            req.extensions_mut().insert(claims);
            next.run(req).await
        }
        Err(e) => ServiceError::from(e).into_response(),
    }
}

/// Extract the Bearer token from the Authorization header.
fn extract_bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
}

/// Check if a path is public (no auth required).
fn is_public_path(path: &str) -> bool {
    for prefix in PUBLIC_PATHS {
        if path.starts_with(prefix) {
            return true;
        }
    }
    false
}
