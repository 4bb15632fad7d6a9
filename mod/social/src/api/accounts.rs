use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use mingle_core::ServiceError;

use crate::api::AppState;
use crate::model::RegisterUser;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/user/", post(register))
        .route("/token/", post(login))
        .route("/token/refresh/", post(refresh))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

#[derive(Debug, Deserialize)]
struct RefreshRequest {
    #[serde(default)]
    refresh: String,
}

/// POST /user/ — register a new account. The profile is created in the
/// same call. The password hash never appears in the response.
async fn register(
    State(svc): State<AppState>,
    Json(input): Json<RegisterUser>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let user = svc.register(input).map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": user.id,
            "username": user.username,
            "created_at": user.created_at,
        })),
    ))
}

/// POST /token/ — exchange credentials for a token pair.
async fn login(
    State(svc): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc
        .authenticate(&input.username, &input.password)
        .map_err(ServiceError::from)?;
    let tokens = svc.issue_tokens(&user).map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(tokens).map_err(|e| {
        ServiceError::Internal(e.to_string())
    })?))
}

/// POST /token/refresh/ — rotate a token pair. The old session is
/// revoked before the new pair is issued.
async fn refresh(
    State(svc): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let tokens = svc
        .refresh_tokens(&input.refresh)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(tokens).map_err(|e| {
        ServiceError::Internal(e.to_string())
    })?))
}
