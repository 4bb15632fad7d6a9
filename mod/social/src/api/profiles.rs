use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::Deserialize;

use mingle_core::ServiceError;

use crate::api::AppState;
use crate::model::{Claims, CreateProfile};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile/",
            get(get_own_profile)
                .put(update_own_profile)
                .post(create_own_profile)
                .delete(delete_own_profile),
        )
        .route("/profile/{id}/", get(get_profile))
        .route("/profile/{id}/follow/", put(toggle_follow))
}

#[derive(Debug, Deserialize)]
struct ProfileQuery {
    search: Option<String>,
}

/// GET /profile/ — the caller's own profile, created on first access.
/// With `?search=`, a capped name search instead.
async fn get_own_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<ProfileQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    if let Some(query) = params.search {
        let profiles = svc.search_profiles(&query).map_err(ServiceError::from)?;
        let mut items = Vec::with_capacity(profiles.len());
        for p in &profiles {
            items.push(svc.project_profile(&claims.sub, p).map_err(ServiceError::from)?);
        }
        return Ok(Json(serde_json::json!({"items": items})));
    }

    let user = svc.get_user(&claims.sub).map_err(ServiceError::from)?;
    let profile = svc.get_or_create_profile(&user).map_err(ServiceError::from)?;
    let view = svc
        .project_profile(&claims.sub, &profile)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(view).map_err(|e| {
        ServiceError::Internal(e.to_string())
    })?))
}

/// PUT /profile/ — merge-patch the caller's profile.
async fn update_own_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let profile = svc
        .update_profile(&claims.sub, patch)
        .map_err(ServiceError::from)?;
    let view = svc
        .project_profile(&claims.sub, &profile)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(view).map_err(|e| {
        ServiceError::Internal(e.to_string())
    })?))
}

/// POST /profile/ — explicit creation; 400 if one already exists.
async fn create_own_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreateProfile>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let user = svc.get_user(&claims.sub).map_err(ServiceError::from)?;
    let profile = svc.create_profile(&user, input).map_err(ServiceError::from)?;
    let view = svc
        .project_profile(&claims.sub, &profile)
        .map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(view).map_err(|e| ServiceError::Internal(e.to_string()))?),
    ))
}

/// DELETE /profile/ — remove the caller's profile and its follow edges.
async fn delete_own_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<StatusCode, ServiceError> {
    svc.delete_profile(&claims.sub).map_err(ServiceError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /profile/{id}/ — any profile, projected for the caller.
async fn get_profile(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let profile = svc.get_profile(&id).map_err(ServiceError::from)?;
    let view = svc
        .project_profile(&claims.sub, &profile)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(view).map_err(|e| {
        ServiceError::Internal(e.to_string())
    })?))
}

/// PUT /profile/{id}/follow/ — flip the follow edge from the caller's
/// profile to the target and report the target's new follower count.
async fn toggle_follow(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let user = svc.get_user(&claims.sub).map_err(ServiceError::from)?;
    let actor = svc.get_or_create_profile(&user).map_err(ServiceError::from)?;
    let target = svc.get_profile(&id).map_err(ServiceError::from)?;

    let is_following = svc
        .toggle_follow(&actor.id, &target.id)
        .map_err(ServiceError::from)?;
    let message = if is_following {
        format!("Successfully followed {}.", target.profilename)
    } else {
        format!("Successfully unfollowed {}.", target.profilename)
    };

    Ok(Json(serde_json::json!({
        "message": message,
        "is_following": is_following,
        "followers_count": svc.followers_count(&target.id).map_err(ServiceError::from)?,
    })))
}
