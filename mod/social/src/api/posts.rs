use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use mingle_core::{PageParams, ServiceError};

use crate::api::AppState;
use crate::model::{Claims, CreatePost, LikeOutcome};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/posts/", get(feed).post(create_post))
        .route(
            "/posts/{pk}/",
            get(get_post)
                .put(update_post)
                .patch(toggle_like)
                .delete(delete_post),
        )
}

/// GET /posts/ — the caller's feed: own posts plus posts of everyone
/// they follow, newest first, paginated.
async fn feed(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(page): Query<PageParams>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let result = svc.feed(&claims.sub, page).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
    })))
}

/// POST /posts/ — create a post owned by the caller.
async fn create_post(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(input): Json<CreatePost>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let post = svc.create_post(&claims.sub, input).map_err(ServiceError::from)?;
    let view = svc
        .project_post(&claims.sub, &post)
        .map_err(ServiceError::from)?;
    Ok((
        StatusCode::CREATED,
        Json(serde_json::to_value(view).map_err(|e| ServiceError::Internal(e.to_string()))?),
    ))
}

/// GET /posts/{pk}/ — a single post, projected for the caller.
async fn get_post(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pk): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let post = svc.get_post(&pk).map_err(ServiceError::from)?;
    let view = svc
        .project_post(&claims.sub, &post)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(view).map_err(|e| {
        ServiceError::Internal(e.to_string())
    })?))
}

/// PUT /posts/{pk}/ — edit a post (owner only).
async fn update_post(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pk): Path<String>,
    Json(patch): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let post = svc
        .update_post(&pk, &claims.sub, patch)
        .map_err(ServiceError::from)?;
    let view = svc
        .project_post(&claims.sub, &post)
        .map_err(ServiceError::from)?;
    Ok(Json(serde_json::to_value(view).map_err(|e| {
        ServiceError::Internal(e.to_string())
    })?))
}

/// PATCH /posts/{pk}/ — toggle the caller's like on a post.
/// 201 when the like was added, 200 when it was removed.
async fn toggle_like(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pk): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), ServiceError> {
    let outcome = svc.toggle_like(&pk, &claims.sub).map_err(ServiceError::from)?;
    let (status, message) = match outcome {
        LikeOutcome::Liked => (StatusCode::CREATED, "Post liked."),
        LikeOutcome::Unliked => (StatusCode::OK, "Like removed."),
    };
    Ok((status, Json(serde_json::json!({"message": message}))))
}

/// DELETE /posts/{pk}/ — delete a post and its likes (owner only).
async fn delete_post(
    State(svc): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(pk): Path<String>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    svc.delete_post(&pk, &claims.sub).map_err(ServiceError::from)?;
    Ok(Json(serde_json::json!({"message": "Post removed."})))
}
