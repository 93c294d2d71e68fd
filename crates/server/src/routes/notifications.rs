use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::Utc;
use db::models::{
    notification::Notification,
    push_subscription::{PushSubscription, RegisterPushSubscription},
};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{error::ApiError, middleware::AuthUser, state::AppState};

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    pub unread_only: Option<bool>,
    pub limit: Option<i64>,
}

#[derive(Debug, Deserialize, TS)]
pub struct UnsubscribeRequest {
    pub endpoint: String,
}

/// GET /api/notifications?unread_only&limit
pub async fn list_notifications(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    Query(query): Query<FeedQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Notification>>>, ApiError> {
    let notifications = Notification::list_by_profile(
        &state.db.pool,
        profile.id,
        query.unread_only.unwrap_or(false),
        query.limit.unwrap_or(50).clamp(1, 200),
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(notifications)))
}

/// POST /api/notifications/{id}/read
pub async fn mark_read(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    let updated = Notification::mark_read(&state.db.pool, id, profile.id, Utc::now()).await?;
    if updated == 0 {
        return Err(ApiError::NotFound("notification not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/notifications/read-all
pub async fn mark_all_read(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    Notification::mark_all_read(&state.db.pool, profile.id, Utc::now()).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

/// POST /api/push-subscriptions
/// Register the browser push endpoint the service worker obtained.
pub async fn register_push(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    axum::Json(payload): axum::Json<RegisterPushSubscription>,
) -> Result<ResponseJson<ApiResponse<PushSubscription>>, ApiError> {
    let subscription = PushSubscription::upsert(&state.db.pool, profile.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(subscription)))
}

/// DELETE /api/push-subscriptions
pub async fn unregister_push(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    axum::Json(payload): axum::Json<UnsubscribeRequest>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    PushSubscription::delete_by_endpoint(&state.db.pool, profile.id, &payload.endpoint).await?;
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .nest(
            "/notifications",
            Router::new()
                .route("/", get(list_notifications))
                .route("/read-all", post(mark_all_read))
                .route("/{id}/read", post(mark_read)),
        )
        .route(
            "/push-subscriptions",
            post(register_push).delete(unregister_push),
        )
}
