use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::profile::{Profile, UpdateProfile};
use services::services::auth::{AuthSession, LoginRequest, RegisterRequest};
use utils::response::ApiResponse;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext},
    state::AppState,
};

/// POST /api/auth/register
/// Parent self-signup into the resolved center.
pub async fn register(
    State(state): State<AppState>,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<RegisterRequest>,
) -> Result<ResponseJson<ApiResponse<AuthSession>>, ApiError> {
    let session = state.auth.register_parent(center.id, &payload).await?;

    state.analytics.track(
        "parent_registered",
        serde_json::json!({
            "center_id": center.id.to_string(),
            "profile_id": session.profile.id.to_string(),
        }),
    );

    Ok(ResponseJson(ApiResponse::success(session)))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<LoginRequest>,
) -> Result<ResponseJson<ApiResponse<AuthSession>>, ApiError> {
    let session = state.auth.login(&payload).await?;
    Ok(ResponseJson(ApiResponse::success(session)))
}

/// GET /api/auth/me
pub async fn me(AuthUser(profile): AuthUser) -> ResponseJson<ApiResponse<Profile>> {
    ResponseJson(ApiResponse::success(profile))
}

/// PUT /api/auth/me
pub async fn update_me(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    axum::Json(payload): axum::Json<UpdateProfile>,
) -> Result<ResponseJson<ApiResponse<Profile>>, ApiError> {
    let updated = Profile::update(&state.db.pool, profile.id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("profile not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/auth",
        Router::new()
            .route("/register", post(register))
            .route("/login", post(login))
            .route("/me", get(me).put(update_me)),
    )
}
