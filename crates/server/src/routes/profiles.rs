use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::profile::Profile;
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext, require_admin},
    state::AppState,
};

#[derive(Debug, Deserialize, TS)]
pub struct ToggleActive {
    pub active: bool,
}

/// GET /api/profiles
/// All accounts of the resolved center. Admin only.
pub async fn list_profiles(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<Profile>>>, ApiError> {
    require_admin(&profile, center.id)?;
    let profiles = Profile::list_by_center(&state.db.pool, center.id).await?;
    Ok(ResponseJson(ApiResponse::success(profiles)))
}

/// PUT /api/profiles/{id}/active
/// Enable or disable an account of the resolved center. Admin only.
pub async fn set_profile_active(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<ToggleActive>,
) -> Result<ResponseJson<ApiResponse<Profile>>, ApiError> {
    require_admin(&profile, center.id)?;
    let target = Profile::find_by_id(&state.db.pool, id)
        .await?
        .filter(|p| p.center_id == Some(center.id))
        .ok_or_else(|| ApiError::NotFound("profile not found".to_string()))?;
    Profile::set_active(&state.db.pool, target.id, payload.active).await?;
    let updated = Profile::find_by_id(&state.db.pool, target.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("profile not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(updated)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profiles", get(list_profiles))
        .route("/profiles/{id}/active", put(set_profile_active))
}
