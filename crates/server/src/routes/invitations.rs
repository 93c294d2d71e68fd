use axum::{
    Router,
    extract::State,
    response::Json as ResponseJson,
    routing::post,
};
use db::models::{invitation::Invitation, profile::Profile};
use serde::Deserialize;
use services::services::invitation::InviteRequest;
use ts_rs::TS;
use utils::response::ApiResponse;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext, require_admin},
    state::AppState,
};

#[derive(Debug, Deserialize, TS)]
pub struct AcceptInvitationRequest {
    pub token: String,
    pub password: String,
}

/// POST /api/invitations
/// Invite an email into the resolved center. The token is returned to the
/// caller; delivering it is up to the center.
pub async fn create_invitation(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<InviteRequest>,
) -> Result<ResponseJson<ApiResponse<Invitation>>, ApiError> {
    let invitation = state.invitations.invite(center.id, &profile, &payload).await?;

    state.analytics.track(
        "user_invited",
        serde_json::json!({
            "center_id": center.id.to_string(),
            "role": invitation.role.to_string(),
        }),
    );

    Ok(ResponseJson(ApiResponse::success(invitation)))
}

/// GET /api/invitations
pub async fn list_invitations(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<Invitation>>>, ApiError> {
    require_admin(&profile, center.id)?;
    let invitations = state.invitations.list(center.id).await?;
    Ok(ResponseJson(ApiResponse::success(invitations)))
}

/// POST /api/invitations/accept
/// Redeem a token and set the account password.
pub async fn accept_invitation(
    State(state): State<AppState>,
    axum::Json(payload): axum::Json<AcceptInvitationRequest>,
) -> Result<ResponseJson<ApiResponse<Profile>>, ApiError> {
    if payload.password.len() < 8 {
        return Err(ApiError::BadRequest(
            "password must be at least 8 characters".to_string(),
        ));
    }
    let hash = state.auth.hash_password(&payload.password)?;
    let profile = state.invitations.accept(&payload.token, &hash).await?;
    Ok(ResponseJson(ApiResponse::success(profile)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/invitations",
        Router::new()
            .route("/", post(create_invitation).get(list_invitations))
            .route("/accept", post(accept_invitation)),
    )
}
