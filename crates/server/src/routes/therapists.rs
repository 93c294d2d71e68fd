use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::therapist::{CreateTherapist, Therapist, UpdateTherapist};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext, MaybeAuthUser, require_admin, require_staff},
    state::AppState,
};

/// GET /api/therapists
/// Public team listing; staff also see inactive entries.
pub async fn list_therapists(
    State(state): State<AppState>,
    MaybeAuthUser(profile): MaybeAuthUser,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<Therapist>>>, ApiError> {
    let all = Therapist::list_by_center(&state.db.pool, center.id).await?;
    let is_staff = profile
        .as_ref()
        .is_some_and(|p| require_staff(p, center.id).is_ok());
    let therapists = if is_staff {
        all
    } else {
        all.into_iter().filter(|t| t.active).collect()
    };
    Ok(ResponseJson(ApiResponse::success(therapists)))
}

/// POST /api/therapists
pub async fn create_therapist(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<CreateTherapist>,
) -> Result<ResponseJson<ApiResponse<Therapist>>, ApiError> {
    require_admin(&profile, center.id)?;
    let therapist = Therapist::create(&state.db.pool, center.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(therapist)))
}

/// PUT /api/therapists/{id}
pub async fn update_therapist(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateTherapist>,
) -> Result<ResponseJson<ApiResponse<Therapist>>, ApiError> {
    require_admin(&profile, center.id)?;
    let therapist = Therapist::update(&state.db.pool, id, center.id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("therapist not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(therapist)))
}

/// DELETE /api/therapists/{id}
pub async fn delete_therapist(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_admin(&profile, center.id)?;
    let deleted = Therapist::delete(&state.db.pool, id, center.id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("therapist not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/therapists",
        Router::new()
            .route("/", get(list_therapists).post(create_therapist))
            .route("/{id}", axum::routing::put(update_therapist).delete(delete_therapist)),
    )
}
