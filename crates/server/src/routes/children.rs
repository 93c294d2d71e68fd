use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::get,
};
use db::models::{
    appointment::Appointment,
    child::{Child, CreateChild, UpdateChild},
    payment::Payment,
    profile::{Profile, ProfileRole},
    progress_report::ProgressReport,
};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext, require_admin, require_staff},
    state::AppState,
};

/// Staff of the center, or the child's own parent.
fn ensure_child_access(profile: &Profile, child: &Child) -> Result<(), ApiError> {
    if profile.role == ProfileRole::Parent {
        if child.parent_profile_id == Some(profile.id) {
            return Ok(());
        }
        return Err(ApiError::NotFound("child not found".to_string()));
    }
    require_staff(profile, child.center_id)
}

async fn load_child(state: &AppState, id: Uuid, center_id: Uuid) -> Result<Child, ApiError> {
    Child::find_by_id(&state.db.pool, id)
        .await?
        .filter(|c| c.center_id == center_id)
        .ok_or_else(|| ApiError::NotFound("child not found".to_string()))
}

/// GET /api/children
/// Staff see the whole roster; parents see their own children.
pub async fn list_children(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<Child>>>, ApiError> {
    let children = if profile.role == ProfileRole::Parent {
        Child::list_by_parent(&state.db.pool, profile.id).await?
    } else {
        require_staff(&profile, center.id)?;
        Child::list_by_center(&state.db.pool, center.id).await?
    };
    Ok(ResponseJson(ApiResponse::success(children)))
}

/// POST /api/children
pub async fn create_child(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<CreateChild>,
) -> Result<ResponseJson<ApiResponse<Child>>, ApiError> {
    require_admin(&profile, center.id)?;
    let child = Child::create(&state.db.pool, center.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(child)))
}

/// GET /api/children/{id}
pub async fn get_child(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Child>>, ApiError> {
    let child = load_child(&state, id, center.id).await?;
    ensure_child_access(&profile, &child)?;
    Ok(ResponseJson(ApiResponse::success(child)))
}

/// PUT /api/children/{id}
pub async fn update_child(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateChild>,
) -> Result<ResponseJson<ApiResponse<Child>>, ApiError> {
    require_admin(&profile, center.id)?;
    let child = Child::update(&state.db.pool, id, center.id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("child not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(child)))
}

/// DELETE /api/children/{id}
pub async fn delete_child(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_admin(&profile, center.id)?;
    let deleted = Child::delete(&state.db.pool, id, center.id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("child not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/children/{id}/appointments
pub async fn child_appointments(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Appointment>>>, ApiError> {
    let child = load_child(&state, id, center.id).await?;
    ensure_child_access(&profile, &child)?;
    let appointments = Appointment::list_by_child(&state.db.pool, child.id).await?;
    Ok(ResponseJson(ApiResponse::success(appointments)))
}

/// GET /api/children/{id}/payments
pub async fn child_payments(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<Payment>>>, ApiError> {
    let child = load_child(&state, id, center.id).await?;
    ensure_child_access(&profile, &child)?;
    let payments = Payment::list_by_child(&state.db.pool, child.id).await?;
    Ok(ResponseJson(ApiResponse::success(payments)))
}

/// GET /api/children/{id}/reports
/// Parents only see reports shared with them.
pub async fn child_reports(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Vec<ProgressReport>>>, ApiError> {
    let child = load_child(&state, id, center.id).await?;
    ensure_child_access(&profile, &child)?;
    let shared_only = profile.role == ProfileRole::Parent;
    let reports = ProgressReport::list_by_child(&state.db.pool, child.id, shared_only).await?;
    Ok(ResponseJson(ApiResponse::success(reports)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/children",
        Router::new()
            .route("/", get(list_children).post(create_child))
            .route("/{id}", get(get_child).put(update_child).delete(delete_child))
            .route("/{id}/appointments", get(child_appointments))
            .route("/{id}/payments", get(child_payments))
            .route("/{id}/reports", get(child_reports)),
    )
}
