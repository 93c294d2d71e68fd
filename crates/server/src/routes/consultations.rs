use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::post,
};
use chrono::{DateTime, Utc};
use db::models::consultation::{Consultation, ConsultationStatus, CreateConsultation};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext, require_staff},
    state::AppState,
};

#[derive(Debug, Deserialize, TS)]
pub struct ScheduleConsultationRequest {
    pub scheduled_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, TS)]
pub struct CloseConsultationRequest {
    pub status: ConsultationStatus,
    pub outcome: Option<String>,
}

/// POST /api/consultations
/// Public intake request form for the resolved center.
pub async fn create_consultation(
    State(state): State<AppState>,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<CreateConsultation>,
) -> Result<ResponseJson<ApiResponse<Consultation>>, ApiError> {
    if payload.child_name.trim().is_empty() || payload.parent_name.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "child and parent names are required".to_string(),
        ));
    }
    let consultation = Consultation::create(&state.db.pool, center.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(consultation)))
}

/// GET /api/consultations
pub async fn list_consultations(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<Consultation>>>, ApiError> {
    require_staff(&profile, center.id)?;
    let consultations = Consultation::list_by_center(&state.db.pool, center.id).await?;
    Ok(ResponseJson(ApiResponse::success(consultations)))
}

/// POST /api/consultations/{id}/schedule
pub async fn schedule_consultation(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<ScheduleConsultationRequest>,
) -> Result<ResponseJson<ApiResponse<Consultation>>, ApiError> {
    require_staff(&profile, center.id)?;
    let consultation =
        Consultation::schedule(&state.db.pool, id, center.id, payload.scheduled_at)
            .await?
            .ok_or_else(|| ApiError::NotFound("consultation not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(consultation)))
}

/// POST /api/consultations/{id}/close
/// Finish a consultation as completed or cancelled.
pub async fn close_consultation(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<CloseConsultationRequest>,
) -> Result<ResponseJson<ApiResponse<Consultation>>, ApiError> {
    require_staff(&profile, center.id)?;
    if !matches!(
        payload.status,
        ConsultationStatus::Completed | ConsultationStatus::Cancelled
    ) {
        return Err(ApiError::BadRequest(
            "close status must be completed or cancelled".to_string(),
        ));
    }
    let consultation = Consultation::close(
        &state.db.pool,
        id,
        center.id,
        payload.status,
        payload.outcome,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("consultation not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(consultation)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/consultations",
        Router::new()
            .route("/", post(create_consultation).get(list_consultations))
            .route("/{id}/schedule", post(schedule_consultation))
            .route("/{id}/close", post(close_consultation)),
    )
}
