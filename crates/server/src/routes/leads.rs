use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{post, put},
};
use db::models::{
    consultation::{Consultation, CreateConsultation},
    lead::{CreateLead, Lead, LeadStatus},
};
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
pub struct SetLeadStatusRequest {
    pub status: LeadStatus,
}

#[derive(Debug, Deserialize, TS)]
pub struct ConvertLeadRequest {
    pub child_name: String,
}

/// POST /api/leads
/// Public inquiry form into the resolved center.
pub async fn create_lead(
    State(state): State<AppState>,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<CreateLead>,
) -> Result<ResponseJson<ApiResponse<Lead>>, ApiError> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::BadRequest("name is required".to_string()));
    }
    let lead = Lead::create(&state.db.pool, center.id, &payload).await?;

    state.analytics.track(
        "lead_created",
        serde_json::json!({
            "center_id": center.id.to_string(),
            "source": lead.source,
        }),
    );

    Ok(ResponseJson(ApiResponse::success(lead)))
}

/// GET /api/leads
pub async fn list_leads(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<Lead>>>, ApiError> {
    require_admin(&profile, center.id)?;
    let leads = Lead::list_by_center(&state.db.pool, center.id).await?;
    Ok(ResponseJson(ApiResponse::success(leads)))
}

/// PUT /api/leads/{id}/status
pub async fn set_lead_status(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<SetLeadStatusRequest>,
) -> Result<ResponseJson<ApiResponse<Lead>>, ApiError> {
    require_admin(&profile, center.id)?;
    let lead = Lead::set_status(&state.db.pool, id, center.id, payload.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("lead not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(lead)))
}

/// POST /api/leads/{id}/convert
/// Turn an inquiry into an intake consultation.
pub async fn convert_lead(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<ConvertLeadRequest>,
) -> Result<ResponseJson<ApiResponse<Consultation>>, ApiError> {
    require_admin(&profile, center.id)?;
    let lead = Lead::find_by_id(&state.db.pool, id)
        .await?
        .filter(|l| l.center_id == center.id)
        .ok_or_else(|| ApiError::NotFound("lead not found".to_string()))?;

    let consultation = Consultation::create(
        &state.db.pool,
        center.id,
        &CreateConsultation {
            lead_id: Some(lead.id),
            child_name: payload.child_name,
            parent_name: lead.name.clone(),
            phone: lead.phone.clone(),
        },
    )
    .await?;
    Lead::set_status(&state.db.pool, lead.id, center.id, LeadStatus::Converted).await?;

    state.analytics.track(
        "lead_converted",
        serde_json::json!({
            "center_id": center.id.to_string(),
            "lead_id": lead.id.to_string(),
        }),
    );

    Ok(ResponseJson(ApiResponse::success(consultation)))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/leads",
        Router::new()
            .route("/", post(create_lead).get(list_leads))
            .route("/{id}/status", put(set_lead_status))
            .route("/{id}/convert", post(convert_lead)),
    )
}
