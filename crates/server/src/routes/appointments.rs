use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::get,
};
use chrono::{DateTime, Duration, Utc};
use db::models::appointment::{Appointment, CreateAppointment, UpdateAppointment};
use serde::Deserialize;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext, require_admin, require_staff},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct RangeQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub therapist_id: Option<Uuid>,
}

/// GET /api/appointments?from&to&therapist_id
/// Calendar for the resolved center. Defaults to the next 30 days.
pub async fn list_appointments(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Query(range): Query<RangeQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Appointment>>>, ApiError> {
    require_staff(&profile, center.id)?;
    let from = range.from.unwrap_or_else(|| Utc::now() - Duration::days(1));
    let to = range.to.unwrap_or_else(|| Utc::now() + Duration::days(30));
    let appointments =
        Appointment::list_by_center_range(&state.db.pool, center.id, from, to, range.therapist_id)
            .await?;
    Ok(ResponseJson(ApiResponse::success(appointments)))
}

/// POST /api/appointments
/// Book a session. Rejects therapist double-bookings with 409.
pub async fn create_appointment(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<CreateAppointment>,
) -> Result<ResponseJson<ApiResponse<Appointment>>, ApiError> {
    require_staff(&profile, center.id)?;
    let appointment = state.scheduling.book(center.id, &payload).await?;

    state.analytics.track(
        "appointment_booked",
        serde_json::json!({
            "center_id": center.id.to_string(),
            "appointment_id": appointment.id.to_string(),
        }),
    );

    Ok(ResponseJson(ApiResponse::success(appointment)))
}

/// PUT /api/appointments/{id}
/// Move, re-assign or re-status a session. Time/therapist changes re-check
/// the calendar; everything else is last-write-wins.
pub async fn update_appointment(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateAppointment>,
) -> Result<ResponseJson<ApiResponse<Appointment>>, ApiError> {
    require_staff(&profile, center.id)?;
    let appointment = state.scheduling.update(id, center.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(appointment)))
}

/// DELETE /api/appointments/{id}
pub async fn delete_appointment(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_admin(&profile, center.id)?;
    let deleted = Appointment::delete(&state.db.pool, id, center.id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("appointment not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/appointments",
        Router::new()
            .route("/", get(list_appointments).post(create_appointment))
            .route(
                "/{id}",
                axum::routing::put(update_appointment).delete(delete_appointment),
            ),
    )
}
