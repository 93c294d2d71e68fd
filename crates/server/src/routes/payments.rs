use axum::{
    Router,
    extract::{Path, Query, State},
    response::Json as ResponseJson,
    routing::{get, post, put},
};
use chrono::Utc;
use db::models::payment::{CreatePayment, Payment, PaymentStatus, PaymentSummaryRow};
use serde::Deserialize;
use ts_rs::TS;
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext, require_admin, require_staff},
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct PeriodQuery {
    pub period: Option<String>,
}

fn current_period() -> String {
    Utc::now().format("%Y-%m").to_string()
}

#[derive(Debug, Deserialize, TS)]
pub struct MarkPaidRequest {
    pub method: Option<String>,
}

#[derive(Debug, Deserialize, TS)]
pub struct SetStatusRequest {
    pub status: PaymentStatus,
}

/// GET /api/payments?period=YYYY-MM
pub async fn list_payments(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Query(query): Query<PeriodQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<Payment>>>, ApiError> {
    require_staff(&profile, center.id)?;
    let period = query.period.unwrap_or_else(current_period);
    let payments = Payment::list_by_center_period(&state.db.pool, center.id, &period).await?;
    Ok(ResponseJson(ApiResponse::success(payments)))
}

/// GET /api/payments/summary?period=YYYY-MM
/// Totals by status for one billing month.
pub async fn payment_summary(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Query(query): Query<PeriodQuery>,
) -> Result<ResponseJson<ApiResponse<Vec<PaymentSummaryRow>>>, ApiError> {
    require_admin(&profile, center.id)?;
    let period = query.period.unwrap_or_else(current_period);
    let summary = Payment::summarize_period(&state.db.pool, center.id, &period).await?;
    Ok(ResponseJson(ApiResponse::success(summary)))
}

/// POST /api/payments
pub async fn create_payment(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<CreatePayment>,
) -> Result<ResponseJson<ApiResponse<Payment>>, ApiError> {
    require_admin(&profile, center.id)?;
    if payload.amount_cents <= 0 {
        return Err(ApiError::BadRequest("amount must be positive".to_string()));
    }
    let payment = Payment::create(&state.db.pool, center.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(payment)))
}

/// POST /api/payments/{id}/paid
pub async fn mark_paid(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<MarkPaidRequest>,
) -> Result<ResponseJson<ApiResponse<Payment>>, ApiError> {
    require_admin(&profile, center.id)?;
    let payment = Payment::mark_paid(&state.db.pool, id, center.id, payload.method, Utc::now())
        .await?
        .ok_or_else(|| ApiError::NotFound("payment not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(payment)))
}

/// PUT /api/payments/{id}/status
pub async fn set_payment_status(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<SetStatusRequest>,
) -> Result<ResponseJson<ApiResponse<Payment>>, ApiError> {
    require_admin(&profile, center.id)?;
    let payment = Payment::set_status(&state.db.pool, id, center.id, payload.status)
        .await?
        .ok_or_else(|| ApiError::NotFound("payment not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(payment)))
}

/// DELETE /api/payments/{id}
pub async fn delete_payment(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_admin(&profile, center.id)?;
    let deleted = Payment::delete(&state.db.pool, id, center.id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("payment not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/payments",
        Router::new()
            .route("/", get(list_payments).post(create_payment))
            .route("/summary", get(payment_summary))
            .route("/{id}", axum::routing::delete(delete_payment))
            .route("/{id}/paid", post(mark_paid))
            .route("/{id}/status", put(set_payment_status)),
    )
}
