use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Json as ResponseJson},
    routing::get,
};
use db::models::progress_report::{CreateProgressReport, ProgressReport, UpdateProgressReport};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext, require_admin, require_staff},
    state::AppState,
};

/// GET /api/reports
pub async fn list_reports(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<ProgressReport>>>, ApiError> {
    require_staff(&profile, center.id)?;
    let reports = ProgressReport::list_by_center(&state.db.pool, center.id).await?;
    Ok(ResponseJson(ApiResponse::success(reports)))
}

/// POST /api/reports
pub async fn create_report(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<CreateProgressReport>,
) -> Result<ResponseJson<ApiResponse<ProgressReport>>, ApiError> {
    require_staff(&profile, center.id)?;
    let report = ProgressReport::create(&state.db.pool, center.id, &payload).await?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

/// PUT /api/reports/{id}
/// Edit a report or toggle parent sharing.
pub async fn update_report(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateProgressReport>,
) -> Result<ResponseJson<ApiResponse<ProgressReport>>, ApiError> {
    require_staff(&profile, center.id)?;
    let report = ProgressReport::update(&state.db.pool, id, center.id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("report not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(report)))
}

/// DELETE /api/reports/{id}
pub async fn delete_report(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_admin(&profile, center.id)?;
    let deleted = ProgressReport::delete(&state.db.pool, id, center.id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("report not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/reports/export.csv
/// The center's full report table, for spreadsheets.
pub async fn export_reports(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
) -> Result<impl IntoResponse, ApiError> {
    require_admin(&profile, center.id)?;
    let csv = state.reports.export_csv(center.id).await?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"progress-reports.csv\"",
            ),
        ],
        csv,
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/reports",
        Router::new()
            .route("/", get(list_reports).post(create_report))
            .route("/export.csv", get(export_reports))
            .route("/{id}", axum::routing::put(update_report).delete(delete_report)),
    )
}
