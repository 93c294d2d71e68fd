use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use db::models::review::{CreateReview, Review};
use utils::response::ApiResponse;
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext, MaybeAuthUser, require_admin},
    state::AppState,
};

/// GET /api/reviews
/// Approved reviews, public.
pub async fn list_reviews(
    State(state): State<AppState>,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<Review>>>, ApiError> {
    let reviews = Review::list_approved(&state.db.pool, center.id).await?;
    Ok(ResponseJson(ApiResponse::success(reviews)))
}

/// GET /api/reviews/all
/// Every review, pending ones included. Admin only.
pub async fn list_all_reviews(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<Review>>>, ApiError> {
    require_admin(&profile, center.id)?;
    let reviews = Review::list_by_center(&state.db.pool, center.id).await?;
    Ok(ResponseJson(ApiResponse::success(reviews)))
}

/// POST /api/reviews
/// Submit a review. Goes live once an admin approves it.
pub async fn create_review(
    State(state): State<AppState>,
    MaybeAuthUser(profile): MaybeAuthUser,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<CreateReview>,
) -> Result<ResponseJson<ApiResponse<Review>>, ApiError> {
    if !(1..=5).contains(&payload.rating) {
        return Err(ApiError::BadRequest("rating must be between 1 and 5".to_string()));
    }
    if payload.author_name.trim().is_empty() {
        return Err(ApiError::BadRequest("author name is required".to_string()));
    }
    let review = Review::create(
        &state.db.pool,
        center.id,
        profile.map(|p| p.id),
        &payload,
    )
    .await?;
    Ok(ResponseJson(ApiResponse::success(review)))
}

/// POST /api/reviews/{id}/approve
pub async fn approve_review(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<Review>>, ApiError> {
    require_admin(&profile, center.id)?;
    let review = Review::set_approved(&state.db.pool, id, center.id, true)
        .await?
        .ok_or_else(|| ApiError::NotFound("review not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(review)))
}

/// DELETE /api/reviews/{id}
pub async fn delete_review(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_admin(&profile, center.id)?;
    let deleted = Review::delete(&state.db.pool, id, center.id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("review not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/reviews",
        Router::new()
            .route("/", get(list_reviews).post(create_review))
            .route("/all", get(list_all_reviews))
            .route("/{id}", axum::routing::delete(delete_review))
            .route("/{id}/approve", post(approve_review)),
    )
}
