use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, put},
};
use db::models::{
    blog_post::BlogPost,
    center::{Center, CreateCenter, UpdateCenter},
    review::Review,
    therapist::Therapist,
};
use serde::Serialize;
use ts_rs::TS;
use utils::{response::ApiResponse, slug::slugify};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, require_admin, require_super_admin},
    state::AppState,
};

/// Everything the public center page needs in one round trip.
#[derive(Debug, Serialize, TS)]
pub struct CenterPublicPage {
    pub center: Center,
    pub therapists: Vec<Therapist>,
    pub reviews: Vec<Review>,
    pub posts: Vec<BlogPost>,
}

/// GET /api/centers
/// Public directory of active centers.
pub async fn list_centers(
    State(state): State<AppState>,
) -> Result<ResponseJson<ApiResponse<Vec<Center>>>, ApiError> {
    let centers = Center::list_active(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(centers)))
}

/// GET /api/centers/{slug}
/// Public page data for one center.
pub async fn get_center_page(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ResponseJson<ApiResponse<CenterPublicPage>>, ApiError> {
    let center = Center::find_by_slug(&state.db.pool, &slug)
        .await?
        .filter(|c| c.active)
        .ok_or_else(|| ApiError::NotFound("center not found".to_string()))?;

    let therapists = Therapist::list_by_center(&state.db.pool, center.id)
        .await?
        .into_iter()
        .filter(|t| t.active)
        .collect();
    let reviews = Review::list_approved(&state.db.pool, center.id).await?;
    let posts = BlogPost::list_published(&state.db.pool, center.id).await?;

    Ok(ResponseJson(ApiResponse::success(CenterPublicPage {
        center,
        therapists,
        reviews,
        posts,
    })))
}

/// POST /api/centers
/// Create a tenant. Super admin only.
pub async fn create_center(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    axum::Json(payload): axum::Json<CreateCenter>,
) -> Result<ResponseJson<ApiResponse<Center>>, ApiError> {
    require_super_admin(&profile)?;

    let slug = payload
        .slug
        .clone()
        .unwrap_or_else(|| slugify(&payload.name));
    if slug.is_empty() {
        return Err(ApiError::BadRequest("center name yields an empty slug".to_string()));
    }
    if Center::find_by_slug(&state.db.pool, &slug).await?.is_some() {
        return Err(ApiError::Conflict(format!("slug '{slug}' is already taken")));
    }

    let center = Center::create(&state.db.pool, &payload, &slug).await?;

    state.analytics.track(
        "center_created",
        serde_json::json!({
            "center_id": center.id.to_string(),
            "slug": center.slug,
        }),
    );

    Ok(ResponseJson(ApiResponse::success(center)))
}

/// PUT /api/centers/{id}
/// Update a center. Center admin or super admin.
pub async fn update_center(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateCenter>,
) -> Result<ResponseJson<ApiResponse<Center>>, ApiError> {
    require_admin(&profile, id)?;
    let center = Center::update(&state.db.pool, id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("center not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(center)))
}

/// DELETE /api/centers/{id}
/// Remove a tenant and all of its rows. Super admin only.
pub async fn delete_center(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_super_admin(&profile)?;
    let deleted = Center::delete(&state.db.pool, id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("center not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

/// GET /api/admin/centers
/// Full tenant list, inactive included. Super admin only.
pub async fn list_all_centers(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
) -> Result<ResponseJson<ApiResponse<Vec<Center>>>, ApiError> {
    require_super_admin(&profile)?;
    let centers = Center::list_all(&state.db.pool).await?;
    Ok(ResponseJson(ApiResponse::success(centers)))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/centers", get(list_centers).post(create_center))
        .route("/centers/{slug}", get(get_center_page))
        .route("/admin/centers", get(list_all_centers))
        .route("/admin/centers/{id}", put(update_center).delete(delete_center))
}
