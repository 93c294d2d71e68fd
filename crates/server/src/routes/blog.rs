use axum::{
    Router,
    extract::{Path, State},
    response::Json as ResponseJson,
    routing::{get, post},
};
use chrono::Utc;
use db::models::blog_post::{BlogPost, CreateBlogPost, UpdateBlogPost};
use serde::Deserialize;
use ts_rs::TS;
use utils::{response::ApiResponse, slug::slugify};
use uuid::Uuid;

use crate::{
    error::ApiError,
    middleware::{AuthUser, CenterContext, MaybeAuthUser, require_admin, require_staff},
    state::AppState,
};

#[derive(Debug, Deserialize, TS)]
pub struct PublishRequest {
    pub published: bool,
}

/// GET /api/blog
/// Published posts of the resolved center.
pub async fn list_posts(
    State(state): State<AppState>,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<BlogPost>>>, ApiError> {
    let posts = BlogPost::list_published(&state.db.pool, center.id).await?;
    Ok(ResponseJson(ApiResponse::success(posts)))
}

/// GET /api/blog/all
/// Drafts included. Admin only.
pub async fn list_all_posts(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
) -> Result<ResponseJson<ApiResponse<Vec<BlogPost>>>, ApiError> {
    require_admin(&profile, center.id)?;
    let posts = BlogPost::list_by_center(&state.db.pool, center.id).await?;
    Ok(ResponseJson(ApiResponse::success(posts)))
}

/// GET /api/blog/{slug}
/// One post. Drafts are only visible to staff.
pub async fn get_post(
    State(state): State<AppState>,
    MaybeAuthUser(profile): MaybeAuthUser,
    CenterContext(center): CenterContext,
    Path(slug): Path<String>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    let post = BlogPost::find_by_slug(&state.db.pool, center.id, &slug)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;
    if !post.published {
        let is_staff = profile
            .as_ref()
            .is_some_and(|p| require_staff(p, center.id).is_ok());
        if !is_staff {
            return Err(ApiError::NotFound("post not found".to_string()));
        }
    }
    Ok(ResponseJson(ApiResponse::success(post)))
}

/// POST /api/blog
pub async fn create_post(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    axum::Json(payload): axum::Json<CreateBlogPost>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    require_admin(&profile, center.id)?;
    let slug = slugify(&payload.title);
    if slug.is_empty() {
        return Err(ApiError::BadRequest("title yields an empty slug".to_string()));
    }
    if BlogPost::find_by_slug(&state.db.pool, center.id, &slug)
        .await?
        .is_some()
    {
        return Err(ApiError::Conflict(format!(
            "a post with slug '{slug}' already exists"
        )));
    }
    let post = BlogPost::create(&state.db.pool, center.id, &payload, &slug).await?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

/// PUT /api/blog/{id}
pub async fn update_post(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<UpdateBlogPost>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    require_admin(&profile, center.id)?;
    let post = BlogPost::update(&state.db.pool, id, center.id, &payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;
    Ok(ResponseJson(ApiResponse::success(post)))
}

/// POST /api/blog/{id}/publish
pub async fn publish_post(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
    axum::Json(payload): axum::Json<PublishRequest>,
) -> Result<ResponseJson<ApiResponse<BlogPost>>, ApiError> {
    require_admin(&profile, center.id)?;
    let published_at = payload.published.then(Utc::now);
    let post = BlogPost::set_published(&state.db.pool, id, center.id, payload.published, published_at)
        .await?
        .ok_or_else(|| ApiError::NotFound("post not found".to_string()))?;

    if post.published {
        state.analytics.track(
            "post_published",
            serde_json::json!({
                "center_id": center.id.to_string(),
                "slug": post.slug,
            }),
        );
    }

    Ok(ResponseJson(ApiResponse::success(post)))
}

/// DELETE /api/blog/{id}
pub async fn delete_post(
    State(state): State<AppState>,
    AuthUser(profile): AuthUser,
    CenterContext(center): CenterContext,
    Path(id): Path<Uuid>,
) -> Result<ResponseJson<ApiResponse<()>>, ApiError> {
    require_admin(&profile, center.id)?;
    let deleted = BlogPost::delete(&state.db.pool, id, center.id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("post not found".to_string()));
    }
    Ok(ResponseJson(ApiResponse::success(())))
}

pub fn router() -> Router<AppState> {
    Router::new().nest(
        "/blog",
        Router::new()
            .route("/", get(list_posts).post(create_post))
            .route("/all", get(list_all_posts))
            .route("/{slug}", get(get_post))
            .route("/{slug}/edit", axum::routing::put(update_post).delete(delete_post))
            .route("/{slug}/publish", post(publish_post)),
    )
}
