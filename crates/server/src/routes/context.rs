//! The SPA's resolution probe: which center is active for my current route?

use axum::{Extension, Router, response::Json as ResponseJson, routing::get};
use services::services::tenant::TenantResolution;
use utils::response::ApiResponse;

use crate::state::AppState;

/// GET /api/context?path={spa_route}
/// Report the resolved center, the fallback that produced it and whether the
/// client should drop its cached slug.
pub async fn get_context(
    Extension(resolution): Extension<TenantResolution>,
) -> ResponseJson<ApiResponse<TenantResolution>> {
    ResponseJson(ApiResponse::success(resolution))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/context", get(get_context))
}
