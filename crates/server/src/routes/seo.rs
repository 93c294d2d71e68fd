//! SEO artifacts served at the site root, outside `/api`.

use axum::{Router, extract::State, http::header, response::IntoResponse, routing::get};

use crate::{error::ApiError, state::AppState};

/// GET /sitemap.xml
pub async fn sitemap(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let xml = state.seo.sitemap_xml().await?;
    Ok(([(header::CONTENT_TYPE, "application/xml")], xml))
}

/// GET /robots.txt
pub async fn robots(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain")],
        state.seo.robots_txt(),
    )
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sitemap.xml", get(sitemap))
        .route("/robots.txt", get(robots))
}
