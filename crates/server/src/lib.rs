pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::{Router, middleware::from_fn_with_state, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub use crate::state::AppState;

async fn root_handler() -> &'static str {
    "OK"
}

/// Assemble the full application router.
pub fn app(state: AppState) -> Router {
    let api = Router::new()
        .merge(routes::context::router())
        .merge(routes::auth::router())
        .merge(routes::centers::router())
        .merge(routes::profiles::router())
        .merge(routes::invitations::router())
        .merge(routes::children::router())
        .merge(routes::therapists::router())
        .merge(routes::appointments::router())
        .merge(routes::payments::router())
        .merge(routes::leads::router())
        .merge(routes::consultations::router())
        .merge(routes::reviews::router())
        .merge(routes::blog::router())
        .merge(routes::reports::router())
        .merge(routes::notifications::router())
        .layer(from_fn_with_state(state.clone(), middleware::resolve_center));

    Router::new()
        .route("/health", get(root_handler))
        .merge(routes::seo::router())
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
