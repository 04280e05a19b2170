use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::{middleware, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_owner;
use crate::handlers;
use crate::state::AppState;

/// Build the axum router with all fragment endpoints.
pub fn build_router(state: AppState) -> Router {
    let fragments = Router::new()
        .route(
            "/v1/fragments",
            get(handlers::list_fragments).post(handlers::create_fragment),
        )
        .route(
            "/v1/fragments/:id",
            get(handlers::get_fragment)
                .put(handlers::update_fragment)
                .delete(handlers::delete_fragment),
        )
        .route("/v1/fragments/:id/info", get(handlers::get_fragment_info))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_owner));

    Router::new()
        .route("/", get(handlers::health))
        .merge(fragments)
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(state.config.max_body_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
