use axum::http::Method;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler::{self, SharedState};

/// Build the axum router with all gateway endpoints.
pub fn build_router(state: SharedState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handler::health))
        .route("/list/:prefix", get(handler::list_records))
        .route("/:hex", get(handler::get_record))
        .route("/", post(handler::submit_record))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
