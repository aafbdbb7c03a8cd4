//! REST API module
//!
//! HTTP surface over the generation client, the design store and the
//! sharing helpers.

pub mod design_routes;

pub use design_routes::{create_design_router, AppState};

use axum::Router;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Design routes wrapped in request tracing and permissive CORS
pub fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    create_design_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(cors),
    )
}
