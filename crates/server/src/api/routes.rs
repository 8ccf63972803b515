use axum::{
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::error;

use super::{handlers, middleware::metrics_middleware, swap};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Swap routes keep the paths existing clients already call
    let swap_routes = Router::new()
        .route("/faceswap", post(swap::single_image))
        .route("/faceswap/dual", post(swap::dual_source_image))
        .route("/faceswap/batch", post(swap::dual_source_batch))
        .route("/faceswap/video", post(swap::video))
        .route("/five-images-faceswap", post(swap::five_target));

    // API routes
    let api_routes = Router::new()
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        .route("/status", get(handlers::get_status));

    Router::new()
        .merge(swap_routes)
        .nest("/api/v1", api_routes)
        .route("/metrics", get(handlers::metrics))
        .route_layer(middleware::from_fn(metrics_middleware))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = detail, "Request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Internal server error" })),
    )
        .into_response()
}
