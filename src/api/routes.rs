//! API route configuration.

use axum::error_handling::HandleErrorLayer;
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::routing::get;
use axum::{BoxError, Json, Router};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{self, AppState};
use super::types::ErrorBody;
use crate::models::errors::ErrorCode;
use crate::utils::constants::REQUEST_DEADLINE_SECS;

/// Create the API router with all routes and middleware.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Browser wallets call this from any origin; read-only API, no
    // credentials, GET and preflight only.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/check", get(handlers::check))
        .route("/health", get(handlers::health))
        .fallback(handlers::not_found)
        .with_state(state)
        // Middleware (order matters - bottom runs first)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Assessments must never be served stale: on-chain state moves
        // between checks.
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_deadline))
                .timeout(Duration::from_secs(REQUEST_DEADLINE_SECS)),
        )
}

/// Whole-request deadline backstop; an unresponsive upstream cannot hold a
/// connection open indefinitely.
async fn handle_deadline(_err: BoxError) -> (StatusCode, Json<ErrorBody>) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            error: ErrorCode::RpcTimeout.as_str(),
            message: "request deadline exceeded".to_string(),
        }),
    )
}
