use std::any::Any;

use axum::{
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

use crate::error::AppError;
use crate::middleware::{cors_headers, make_span_with_request_id, request_id_middleware};

use super::handlers;
use super::AppState;

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route(
            "/recommendations",
            get(handlers::recommendations).options(handlers::preflight),
        );

    with_layers(routes).with_state(state)
}

/// Request id, tracing, CORS and panic recovery, outermost first
pub fn with_layers(router: Router<AppState>) -> Router<AppState> {
    router.layer(
        ServiceBuilder::new()
            .layer(middleware::from_fn(request_id_middleware))
            .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
            .layer(middleware::from_fn(cors_headers))
            .layer(CatchPanicLayer::custom(handle_panic)),
    )
}

/// Turns a handler panic into the generic 500 envelope
fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    AppError::Internal(format!("handler panicked: {}", details)).into_response()
}
