//! HTTP service: `GET /`, `POST /upload`, `POST /generate`.
//!
//! Built on axum. [`router`] is public so tests (and embedding applications)
//! can drive the service without opening a socket; [`serve`] binds the
//! configured port and runs until the process is stopped.

pub mod handlers;
pub mod models;
pub mod state;
pub mod upload;

use crate::error::StudyError;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

pub use state::AppState;

/// Build the application router for the given state.
pub fn router(state: Arc<AppState>) -> Router {
    let body_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    let mut app = Router::new()
        .route("/", get(handlers::health))
        .route("/upload", post(handlers::upload))
        .route("/generate", post(handlers::generate))
        .layer(body_limit);

    // Validated by ServerConfigBuilder::build; an invalid origin just disables CORS.
    if let Ok(origin) = HeaderValue::from_str(&state.config.allowed_origin) {
        app = app.layer(
            CorsLayer::new()
                .allow_origin(origin)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers([header::CONTENT_TYPE]),
        );
    }

    app.with_state(state)
}

/// Bind `0.0.0.0:{port}` and serve until shutdown.
pub async fn serve(state: Arc<AppState>) -> Result<(), StudyError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.port));
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StudyError::Internal(format!("Failed to bind {addr}: {e}")))?;
    info!("Server running on http://{addr}");

    axum::serve(listener, app)
        .await
        .map_err(|e| StudyError::Internal(format!("Server error: {e}")))
}
