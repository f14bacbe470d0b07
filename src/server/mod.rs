//! HTTP Server
//!
//! Exposes the relay over three JSON endpoints:
//!
//! - `POST /api/chat` - fan a message out to every chat provider
//! - `POST /api/generate-image` - fan a prompt out to every image provider
//! - `GET /api/wake` - liveness check

mod handlers;

use crate::Relay;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub use handlers::{ChatRequest, ChatResponse, ImageRequest};

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub relay: Arc<Relay>,
}

impl AppState {
    pub fn new(relay: Relay) -> Self {
        Self {
            relay: Arc::new(relay),
        }
    }
}

/// Build the router with CORS open to any origin.
///
/// A panic inside a handler still answers 200 with the route's error shape.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(handlers::chat).layer(CatchPanicLayer::custom(handlers::chat_panic)),
        )
        .route(
            "/api/generate-image",
            post(handlers::generate_image).layer(CatchPanicLayer::custom(handlers::image_panic)),
        )
        .route("/api/wake", get(handlers::wake))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Bind `host:port` and serve until the process exits
pub async fn serve(state: AppState, host: &str, port: u16) -> anyhow::Result<()> {
    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    let config = state.relay.config();
    info!(
        addr = %addr,
        chat_providers = config.chat_providers().count(),
        image_providers = config.image_providers().count(),
        "polyrelay listening"
    );

    axum::serve(listener, router(state)).await?;

    Ok(())
}
