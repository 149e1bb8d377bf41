use crate::server::DraftServer;
use axum::extract::ws::WebSocketUpgrade;
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use axum::routing::get;
use std::net::SocketAddr;
use std::sync::Arc;

use super::connection::handle_socket;

/// Create the axum router: the WebSocket endpoint on the configured path plus
/// a health probe. Origin policy defaults to permissive and narrows when a
/// comma-separated origin list is configured.
pub fn create_router(ws_path: &str, cors_origins: &str) -> axum::Router<Arc<DraftServer>> {
    use tower_http::cors::{Any, CorsLayer};
    use tower_http::trace::TraceLayer;

    let cors = if cors_origins == "*" {
        CorsLayer::permissive()
    } else {
        let origins: Vec<_> = cors_origins
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();

        if origins.is_empty() {
            tracing::warn!("No valid CORS origins configured, using permissive CORS");
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
    };

    axum::Router::new()
        .route(ws_path, get(websocket_handler))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// WebSocket upgrade handler for the draft protocol.
async fn websocket_handler(
    ws: WebSocketUpgrade,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(server): State<Arc<DraftServer>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, server, addr))
}

/// Health check endpoint
async fn health_check(
    State(server): State<Arc<DraftServer>>,
) -> axum::response::Result<&'static str> {
    if server.health_check().await {
        Ok("OK")
    } else {
        Err(axum::http::StatusCode::SERVICE_UNAVAILABLE.into())
    }
}
