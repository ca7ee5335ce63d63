/// Axum webserver implementation
///
/// Server lifecycle: bind, serve, graceful shutdown on the service Notify
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Notify;
use tower_http::cors::CorsLayer;

use crate::{
    logger::{self, LogTag},
    webserver::{routes, state::AppState},
};

/// Bind `host:port`; errors carry a readable explanation for the common cases
pub async fn bind(host: &str, port: u16) -> Result<TcpListener, String> {
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| format!("Invalid bind address '{}:{}': {}", host, port, e))?;

    TcpListener::bind(&addr).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => {
            format!(
                "Failed to bind to {}: Address already in use (is another yieldwatch instance running?)",
                addr
            )
        }
        std::io::ErrorKind::PermissionDenied => {
            format!(
                "Failed to bind to {}: Permission denied (port {} may require elevated privileges)",
                addr, port
            )
        }
        _ => format!("Failed to bind to {}: {}", addr, e),
    })
}

/// Serve the API on an already bound listener until `shutdown` is notified
pub async fn serve(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
) -> Result<(), String> {
    let app = build_app(state);

    if let Ok(addr) = listener.local_addr() {
        logger::info(
            LogTag::Webserver,
            &format!("API available at http://{}/api", addr),
        );
    }

    let shutdown_signal = async move {
        shutdown.notified().await;
        logger::debug(
            LogTag::Webserver,
            "Received shutdown signal, stopping webserver...",
        );
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|e| format!("Server error: {}", e))?;

    logger::info(LogTag::Webserver, "Webserver stopped gracefully");

    Ok(())
}

/// Build the Axum application with all routes and middleware
pub fn build_app(state: Arc<AppState>) -> Router {
    routes::create_router(state).layer(CorsLayer::permissive())
}
