//! Stream transport server.
//!
//! Routes:
//! - `GET /stream?query=...` - event stream, one frame per fragment
//! - `GET /complete?query=...` - whole output as one plain-text body
//! - `GET /health` - liveness check
//!
//! Sessions share nothing but the producer handle; each request opens its own
//! producer sequence and owns its own response body.

mod handlers;
mod session;

pub use handlers::{complete_handler, health_handler, stream_handler, QueryParams};
pub use session::StreamSession;

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::ServerError;
use crate::traits::FragmentProducer;

pub const STREAM_PATH: &str = "/stream";
pub const COMPLETE_PATH: &str = "/complete";
pub const HEALTH_PATH: &str = "/health";
/// Name of the query parameter carrying the user text.
pub const QUERY_PARAM: &str = "query";

/// Shared state for the handlers.
#[derive(Clone)]
pub struct ServerState {
    /// Backend every session draws its fragments from
    pub producer: Arc<dyn FragmentProducer>,
}

/// Build the application router.
pub fn create_router(producer: Arc<dyn FragmentProducer>) -> Router {
    // Configure CORS so pages served elsewhere can subscribe
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(STREAM_PATH, get(stream_handler))
        .route(COMPLETE_PATH, get(complete_handler))
        .route(HEALTH_PATH, get(health_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ServerState { producer })
}

async fn bind(addr: SocketAddr) -> Result<tokio::net::TcpListener, ServerError> {
    tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })
}

/// Start the server in the background on `addr`.
///
/// Returns the server task and the bound address, so tests can pass port 0.
pub async fn start_server_on(
    addr: SocketAddr,
    producer: Arc<dyn FragmentProducer>,
) -> Result<(JoinHandle<()>, SocketAddr), ServerError> {
    let listener = bind(addr).await?;
    let actual_addr = listener.local_addr()?;
    let app = create_router(producer);

    tracing::info!("Stream server listening on http://{}", actual_addr);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Stream server error: {}", e);
        }
    });

    Ok((handle, actual_addr))
}

/// Run the server on `addr` until `shutdown` resolves.
pub async fn serve<F>(
    addr: SocketAddr,
    producer: Arc<dyn FragmentProducer>,
    shutdown: F,
) -> Result<(), ServerError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = bind(addr).await?;
    let actual_addr = listener.local_addr()?;
    let app = create_router(producer);

    tracing::info!("Stream server listening on http://{}", actual_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("Stream server stopped");
    Ok(())
}
