//! HTTP surface for tabula.
//!
//! Upload tables as JSON, browse them, and ask questions that a model answers
//! through read-only SQL tools.
//!
//! ```rust,ignore
//! let settings = Settings::from_env()?;
//! let state = AppState::from_settings(&settings)?;
//! tabula_server::serve(state, "0.0.0.0:8000".parse()?).await?;
//! ```

pub mod error;
pub mod response;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use error::{AppError, AppResult};
pub use response::{ApiError, ApiResponse};
pub use state::AppState;

/// The complete application with middleware.
pub fn router(state: AppState) -> Router {
    routes::routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on `addr` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(state: AppState, addr: SocketAddr) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down");
    }
}
