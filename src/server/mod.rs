//! # HTTP API for the Printer Session
//!
//! Exposes the session operations a user interface needs as JSON endpoints.
//!
//! ## Usage
//!
//! ```bash
//! verso serve --listen 0.0.0.0:8080
//! ```
//!
//! | Method | Path | Action |
//! |--------|------|--------|
//! | GET | `/api/status` | Session state and bound printer |
//! | GET | `/api/profiles` | Candidate printer profiles |
//! | POST | `/api/connect` | Discover and connect |
//! | POST | `/api/disconnect` | Disconnect |
//! | POST | `/api/print/test` | Print the self-test page |
//! | POST | `/api/print` | Print `{"kind": "poem", "text": "..."}` |

mod handlers;
mod state;

pub use handlers::print::PrintForm;
pub use handlers::session::StatusResponse;
pub use state::{AppState, ServerConfig};

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::VersoError;
use crate::transport::DeviceHost;

/// Build the API router over shared state.
pub fn router<H: DeviceHost + 'static>(state: Arc<AppState<H>>) -> Router {
    Router::new()
        // Session API
        .route("/api/status", get(handlers::session::status::<H>))
        .route("/api/profiles", get(handlers::session::profiles::<H>))
        .route("/api/connect", post(handlers::session::connect::<H>))
        .route("/api/disconnect", post(handlers::session::disconnect::<H>))
        // Print API
        .route("/api/print", post(handlers::print::print::<H>))
        .route("/api/print/test", post(handlers::print::print_test::<H>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use verso::printer::{PrinterProfile, SessionConfig};
/// use verso::server::{AppState, ServerConfig, serve};
/// use verso::session::DeviceSession;
/// use verso::transport::RfcommHost;
///
/// # async fn example() -> Result<(), verso::VersoError> {
/// let session = DeviceSession::new(RfcommHost::default(), SessionConfig::default());
/// let state = Arc::new(AppState::new(session, PrinterProfile::built_in()));
/// let config = ServerConfig {
///     listen_addr: "0.0.0.0:8080".to_string(),
/// };
///
/// serve(config, state).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve<H: DeviceHost + 'static>(
    config: ServerConfig,
    state: Arc<AppState<H>>,
) -> Result<(), VersoError> {
    let app = router(state.clone());

    info!(listen = %config.listen_addr, profiles = state.profiles.len(), "verso HTTP server starting");

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            VersoError::Server(format!("Failed to bind to {}: {}", config.listen_addr, e))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| VersoError::Server(format!("Server error: {}", e)))?;

    // Release the printer on the way out.
    state.session.disconnect().await;
    Ok(())
}
