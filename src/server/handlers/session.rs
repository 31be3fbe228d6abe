//! Session API handlers.

use axum::{Json, extract::State, response::Response};
use serde::Serialize;
use std::sync::Arc;

use crate::orchestrator;
use crate::printer::PrinterProfile;
use crate::session::SessionState;
use crate::transport::DeviceHost;

use super::super::state::AppState;
use super::{error_response, success_response};

/// Session status for display.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: SessionState,
    pub connected: bool,
    /// Name of the bound printer profile, if connected.
    pub printer: Option<String>,
}

/// GET /api/status - Current session state.
pub async fn status<H: DeviceHost + 'static>(
    State(state): State<Arc<AppState<H>>>,
) -> Json<StatusResponse> {
    let session = &state.session;
    Json(StatusResponse {
        state: session.state(),
        connected: session.is_connected(),
        printer: session.profile().map(|p| p.name),
    })
}

/// GET /api/profiles - Candidate profiles, in discovery order.
pub async fn profiles<H: DeviceHost + 'static>(
    State(state): State<Arc<AppState<H>>>,
) -> Json<Vec<PrinterProfile>> {
    Json(state.profiles.clone())
}

/// POST /api/connect - Discover and connect.
pub async fn connect<H: DeviceHost + 'static>(State(state): State<Arc<AppState<H>>>) -> Response {
    match orchestrator::connect(&state.session, &state.profiles).await {
        Ok(profile) => success_response(&format!("Connected to {}", profile.name)),
        Err(e) => error_response(&e),
    }
}

/// POST /api/disconnect - Disconnect. Always succeeds.
pub async fn disconnect<H: DeviceHost + 'static>(
    State(state): State<Arc<AppState<H>>>,
) -> Response {
    state.session.disconnect().await;
    success_response("Disconnected")
}
