//! Print handlers.

use axum::{Json, extract::State, response::Response};
use serde::Deserialize;
use std::sync::Arc;

use crate::job::{ContentKind, PrintJob};
use crate::orchestrator;
use crate::transport::DeviceHost;

use super::super::state::AppState;
use super::{error_response, success_response};

/// Request body for printing generated content.
#[derive(Debug, Deserialize)]
pub struct PrintForm {
    /// Content kind, used as the title
    #[serde(default)]
    pub kind: ContentKind,
    /// Text supplied by the content source
    pub text: String,
}

/// POST /api/print - Print generated content.
pub async fn print<H: DeviceHost + 'static>(
    State(state): State<Arc<AppState<H>>>,
    Json(form): Json<PrintForm>,
) -> Response {
    let job = PrintJob::generated(form.kind, form.text);
    match orchestrator::print_now(&state.session, &job).await {
        Ok(()) => success_response(&format!("Printed {}", form.kind)),
        Err(e) => error_response(&e),
    }
}

/// POST /api/print/test - Print the self-test page.
pub async fn print_test<H: DeviceHost + 'static>(
    State(state): State<Arc<AppState<H>>>,
) -> Response {
    match orchestrator::print_test(&state.session).await {
        Ok(()) => success_response("Test page printed"),
        Err(e) => error_response(&e),
    }
}
