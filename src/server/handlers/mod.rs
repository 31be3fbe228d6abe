//! HTTP handlers for the server.

pub mod print;
pub mod session;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::error::{JobError, VersoError};

/// Generate success response JSON.
pub(crate) fn success_response(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(json!({ "success": true, "message": message })),
    )
        .into_response()
}

/// Generate error response JSON, carrying the failing phase and a hint.
pub(crate) fn error_response(err: &JobError) -> Response {
    let status = match &err.source {
        VersoError::EmptyContent | VersoError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
        VersoError::NoDeviceFound => StatusCode::NOT_FOUND,
        VersoError::AlreadyInProgress | VersoError::Busy | VersoError::NotConnected => {
            StatusCode::CONFLICT
        }
        VersoError::NotSupported => StatusCode::NOT_IMPLEMENTED,
        VersoError::UserCancelled => StatusCode::REQUEST_TIMEOUT,
        VersoError::ConnectionFailed(_)
        | VersoError::TransmitFailed { .. }
        | VersoError::LinkLost
        | VersoError::Io(_)
        | VersoError::Server(_) => StatusCode::BAD_GATEWAY,
    };

    (
        status,
        Json(json!({
            "success": false,
            "phase": err.phase,
            "error": err.source.to_string(),
            "hint": err.hint(),
        })),
    )
        .into_response()
}
