use std::any::Any;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use expertise_core::{config::DeploymentMode, errors::InterfaceError};
use serde::Serialize;
use tracing::{error, warn};

/// Body of every non-200 response: `{status, message}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub status: u16,
    pub message: String,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    envelope: ErrorEnvelope,
}

impl ApiError {
    pub fn from_interface(error: &InterfaceError, mode: DeploymentMode) -> Self {
        let status = StatusCode::from_u16(error.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            error!(
                event_name = "http.request.failed",
                correlation_id = %error.correlation_id(),
                status = status.as_u16(),
                error = %error,
                "request failed"
            );
        } else {
            warn!(
                event_name = "http.request.rejected",
                correlation_id = %error.correlation_id(),
                status = status.as_u16(),
                error = %error,
                "request rejected"
            );
        }

        Self {
            status,
            envelope: ErrorEnvelope {
                status: status.as_u16(),
                message: error.user_message(mode),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.envelope)).into_response()
    }
}

/// Turns a handler panic into the 500 envelope. Outside production the panic
/// payload is echoed back.
pub fn panic_response(
    mode: DeploymentMode,
    correlation_id: &str,
    panic: Box<dyn Any + Send + 'static>,
) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "unknown panic payload".to_owned()
    };

    let error = InterfaceError::Internal {
        message: format!("handler panicked: {detail}"),
        correlation_id: correlation_id.to_owned(),
    };
    ApiError::from_interface(&error, mode).into_response()
}
