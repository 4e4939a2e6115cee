use thiserror::Error;

use crate::config::DeploymentMode;

pub const NOT_FOUND_MESSAGE: &str = "The requested resource was not found";
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid Slack token";
pub const PRODUCTION_INTERNAL_MESSAGE: &str = "Something went wrong, we're looking into it...";

/// Transport-level failures. These bypass the Slack reply envelope and are
/// rendered as `{status, message}` with a non-200 status code. Domain failures
/// (bad fields, missing record, store outage) never become an `InterfaceError`.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("invalid slack token")]
    InvalidToken { correlation_id: String },
    #[error("no route for `{path}`")]
    NotFound { path: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::BadRequest { .. } => 400,
            Self::InvalidToken { .. } | Self::NotFound { .. } => 404,
            Self::Internal { .. } => 500,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::InvalidToken { correlation_id }
            | Self::NotFound { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }

    /// Message placed in the response envelope. Internal details are only
    /// exposed outside production.
    pub fn user_message(&self, mode: DeploymentMode) -> String {
        match self {
            Self::BadRequest { message, .. } => message.clone(),
            Self::InvalidToken { .. } => INVALID_TOKEN_MESSAGE.to_owned(),
            Self::NotFound { .. } => NOT_FOUND_MESSAGE.to_owned(),
            Self::Internal { message, .. } => {
                if mode.is_production() {
                    PRODUCTION_INTERNAL_MESSAGE.to_owned()
                } else {
                    message.clone()
                }
            }
        }
    }
}
