//! Per-request failures of the chat endpoint and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{error, warn};

use crate::backend::UpstreamFailure;
use crate::config::API_KEY_ENV;

/// A chat request that could not be answered.
///
/// Every variant renders as a plain-text body with a non-2xx status.
#[derive(Debug, Error)]
pub enum ChatError {
    /// No upstream credential configured; nothing is sent upstream.
    #[error("{} missing on server", API_KEY_ENV)]
    MissingCredential,

    /// Message absent or blank after trimming.
    #[error("message is required")]
    EmptyMessage,

    /// Body was not acceptable JSON.
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },

    /// The upstream call failed.
    #[error("{0}")]
    Upstream(UpstreamFailure),
}

impl ChatError {
    /// HTTP status sent to the caller
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            ChatError::EmptyMessage => StatusCode::BAD_REQUEST,
            ChatError::InvalidBody { status, .. } => *status,
            ChatError::Upstream(failure) => upstream_status(failure),
        }
    }

    /// Plain-text body sent to the caller
    pub fn body(&self) -> String {
        match self {
            ChatError::Upstream(failure) => failure.resolve_message().to_string(),
            other => other.to_string(),
        }
    }
}

/// Resolved upstream status, kept only if it is an HTTP error status.
fn upstream_status(failure: &UpstreamFailure) -> StatusCode {
    StatusCode::from_u16(failure.resolve_status())
        .ok()
        .filter(|s| s.is_client_error() || s.is_server_error())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl From<UpstreamFailure> for ChatError {
    fn from(failure: UpstreamFailure) -> Self {
        ChatError::Upstream(failure)
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();

        match &self {
            ChatError::Upstream(failure) => {
                error!(status = status.as_u16(), failure = ?failure, "Upstream call failed");
            }
            ChatError::MissingCredential => {
                error!(status = status.as_u16(), "Rejecting chat request: {}", body);
            }
            _ => {
                warn!(status = status.as_u16(), "Rejecting chat request: {}", body);
            }
        }

        (status, body).into_response()
    }
}
