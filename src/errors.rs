//! Route-boundary error type. Every handler returns [`AppResult`], so nothing
//! escapes as an unhandled failure: each variant renders as `{"error": "..."}`
//! with a matching status code.

use axum::{
    extract::{multipart::MultipartRejection, rejection::BytesRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::services::backend::ProxyError;

pub type AppResult<T> = Result<T, AppError>;

pub const GENERIC_FAILURE: &str = "Something went wrong. Please try again later.";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("You do not have permission to perform this action")]
    Forbidden,

    #[error("{0}")]
    BadRequest(String),

    /// The request body could not be read by an extractor.
    #[error("{message}")]
    InvalidBody { status: StatusCode, message: String },

    /// Backend answered with a non-2xx status; status and message are forwarded.
    #[error("{message}")]
    Upstream { status: StatusCode, message: String },

    /// Backend unreachable or its response could not be read.
    #[error("Backend request failed: {0}")]
    Transport(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Unauthorized                  => StatusCode::UNAUTHORIZED,
            AppError::Forbidden                     => StatusCode::FORBIDDEN,
            AppError::BadRequest(_)                 => StatusCode::BAD_REQUEST,
            AppError::InvalidBody { status, .. }    => *status,
            AppError::Upstream { status, .. }       => *status,
            AppError::Transport(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the browser. Transport and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Transport(_) | AppError::Internal(_) => GENERIC_FAILURE.to_owned(),
            other => other.to_string(),
        }
    }
}

impl From<ProxyError> for AppError {
    fn from(err: ProxyError) -> Self {
        match err {
            ProxyError::Unauthorized                => AppError::Unauthorized,
            ProxyError::Upstream { status, message } => AppError::Upstream { status, message },
            ProxyError::Transport(e)                => AppError::Transport(e),
            ProxyError::Decode(e)                   => AppError::Transport(format!("invalid response body: {e}")),
        }
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::InvalidBody { status: rejection.status(), message: rejection.body_text() }
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::InvalidBody { status: rejection.status(), message: rejection.body_text() }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Transport(detail) => tracing::error!(%detail, "Backend call failed"),
            AppError::Internal(err)     => tracing::error!(error = ?err, "Internal error"),
            AppError::Upstream { status, message } => {
                tracing::debug!(%status, %message, "Forwarding backend error")
            }
            _ => {}
        }

        let status = self.status();
        let body = Json(serde_json::json!({ "error": self.public_message() }));
        (status, body).into_response()
    }
}
