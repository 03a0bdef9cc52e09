use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{
    config::ErrorStatusMode, models::ErrorEnvelope, policy::AccessDenied,
    repository::RepositoryError,
};

/// Value of the `status` field in every error envelope.
pub const ERROR_STATUS: &str = "Error, stopped";

/// ModerationError
///
/// Everything that can stop a moderation request. The first four are application
/// errors reported through the envelope; `Repository` is a persistence fault.
#[derive(Debug, thiserror::Error)]
pub enum ModerationError {
    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("Comment not found")]
    CommentNotFound,

    #[error(transparent)]
    Forbidden(#[from] AccessDenied),

    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl ModerationError {
    /// The `operation` field of the envelope: which step stopped the request.
    pub fn operation(&self) -> &'static str {
        match self {
            ModerationError::InvalidToken => "Check token",
            ModerationError::UserNotFound | ModerationError::Forbidden(_) => "check user",
            ModerationError::CommentNotFound => "Fetch comment data",
            ModerationError::Repository(_) => "Load moderation snapshot",
        }
    }

    /// The `message` field of the envelope. Persistence details stay in the logs.
    pub fn message(&self) -> String {
        match self {
            ModerationError::Repository(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn status_code(&self, mode: ErrorStatusMode) -> StatusCode {
        match (self, mode) {
            (ModerationError::Repository(_), _) => StatusCode::INTERNAL_SERVER_ERROR,
            (_, ErrorStatusMode::Legacy) => StatusCode::OK,
            (ModerationError::InvalidToken | ModerationError::UserNotFound, ErrorStatusMode::Http) => {
                StatusCode::UNAUTHORIZED
            }
            (ModerationError::CommentNotFound, ErrorStatusMode::Http) => StatusCode::NOT_FOUND,
            (ModerationError::Forbidden(_), ErrorStatusMode::Http) => StatusCode::FORBIDDEN,
        }
    }

    pub fn envelope(&self) -> ErrorEnvelope {
        ErrorEnvelope {
            operation: self.operation().to_string(),
            status: ERROR_STATUS.to_string(),
            message: self.message(),
        }
    }
}

/// ApiError
///
/// A `ModerationError` paired with the status mode it must be rendered in.
#[derive(Debug)]
pub struct ApiError {
    pub error: ModerationError,
    pub mode: ErrorStatusMode,
}

impl ApiError {
    pub fn new(error: ModerationError, mode: ErrorStatusMode) -> Self {
        Self { error, mode }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self.error {
            ModerationError::Repository(err) => {
                tracing::error!(?err, "moderation snapshot aborted by persistence fault");
            }
            err => {
                tracing::info!(operation = err.operation(), "returning error to client: {err}");
            }
        }
        (self.error.status_code(self.mode), Json(self.error.envelope())).into_response()
    }
}
