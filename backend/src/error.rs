use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::api::ErrorResponse;
use std::fmt;
use transcripts::{RemoteErrorKind, TranscriptError};

#[derive(Debug)]
pub enum AppError {
    Transcripts(TranscriptError),
    NotFound(String),
    Validation(String),
    /// The file exists but no text could be recovered from it
    Unreadable(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transcripts(e) => write!(f, "{}", e),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::Validation(msg) => write!(f, "Validation error: {}", msg),
            Self::Unreadable(msg) => write!(f, "Unreadable: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

fn transcript_error_response(err: TranscriptError) -> (StatusCode, ErrorResponse) {
    match err {
        TranscriptError::NotFound(what) => (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("not_found", format!("{} not found", what)),
        ),
        TranscriptError::Remote(e) => match e.kind {
            RemoteErrorKind::Transient => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorResponse::with_details("remote_unavailable", e.operation.clone(), e.message),
            ),
            RemoteErrorKind::Permanent => (
                StatusCode::BAD_GATEWAY,
                ErrorResponse::with_details("remote_error", e.operation.clone(), e.message),
            ),
        },
        e @ TranscriptError::MalformedTimestamp { .. } => (
            StatusCode::BAD_GATEWAY,
            ErrorResponse::new("malformed_event", e.to_string()),
        ),
        e @ (TranscriptError::Io(_) | TranscriptError::Config(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("internal_error", e.to_string()),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            Self::Transcripts(e) => transcript_error_response(e),
            Self::NotFound(msg) => (
                StatusCode::NOT_FOUND,
                ErrorResponse::new("not_found", msg),
            ),
            Self::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                ErrorResponse::new("validation_error", msg),
            ),
            Self::Unreadable(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorResponse::new("unreadable_content", msg),
            ),
        };

        if status.is_server_error() {
            tracing::error!("{}: {}", error_response.error, error_response.message);
        }

        (status, Json(error_response)).into_response()
    }
}

impl From<TranscriptError> for AppError {
    fn from(err: TranscriptError) -> Self {
        Self::Transcripts(err)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, AppError>;
