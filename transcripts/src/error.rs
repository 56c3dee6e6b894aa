//! Error types for the transcript core.
//!
//! Recognition misses (no meeting link, no matching transcript) are not errors:
//! they surface as `None` or an empty `Vec`. Everything in here is a genuine
//! failure the caller can tell apart from "nothing found".

use thiserror::Error;

/// Whether a failed remote call is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    /// Network trouble, rate limiting, 5xx responses.
    Transient,
    /// Authentication, permission or malformed request errors.
    Permanent,
}

impl RemoteErrorKind {
    fn label(&self) -> &'static str {
        match self {
            RemoteErrorKind::Transient => "transient",
            RemoteErrorKind::Permanent => "permanent",
        }
    }
}

/// Failure reported by the calendar or drive backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} failed ({}): {}", .operation, .kind.label(), .message)]
pub struct RemoteError {
    pub kind: RemoteErrorKind,
    pub operation: String,
    pub message: String,
}

impl RemoteError {
    pub fn transient(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Transient,
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn permanent(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: RemoteErrorKind::Permanent,
            operation: operation.into(),
            message: message.into(),
        }
    }

    pub fn is_transient(&self) -> bool {
        self.kind == RemoteErrorKind::Transient
    }
}

/// Unified error type for the transcript core.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// The requested calendar event or drive file does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// The calendar or drive backend failed
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// A calendar event carried a timestamp that could not be parsed
    #[error("event {event_id}: malformed timestamp '{value}'")]
    MalformedTimestamp { event_id: String, value: String },

    /// Local file system failure while writing downloads or temp files
    #[error("local I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Missing or invalid configuration
    #[error("configuration error: {0}")]
    Config(String),
}

impl TranscriptError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        TranscriptError::NotFound(resource.into())
    }
}

/// Result type alias for the transcript core
pub type Result<T> = std::result::Result<T, TranscriptError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_error_display() {
        let err = RemoteError::transient("search drive files", "503 backend error");
        assert_eq!(err.to_string(), "search drive files failed (transient): 503 backend error");

        let err = TranscriptError::from(RemoteError::permanent("get file metadata", "403"));
        assert_eq!(err.to_string(), "get file metadata failed (permanent): 403");
    }
}
