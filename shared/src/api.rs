use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::models::{MeetingTime, QueryParam, TranscriptDate};

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

// ============================================================================
// Meeting API Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct ListMeetingsQuery {
    #[validate(range(min = 1, max = 36))]
    pub months_back: Option<u32>,

    /// Restrict to meetings whose title matches
    #[validate(length(min = 1, max = 200))]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeetingResponse {
    /// Calendar event id; absent for meetings built from a pasted link
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub meeting_code: String,
    pub meet_url: String,
    pub start: Option<MeetingTime>,
    pub end: Option<MeetingTime>,
    pub attendees: Vec<String>,
    pub organizer: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListMeetingsResponse {
    pub meetings: Vec<MeetingResponse>,
    pub total: usize,
    /// Set when the calendar could not be read and the list is empty for that reason
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ParseLinkRequest {
    #[validate(length(min = 1, max = 2048))]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ParseLinkResponse {
    pub valid: bool,
    pub meeting_code: Option<String>,
    pub canonical_url: Option<String>,
    pub query_params: Vec<QueryParam>,
    pub meeting: Option<MeetingResponse>,
}

// ============================================================================
// Transcript API Types
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct LocateQuery {
    #[validate(length(min = 1, max = 100))]
    pub code: Option<String>,

    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,

    /// `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM[:SS]`
    pub date: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_date_range"))]
pub struct DateRangeQuery {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

fn validate_date_range(query: &DateRangeQuery) -> Result<(), ValidationError> {
    if query.start > query.end {
        return Err(ValidationError::new("start_after_end"));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptResponse {
    pub file_id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub created_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
    pub web_view_link: Option<String>,
    pub meeting_title: Option<String>,
    pub meeting_date: Option<TranscriptDate>,
    /// Guessed from the file name; may be wrong or missing
    pub meeting_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListTranscriptsResponse {
    pub transcripts: Vec<TranscriptResponse>,
    pub total: usize,
    /// Set when the drive search failed and the list is empty for that reason
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MeetingTranscriptsResponse {
    pub meeting: MeetingResponse,
    pub transcripts: Vec<TranscriptResponse>,
    pub warning: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranscriptContentResponse {
    pub file_id: String,
    pub text: String,
    /// Encoding that decoded the bytes; absent when a document reader produced the text
    pub encoding: Option<String>,
    /// The structure-aware reader was unavailable; text came from naive byte decoding
    pub degraded: bool,
}

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(
        error: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }
}
