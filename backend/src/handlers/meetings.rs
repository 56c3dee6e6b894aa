use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use super::degrade;
use crate::error::{AppError, ApiResult};
use crate::responses::{meeting_response, query_params, transcript_response};
use crate::state::AppState;
use shared::api::{
    ListMeetingsQuery, ListMeetingsResponse, MeetingResponse, MeetingTranscriptsResponse,
    ParseLinkRequest, ParseLinkResponse,
};

pub async fn list_meetings(
    State(state): State<AppState>,
    Query(query): Query<ListMeetingsQuery>,
) -> ApiResult<Json<ListMeetingsResponse>> {
    query.validate()?;

    let result = match query.q.as_deref() {
        Some(title) => state.service.search_meetings(title, query.months_back).await,
        None => state.service.list_meetings(query.months_back).await,
    };
    let (meetings, warning) = degrade(result)?;
    let meetings: Vec<MeetingResponse> = meetings.iter().map(meeting_response).collect();

    Ok(Json(ListMeetingsResponse {
        total: meetings.len(),
        meetings,
        warning,
    }))
}

pub async fn get_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MeetingResponse>> {
    let meeting = state
        .service
        .get_meeting(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("meeting {}", id)))?;
    Ok(Json(meeting_response(&meeting)))
}

pub async fn meeting_transcripts(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MeetingTranscriptsResponse>> {
    let meeting = state
        .service
        .get_meeting(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("meeting {}", id)))?;

    let (transcripts, warning) = degrade(state.service.transcripts_for_meeting(&meeting).await)?;

    Ok(Json(MeetingTranscriptsResponse {
        meeting: meeting_response(&meeting),
        transcripts: transcripts.iter().map(transcript_response).collect(),
        warning,
    }))
}

pub async fn parse_link(
    State(state): State<AppState>,
    Json(payload): Json<ParseLinkRequest>,
) -> ApiResult<Json<ParseLinkResponse>> {
    payload.validate()?;

    let response = match state.service.meeting_from_link(&payload.url) {
        Some(meeting) => ParseLinkResponse {
            valid: true,
            meeting_code: Some(meeting.meeting_code().to_string()),
            canonical_url: Some(meeting.meet_url()),
            query_params: query_params(meeting.link()),
            meeting: Some(meeting_response(&meeting)),
        },
        None => ParseLinkResponse {
            valid: false,
            meeting_code: None,
            canonical_url: None,
            query_params: Vec::new(),
            meeting: None,
        },
    };
    Ok(Json(response))
}
