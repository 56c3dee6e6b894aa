use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{NaiveDate, NaiveDateTime};
use validator::Validate;

use super::degrade;
use crate::error::{AppError, ApiResult};
use crate::responses::transcript_response;
use crate::state::AppState;
use ::transcripts::{LocateRequest, TranscriptError, TranscriptDescriptor};
use shared::api::{
    DateRangeQuery, ListTranscriptsResponse, LocateQuery, TranscriptContentResponse,
};

const DATETIME_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"];

fn parse_date_param(value: &str) -> ApiResult<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| AppError::Validation(format!("unrecognized date '{}'", value)))
}

fn list_response(
    result: Result<Vec<TranscriptDescriptor>, TranscriptError>,
) -> ApiResult<Json<ListTranscriptsResponse>> {
    let (transcripts, warning) = degrade(result)?;
    Ok(Json(ListTranscriptsResponse {
        total: transcripts.len(),
        transcripts: transcripts.iter().map(transcript_response).collect(),
        warning,
    }))
}

pub async fn locate_transcripts(
    State(state): State<AppState>,
    Query(query): Query<LocateQuery>,
) -> ApiResult<Json<ListTranscriptsResponse>> {
    query.validate()?;

    let request = LocateRequest {
        code: query.code,
        title: query.title,
        date: query.date.as_deref().map(parse_date_param).transpose()?,
    };
    list_response(state.service.locate_transcripts(&request).await)
}

pub async fn transcripts_in_range(
    State(state): State<AppState>,
    Query(query): Query<DateRangeQuery>,
) -> ApiResult<Json<ListTranscriptsResponse>> {
    query.validate()?;
    list_response(state.service.transcripts_between(query.start, query.end).await)
}

pub async fn folder_transcripts(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ListTranscriptsResponse>> {
    list_response(state.service.folder_transcripts(&name).await)
}

pub async fn transcript_content(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> ApiResult<Json<TranscriptContentResponse>> {
    let text = state
        .service
        .get_text(&file_id)
        .await?
        .ok_or_else(|| AppError::Unreadable(format!("no text could be read from {}", file_id)))?;

    Ok(Json(TranscriptContentResponse {
        file_id,
        text: text.text,
        encoding: text.encoding.map(|e| e.to_string()),
        degraded: text.degraded,
    }))
}

pub async fn download_transcript(
    State(state): State<AppState>,
    Path(file_id): Path<String>,
) -> ApiResult<Response> {
    let path = state.service.download(&file_id, None).await?;
    let bytes = tokio::fs::read(&path).await.map_err(TranscriptError::from)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().replace('"', ""))
        .unwrap_or_else(|| file_id.clone());

    Ok((
        [
            (header::CONTENT_TYPE, "application/octet-stream".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_param() {
        assert_eq!(
            parse_date_param("2024-01-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(0, 0, 0).unwrap()
        );
        assert_eq!(
            parse_date_param("2024-01-05T15:30").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(15, 30, 0).unwrap()
        );
        assert!(matches!(parse_date_param("next tuesday"), Err(AppError::Validation(_))));
    }
}
