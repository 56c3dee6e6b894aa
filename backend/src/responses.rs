//! Conversions from core types to wire types.

use shared::api::{MeetingResponse, TranscriptResponse};
use shared::models::{MeetingTime, QueryParam, TranscriptDate};
use transcripts::{EventTime, InferredDate, MeetingDescriptor, MeetingLink, ParsedDate, TranscriptDescriptor};

pub fn meeting_time(time: &EventTime) -> MeetingTime {
    MeetingTime {
        date: time.date(),
        time: time.time_of_day(),
        all_day: time.time_of_day().is_none(),
        utc: time.instant(),
    }
}

pub fn meeting_response(meeting: &MeetingDescriptor) -> MeetingResponse {
    MeetingResponse {
        id: meeting.id.clone(),
        title: meeting.title.clone(),
        description: meeting.description.clone(),
        meeting_code: meeting.meeting_code().to_string(),
        meet_url: meeting.meet_url(),
        start: meeting.start.as_ref().map(meeting_time),
        end: meeting.end.as_ref().map(meeting_time),
        attendees: meeting.attendees.clone(),
        organizer: meeting.organizer.clone(),
        created: meeting.created,
        updated: meeting.updated,
    }
}

pub fn transcript_date(date: &InferredDate) -> TranscriptDate {
    TranscriptDate {
        raw: date.raw.clone(),
        parsed: date.as_naive(),
        date_only: matches!(date.parsed, ParsedDate::Date(_)),
    }
}

pub fn transcript_response(transcript: &TranscriptDescriptor) -> TranscriptResponse {
    TranscriptResponse {
        file_id: transcript.file_id.clone(),
        name: transcript.name.clone(),
        mime_type: transcript.mime_type.clone(),
        size: transcript.size,
        created_time: transcript.created_time,
        modified_time: transcript.modified_time,
        web_view_link: transcript.web_view_link.clone(),
        meeting_title: transcript.meeting_title.clone(),
        meeting_date: transcript.meeting_date.as_ref().map(transcript_date),
        meeting_code: transcript.meeting_code.clone(),
    }
}

pub fn query_params(link: &MeetingLink) -> Vec<QueryParam> {
    link.query_params
        .iter()
        .map(|(name, value)| QueryParam {
            name: name.clone(),
            value: value.clone(),
        })
        .collect()
}
