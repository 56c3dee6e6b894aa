//! Turns raw calendar events into meeting descriptors.
//!
//! An event becomes a meeting only when a conferencing link can be recognized
//! in its conference data, description or location. Events without one are
//! excluded silently.

use chrono::{DateTime, NaiveDate, Utc};

use super::{RawEvent, RawEventTime};
use crate::error::{Result, TranscriptError};
use crate::link::{self, MeetingLink};
use crate::models::{EventTime, MeetingDescriptor};

/// Entry point type marking the video link in conference data.
const VIDEO_ENTRY_POINT: &str = "video";

/// Build a descriptor from a raw event.
///
/// Returns `Ok(None)` when the event has no conferencing link and an error when
/// one of its timestamps cannot be parsed.
pub fn extract(event: &RawEvent) -> Result<Option<MeetingDescriptor>> {
    let Some(link) = find_link(event) else {
        return Ok(None);
    };

    let event_id = event.id.clone().unwrap_or_default();
    let start = event
        .start
        .as_ref()
        .map(|t| parse_event_time(&event_id, t))
        .transpose()?
        .flatten();
    let end = event
        .end
        .as_ref()
        .map(|t| parse_event_time(&event_id, t))
        .transpose()?
        .flatten();
    let created = parse_optional_timestamp(&event_id, event.created.as_deref())?;
    let updated = parse_optional_timestamp(&event_id, event.updated.as_deref())?;

    let mut meeting = MeetingDescriptor::new(link, event.summary.clone());
    meeting.id = event.id.clone();
    meeting.description = event.description.clone().unwrap_or_default();
    meeting.start = start;
    meeting.end = end;
    meeting.attendees = attendee_emails(event);
    meeting.organizer = event
        .organizer
        .as_ref()
        .and_then(|o| o.email.clone())
        .filter(|email| !email.is_empty());
    meeting.created = created;
    meeting.updated = updated;

    Ok(Some(meeting))
}

/// Conference data first, then links written into the description or location.
fn find_link(event: &RawEvent) -> Option<MeetingLink> {
    let from_conference = event
        .conference_data
        .as_ref()
        .and_then(|data| data.entry_points.as_ref())
        .and_then(|points| {
            points
                .iter()
                .find(|p| p.entry_point_type.as_deref() == Some(VIDEO_ENTRY_POINT))
        })
        .and_then(|p| p.uri.as_deref())
        .and_then(link::parse);

    from_conference.or_else(|| {
        [event.description.as_deref(), event.location.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|text| link::find_all(text).into_iter().next())
            .and_then(|url| link::parse(&url))
    })
}

fn parse_event_time(event_id: &str, time: &RawEventTime) -> Result<Option<EventTime>> {
    if let Some(value) = time.date_time.as_deref() {
        return DateTime::parse_from_rfc3339(value)
            .map(|dt| Some(EventTime::At(dt)))
            .map_err(|_| malformed(event_id, value));
    }
    if let Some(value) = time.date.as_deref() {
        return NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .map(|date| Some(EventTime::AllDay(date)))
            .map_err(|_| malformed(event_id, value));
    }
    Ok(None)
}

fn parse_optional_timestamp(event_id: &str, value: Option<&str>) -> Result<Option<DateTime<Utc>>> {
    value
        .map(|v| {
            DateTime::parse_from_rfc3339(v)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| malformed(event_id, v))
        })
        .transpose()
}

fn attendee_emails(event: &RawEvent) -> Vec<String> {
    event
        .attendees
        .iter()
        .flatten()
        .filter_map(|a| a.email.clone())
        .filter(|email| !email.is_empty())
        .collect()
}

fn malformed(event_id: &str, value: &str) -> TranscriptError {
    TranscriptError::MalformedTimestamp {
        event_id: event_id.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::UNTITLED_MEETING;
    use serde_json::json;

    fn event(value: serde_json::Value) -> RawEvent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_conference_data_video_entry_point() {
        let raw = event(json!({
            "id": "evt1",
            "summary": "Weekly Sync",
            "start": { "dateTime": "2024-01-05T15:00:00-08:00" },
            "end": { "dateTime": "2024-01-05T15:30:00-08:00" },
            "conferenceData": { "entryPoints": [
                { "entryPointType": "phone", "uri": "tel:+1-555-0100" },
                { "entryPointType": "video", "uri": "https://meet.google.com/abc-defg-hij" }
            ]},
            "attendees": [
                { "email": "ana@example.com" },
                { "displayName": "Room 4" },
                { "email": "bo@example.com" }
            ],
            "organizer": { "email": "ana@example.com" },
            "created": "2023-12-01T10:00:00.000Z",
            "updated": "2023-12-02T10:00:00.000Z"
        }));

        let meeting = extract(&raw).unwrap().unwrap();
        assert_eq!(meeting.id.as_deref(), Some("evt1"));
        assert_eq!(meeting.title, "Weekly Sync");
        assert_eq!(meeting.meeting_code(), "abc-defg-hij");
        assert_eq!(meeting.attendees, vec!["ana@example.com", "bo@example.com"]);
        assert_eq!(meeting.organizer.as_deref(), Some("ana@example.com"));
        assert!(meeting.start.unwrap().time_of_day().is_some());
        assert!(meeting.created.is_some());
    }

    #[test]
    fn test_link_in_description() {
        let raw = event(json!({
            "id": "evt2",
            "description": "Dial in: https://meet.google.com/xyz-wxyz-987\nSee you there",
            "start": { "date": "2024-02-01" },
            "end": { "date": "2024-02-02" }
        }));

        let meeting = extract(&raw).unwrap().unwrap();
        assert_eq!(meeting.meeting_code(), "xyz-wxyz-987");
        assert_eq!(meeting.title, UNTITLED_MEETING);
        let start = meeting.start.unwrap();
        assert_eq!(start, EventTime::AllDay(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()));
        assert_eq!(start.time_of_day(), None);
    }

    #[test]
    fn test_link_in_location() {
        let raw = event(json!({
            "summary": "Ad hoc",
            "location": "https://meet.google.com/loc-abcd-xyz"
        }));
        let meeting = extract(&raw).unwrap().unwrap();
        assert_eq!(meeting.meeting_code(), "loc-abcd-xyz");
        assert_eq!(meeting.start, None);
    }

    #[test]
    fn test_non_meet_video_entry_falls_back_to_text() {
        let raw = event(json!({
            "conferenceData": { "entryPoints": [
                { "entryPointType": "video", "uri": "https://zoom.us/j/1234" }
            ]},
            "description": "Backup: https://meet.google.com/bak-abcd-xyz"
        }));
        let meeting = extract(&raw).unwrap().unwrap();
        assert_eq!(meeting.meeting_code(), "bak-abcd-xyz");
    }

    #[test]
    fn test_event_without_link_is_absent() {
        let raw = event(json!({
            "id": "lunch",
            "summary": "Lunch",
            "description": "At the usual place",
            "location": "Cafeteria",
            "start": { "dateTime": "2024-01-05T12:00:00Z" }
        }));
        assert_eq!(extract(&raw).unwrap(), None);
        assert_eq!(extract(&RawEvent::default()).unwrap(), None);
    }

    #[test]
    fn test_batch_yields_one_descriptor_per_linked_event() {
        let events: Vec<RawEvent> = (0..10)
            .map(|i| {
                if i % 3 == 0 {
                    event(json!({
                        "id": format!("evt{}", i),
                        "location": format!("https://meet.google.com/aaa-bbbb-{:03}", i)
                    }))
                } else {
                    event(json!({ "id": format!("evt{}", i), "summary": "No video" }))
                }
            })
            .collect();

        let meetings: Vec<_> = events
            .iter()
            .filter_map(|e| extract(e).unwrap())
            .collect();
        assert_eq!(meetings.len(), 4);
        assert!(meetings.iter().all(|m| !m.meeting_code().is_empty()));
    }

    #[test]
    fn test_malformed_timestamp_is_an_error() {
        let raw = event(json!({
            "id": "broken",
            "location": "https://meet.google.com/abc-defg-hij",
            "start": { "dateTime": "yesterday at noon" }
        }));
        match extract(&raw) {
            Err(TranscriptError::MalformedTimestamp { event_id, value }) => {
                assert_eq!(event_id, "broken");
                assert_eq!(value, "yesterday at noon");
            }
            other => panic!("expected malformed timestamp, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_timestamp_without_link_is_still_absent() {
        let raw = event(json!({ "start": { "date": "not-a-date" } }));
        assert_eq!(extract(&raw).unwrap(), None);
    }
}
