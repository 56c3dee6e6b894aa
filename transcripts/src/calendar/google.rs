//! Google Calendar API adapter.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use google_calendar3::api::{Event, EventDateTime};
use google_calendar3::hyper_rustls::HttpsConnector;
use google_calendar3::CalendarHub;
use hyper_util::client::legacy::connect::HttpConnector;

use super::{
    CalendarApi, EventWindow, RawAttendee, RawConferenceData, RawEntryPoint, RawEvent,
    RawEventTime, RawOrganizer,
};
use crate::error::RemoteError;

/// Read-only scope requested for calendar access.
pub const CALENDAR_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";

pub type Hub = CalendarHub<HttpsConnector<HttpConnector>>;

/// [`CalendarApi`] backed by the Google Calendar v3 API.
pub struct GoogleCalendar {
    hub: Hub,
    calendar_id: String,
    page_size: i32,
}

impl GoogleCalendar {
    pub fn new(hub: Hub, calendar_id: impl Into<String>, page_size: i32) -> Self {
        Self {
            hub,
            calendar_id: calendar_id.into(),
            page_size,
        }
    }

    async fn list_page(
        &self,
        window: &EventWindow,
        page_token: Option<&str>,
    ) -> Result<(Vec<Event>, Option<String>), RemoteError> {
        let mut call = self
            .hub
            .events()
            .list(&self.calendar_id)
            .time_min(window.time_min)
            .time_max(window.time_max)
            .single_events(true)
            .order_by("startTime")
            .max_results(self.page_size)
            .add_scope(CALENDAR_SCOPE);

        if let Some(q) = window.query.as_deref() {
            call = call.q(q);
        }
        if let Some(token) = page_token {
            call = call.page_token(token);
        }

        let (_, events) = call
            .doit()
            .await
            .map_err(|e| classify("list calendar events", e))?;

        Ok((events.items.unwrap_or_default(), events.next_page_token))
    }
}

#[async_trait]
impl CalendarApi for GoogleCalendar {
    async fn list_events(&self, window: &EventWindow) -> Result<Vec<RawEvent>, RemoteError> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let (items, next) = self.list_page(window, page_token.as_deref()).await?;
            events.extend(items.into_iter().map(RawEvent::from));

            match next {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        tracing::debug!(
            "Fetched {} events between {} and {}",
            events.len(),
            window.time_min,
            window.time_max
        );
        Ok(events)
    }

    async fn get_event(&self, event_id: &str) -> Result<Option<RawEvent>, RemoteError> {
        let result = match self
            .hub
            .events()
            .get(&self.calendar_id, event_id)
            .add_scope(CALENDAR_SCOPE)
            .doit()
            .await
        {
            Ok((_, event)) => Some(event),
            Err(e) if status_of(&e) == Some(404) => None,
            Err(e) => return Err(classify("get calendar event", e)),
        };

        Ok(result.map(RawEvent::from))
    }
}

impl From<Event> for RawEvent {
    fn from(event: Event) -> Self {
        RawEvent {
            id: event.id,
            summary: event.summary,
            description: event.description,
            location: event.location,
            start: event.start.map(RawEventTime::from),
            end: event.end.map(RawEventTime::from),
            attendees: event.attendees.map(|attendees| {
                attendees
                    .into_iter()
                    .map(|a| RawAttendee {
                        email: a.email,
                        display_name: a.display_name,
                    })
                    .collect()
            }),
            organizer: event.organizer.map(|o| RawOrganizer { email: o.email }),
            created: event.created.map(|t| rfc3339(&t)),
            updated: event.updated.map(|t| rfc3339(&t)),
            conference_data: event.conference_data.map(|data| RawConferenceData {
                entry_points: data.entry_points.map(|points| {
                    points
                        .into_iter()
                        .map(|p| RawEntryPoint {
                            entry_point_type: p.entry_point_type,
                            uri: p.uri,
                        })
                        .collect()
                }),
            }),
        }
    }
}

impl From<EventDateTime> for RawEventTime {
    fn from(time: EventDateTime) -> Self {
        RawEventTime {
            date_time: time.date_time.map(|t| rfc3339(&t)),
            date: time.date.map(|d| d.format("%Y-%m-%d").to_string()),
            time_zone: time.time_zone,
        }
    }
}

fn rfc3339(t: &DateTime<Utc>) -> String {
    t.to_rfc3339()
}

fn status_of(error: &google_calendar3::Error) -> Option<u16> {
    match error {
        google_calendar3::Error::BadRequest(value) => value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok()),
        google_calendar3::Error::Failure(response) => Some(response.status().as_u16()),
        _ => None,
    }
}

/// Map a client error onto the transient/permanent split used for retries.
fn classify(operation: &str, error: google_calendar3::Error) -> RemoteError {
    let transient = match &error {
        google_calendar3::Error::HttpError(_) | google_calendar3::Error::Io(_) => true,
        _ => matches!(status_of(&error), Some(408 | 429 | 500..=599)),
    };

    if transient {
        RemoteError::transient(operation, error.to_string())
    } else {
        RemoteError::permanent(operation, error.to_string())
    }
}
