//! Calendar access and meeting extraction.

pub mod extractor;
pub mod google;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

/// A calendar event as the backend returned it.
///
/// Timestamps stay as strings so a single malformed entry can be skipped
/// without failing the listing it came in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEvent {
    pub id: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<RawEventTime>,
    pub end: Option<RawEventTime>,
    pub attendees: Option<Vec<RawAttendee>>,
    pub organizer: Option<RawOrganizer>,
    pub created: Option<String>,
    pub updated: Option<String>,
    pub conference_data: Option<RawConferenceData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEventTime {
    /// RFC 3339 timestamp for timed events
    pub date_time: Option<String>,
    /// `YYYY-MM-DD` for all-day events
    pub date: Option<String>,
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawAttendee {
    pub email: Option<String>,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawOrganizer {
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawConferenceData {
    pub entry_points: Option<Vec<RawEntryPoint>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawEntryPoint {
    pub entry_point_type: Option<String>,
    pub uri: Option<String>,
}

/// Time range and filter for an event listing.
///
/// Recurring events are expanded into instances, ordered by start time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventWindow {
    pub time_min: DateTime<Utc>,
    pub time_max: DateTime<Utc>,
    /// Free-text filter applied by the backend
    pub query: Option<String>,
}

/// Read-only calendar capability.
#[async_trait]
pub trait CalendarApi: Send + Sync {
    /// List every event in the window, following pagination.
    async fn list_events(&self, window: &EventWindow) -> Result<Vec<RawEvent>, RemoteError>;

    /// Fetch a single event. `Ok(None)` when it does not exist.
    async fn get_event(&self, event_id: &str) -> Result<Option<RawEvent>, RemoteError>;
}
