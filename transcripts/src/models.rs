use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

use crate::link::{self, MeetingLink};

/// Title used when a calendar event has no summary.
pub const UNTITLED_MEETING: &str = "No Title";

/// Start or end of a calendar event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum EventTime {
    /// A timed event, with the offset the calendar reported
    At(DateTime<FixedOffset>),
    /// An all-day event carries only a date
    AllDay(NaiveDate),
}

impl EventTime {
    /// Point in time used for ordering. All-day events count from midnight UTC.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            EventTime::At(dt) => dt.with_timezone(&Utc),
            EventTime::AllDay(date) => date.and_time(NaiveTime::MIN).and_utc(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::At(dt) => dt.date_naive(),
            EventTime::AllDay(date) => *date,
        }
    }

    /// `None` for all-day events.
    pub fn time_of_day(&self) -> Option<NaiveTime> {
        match self {
            EventTime::At(dt) => Some(dt.time()),
            EventTime::AllDay(_) => None,
        }
    }

    /// Wall-clock date and time as the calendar showed it; midnight for all-day events.
    pub fn local(&self) -> NaiveDateTime {
        match self {
            EventTime::At(dt) => dt.naive_local(),
            EventTime::AllDay(date) => date.and_time(NaiveTime::MIN),
        }
    }
}

/// A calendar entry that references a conferencing link.
///
/// Only constructible from a recognized [`MeetingLink`], so the meeting code is
/// always present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeetingDescriptor {
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub start: Option<EventTime>,
    pub end: Option<EventTime>,
    link: MeetingLink,
    pub attendees: Vec<String>,
    pub organizer: Option<String>,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    /// `title` was generated for display and does not name any transcript
    #[serde(skip)]
    generated_title: bool,
}

impl MeetingDescriptor {
    pub fn new(link: MeetingLink, title: Option<String>) -> Self {
        let title = title.filter(|t| !t.trim().is_empty());
        Self {
            id: None,
            generated_title: title.is_none(),
            title: title.unwrap_or_else(|| UNTITLED_MEETING.to_string()),
            description: String::new(),
            start: None,
            end: None,
            link,
            attendees: Vec::new(),
            organizer: None,
            created: None,
            updated: None,
        }
    }

    /// Descriptor for a link pasted by the user, with no calendar entry behind it.
    pub fn from_link(url: &str) -> Option<Self> {
        let link = link::parse(url)?;
        let mut meeting = Self::new(link, None);
        meeting.title = format!("Meeting {}", meeting.link.code);
        Some(meeting)
    }

    /// Title to match transcript names against. `None` when the title is a
    /// placeholder.
    pub fn search_title(&self) -> Option<&str> {
        (!self.generated_title).then_some(self.title.as_str())
    }

    pub fn link(&self) -> &MeetingLink {
        &self.link
    }

    pub fn meeting_code(&self) -> &str {
        &self.link.code
    }

    /// Canonical conferencing URL.
    pub fn meet_url(&self) -> String {
        self.link.url()
    }
}

/// Most recent first. Meetings without a start time sort last; remaining ties
/// are broken by calendar id (missing ids last), then title.
pub fn compare_by_start_desc(a: &MeetingDescriptor, b: &MeetingDescriptor) -> Ordering {
    let by_start = match (&a.start, &b.start) {
        (Some(x), Some(y)) => y.instant().cmp(&x.instant()),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    let by_id = match (&a.id, &b.id) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    by_start
        .then(by_id)
        .then_with(|| a.title.cmp(&b.title))
}

/// Best-effort reading of the date segment of a transcript file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ParsedDate {
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Unparsed,
}

/// Date segment of a transcript file name, kept verbatim for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InferredDate {
    pub raw: String,
    pub parsed: ParsedDate,
}

impl InferredDate {
    pub fn as_naive(&self) -> Option<NaiveDateTime> {
        match &self.parsed {
            ParsedDate::DateTime(dt) => Some(*dt),
            ParsedDate::Date(date) => Some(date.and_time(NaiveTime::MIN)),
            ParsedDate::Unparsed => None,
        }
    }
}

/// A drive file that looks like a meeting transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptDescriptor {
    pub file_id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub created_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
    pub web_view_link: Option<String>,
    pub meeting_title: Option<String>,
    pub meeting_date: Option<InferredDate>,
    /// Heuristic guess from the file name. Advisory only, never a join key.
    pub meeting_code: Option<String>,
}

/// The folder transcripts are searched in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderHandle {
    pub id: String,
    pub name: String,
}
