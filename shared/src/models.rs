use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Start or end of a meeting as shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetingTime {
    pub date: NaiveDate,
    /// Absent for all-day events
    pub time: Option<NaiveTime>,
    pub all_day: bool,
    /// Instant used for ordering; midnight UTC for all-day events
    pub utc: DateTime<Utc>,
}

/// Date segment read from a transcript file name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptDate {
    /// Text exactly as it appeared in the name
    pub raw: String,
    /// Best-effort parse; absent when the text was not recognized
    pub parsed: Option<NaiveDateTime>,
    /// The parsed value carried no time of day
    pub date_only: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParam {
    pub name: String,
    pub value: String,
}
