//! Entry point for presentation layers.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::calendar::{extractor, EventWindow, RawEvent};
use crate::config::TranscriptsConfig;
use crate::content::{ContentPipeline, DocumentReader, PandocReader, TranscriptText};
use crate::error::Result;
use crate::link::MEET_HOST;
use crate::locator::{LocateRequest, TranscriptLocator};
use crate::models::{compare_by_start_desc, MeetingDescriptor, TranscriptDescriptor};
use crate::retry::RetryPolicy;
use crate::session::Session;

/// Days counted per month when sizing the listing window.
const DAYS_PER_MONTH: i64 = 30;

pub struct TranscriptService {
    session: Session,
    config: TranscriptsConfig,
    locator: TranscriptLocator,
    pipeline: ContentPipeline,
}

impl TranscriptService {
    /// Service reading word documents with pandoc.
    pub fn new(session: Session, config: TranscriptsConfig) -> Self {
        let reader = PandocReader::new(
            config.content.pandoc_path.clone(),
            config.content.reader_timeout(),
        );
        Self::with_reader(session, config, Arc::new(reader))
    }

    pub fn with_reader(session: Session, config: TranscriptsConfig, reader: Arc<dyn DocumentReader>) -> Self {
        let session = session.with_retry(RetryPolicy::from(&config.retry));
        let locator = TranscriptLocator::new(session.drive.clone(), config.locator.clone());
        let pipeline = ContentPipeline::new(session.drive.clone(), reader, config.content.clone());
        Self {
            session,
            config,
            locator,
            pipeline,
        }
    }

    pub fn config(&self) -> &TranscriptsConfig {
        &self.config
    }

    fn window(&self, months_back: Option<u32>, query: Option<String>) -> EventWindow {
        let months_back = months_back.unwrap_or(self.config.calendar.months_back);
        let now = Utc::now();
        EventWindow {
            time_min: now - Duration::days(i64::from(months_back) * DAYS_PER_MONTH),
            time_max: now + Duration::days(i64::from(self.config.calendar.days_ahead)),
            query,
        }
    }

    /// Meetings in the listing window, most recent first.
    ///
    /// Events without a conferencing link are left out. Events with malformed
    /// timestamps are logged and skipped.
    pub async fn list_meetings(&self, months_back: Option<u32>) -> Result<Vec<MeetingDescriptor>> {
        let window = self.window(months_back, None);
        let events = self.session.calendar.list_events(&window).await?;
        Ok(meetings_from_events(&events))
    }

    /// Meetings whose events match `title`, in the same window as [`Self::list_meetings`].
    pub async fn search_meetings(&self, title: &str, months_back: Option<u32>) -> Result<Vec<MeetingDescriptor>> {
        let query = format!("{} {}", title.trim(), MEET_HOST);
        let window = self.window(months_back, Some(query));
        let events = self.session.calendar.list_events(&window).await?;
        Ok(meetings_from_events(&events))
    }

    /// `Ok(None)` when the event does not exist or has no conferencing link.
    pub async fn get_meeting(&self, event_id: &str) -> Result<Option<MeetingDescriptor>> {
        match self.session.calendar.get_event(event_id).await? {
            Some(event) => extractor::extract(&event),
            None => Ok(None),
        }
    }

    /// Descriptor for a link pasted by the user. No calendar lookup happens.
    pub fn meeting_from_link(&self, url: &str) -> Option<MeetingDescriptor> {
        MeetingDescriptor::from_link(url)
    }

    pub async fn locate_transcripts(&self, request: &LocateRequest) -> Result<Vec<TranscriptDescriptor>> {
        self.locator.locate(request).await
    }

    /// Transcripts for a meeting, closest to its start date first.
    pub async fn transcripts_for_meeting(&self, meeting: &MeetingDescriptor) -> Result<Vec<TranscriptDescriptor>> {
        let request = LocateRequest {
            code: Some(meeting.meeting_code().to_string()),
            title: meeting.search_title().map(str::to_string),
            date: meeting.start.map(|s| s.local()),
        };
        self.locator.locate(&request).await
    }

    pub async fn transcripts_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<TranscriptDescriptor>> {
        self.locator.between(start, end).await
    }

    pub async fn folder_transcripts(&self, folder_name: &str) -> Result<Vec<TranscriptDescriptor>> {
        self.locator.list_folder(folder_name).await
    }

    /// See [`ContentPipeline::get_text`].
    pub async fn get_text(&self, file_id: &str) -> Result<Option<TranscriptText>> {
        self.pipeline.get_text(file_id).await
    }

    /// See [`ContentPipeline::download`].
    pub async fn download(&self, file_id: &str, destination: Option<&Path>) -> Result<PathBuf> {
        self.pipeline.download(file_id, destination).await
    }

    /// Download into the download directory, named after the meeting.
    pub async fn download_for_meeting(
        &self,
        transcript: &TranscriptDescriptor,
        meeting: &MeetingDescriptor,
    ) -> Result<PathBuf> {
        self.pipeline
            .download_for_meeting(&transcript.file_id, meeting)
            .await
    }
}

fn meetings_from_events(events: &[RawEvent]) -> Vec<MeetingDescriptor> {
    let mut meetings: Vec<MeetingDescriptor> = events
        .iter()
        .filter_map(|event| match extractor::extract(event) {
            Ok(meeting) => meeting,
            Err(e) => {
                tracing::warn!("Skipping calendar event: {}", e);
                None
            }
        })
        .collect();
    meetings.sort_by(compare_by_start_desc);

    tracing::debug!("Extracted {} meetings from {} events", meetings.len(), events.len());
    meetings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ReaderError;
    use crate::drive::{FileRecord, FOLDER_MIME, GOOGLE_DOC_MIME};
    use crate::error::{RemoteError, TranscriptError};
    use crate::testing::{FakeCalendar, FakeDrive};
    use async_trait::async_trait;
    use serde_json::json;

    struct NoReader;

    #[async_trait]
    impl DocumentReader for NoReader {
        async fn read_text(&self, _path: &Path) -> std::result::Result<String, ReaderError> {
            Err(ReaderError::Unavailable("no reader in tests".to_string()))
        }
    }

    fn event(value: serde_json::Value) -> RawEvent {
        serde_json::from_value(value).unwrap()
    }

    fn service(calendar: Arc<FakeCalendar>, drive: Arc<FakeDrive>) -> TranscriptService {
        let mut config = TranscriptsConfig::default();
        config.retry.base_delay_ms = 0;
        config.retry.max_delay_ms = 0;
        TranscriptService::with_reader(Session::new(calendar, drive), config, Arc::new(NoReader))
    }

    fn drive_with_transcript() -> Arc<FakeDrive> {
        let drive = Arc::new(FakeDrive::new());
        drive.add_file(
            FileRecord {
                id: "folder".to_string(),
                name: "Meet Recordings".to_string(),
                mime_type: FOLDER_MIME.to_string(),
                ..FileRecord::default()
            },
            b"",
        );
        drive.add_file(
            FileRecord {
                id: "t1".to_string(),
                name: "Weekly Sync (Jan 5, 2024, 3:00 PM) - Transcript".to_string(),
                mime_type: GOOGLE_DOC_MIME.to_string(),
                parents: vec!["folder".to_string()],
                ..FileRecord::default()
            },
            b"",
        );
        drive
    }

    fn sample_events() -> Vec<RawEvent> {
        vec![
            event(json!({
                "id": "older",
                "summary": "Planning",
                "start": { "dateTime": "2024-01-02T10:00:00Z" },
                "location": "https://meet.google.com/aaa-bbbb-ccc"
            })),
            event(json!({ "id": "lunch", "summary": "Lunch", "start": { "date": "2024-01-03" } })),
            event(json!({
                "id": "broken",
                "start": { "dateTime": "not a time" },
                "location": "https://meet.google.com/bro-kenn-evt"
            })),
            event(json!({
                "id": "newer",
                "summary": "Weekly Sync",
                "start": { "dateTime": "2024-01-05T15:00:00-08:00" },
                "conferenceData": { "entryPoints": [
                    { "entryPointType": "video", "uri": "https://meet.google.com/abc-defg-hij" }
                ]}
            })),
            event(json!({
                "id": "unscheduled",
                "description": "https://meet.google.com/zzz-zzzz-zzz"
            })),
        ]
    }

    #[tokio::test]
    async fn test_list_meetings_skips_and_sorts() {
        let calendar = Arc::new(FakeCalendar::with_events(sample_events()));
        let service = service(calendar.clone(), Arc::new(FakeDrive::new()));

        let meetings = service.list_meetings(Some(2)).await.unwrap();
        let ids: Vec<_> = meetings.iter().map(|m| m.id.as_deref().unwrap()).collect();
        assert_eq!(ids, vec!["newer", "older", "unscheduled"]);

        let window = &calendar.windows()[0];
        assert_eq!(window.time_max - window.time_min, Duration::days(60 + 30));
        assert_eq!(window.query, None);
    }

    #[tokio::test]
    async fn test_list_meetings_surfaces_remote_failure() {
        let calendar = Arc::new(FakeCalendar::new());
        calendar.fail_with(RemoteError::permanent("list calendar events", "401 unauthorized"));
        let service = service(calendar, Arc::new(FakeDrive::new()));

        assert!(matches!(
            service.list_meetings(None).await,
            Err(TranscriptError::Remote(_))
        ));
    }

    #[tokio::test]
    async fn test_search_meetings_sends_title_query() {
        let calendar = Arc::new(FakeCalendar::with_events(sample_events()));
        let service = service(calendar.clone(), Arc::new(FakeDrive::new()));

        service.search_meetings(" Weekly Sync ", None).await.unwrap();
        assert_eq!(
            calendar.windows()[0].query.as_deref(),
            Some("Weekly Sync meet.google.com")
        );
    }

    #[tokio::test]
    async fn test_get_meeting() {
        let calendar = Arc::new(FakeCalendar::with_events(sample_events()));
        let service = service(calendar, Arc::new(FakeDrive::new()));

        let meeting = service.get_meeting("newer").await.unwrap().unwrap();
        assert_eq!(meeting.meeting_code(), "abc-defg-hij");
        assert_eq!(service.get_meeting("lunch").await.unwrap(), None);
        assert_eq!(service.get_meeting("missing").await.unwrap(), None);
        assert!(matches!(
            service.get_meeting("broken").await,
            Err(TranscriptError::MalformedTimestamp { .. })
        ));
    }

    #[tokio::test]
    async fn test_list_meetings_retries_transient_failure() {
        let calendar = Arc::new(FakeCalendar::with_events(sample_events()));
        calendar.fail_next(RemoteError::transient("list calendar events", "503"));
        let service = service(calendar.clone(), Arc::new(FakeDrive::new()));

        let meetings = service.list_meetings(None).await.unwrap();
        assert_eq!(meetings.len(), 3);
        assert_eq!(calendar.windows().len(), 2);
    }

    #[tokio::test]
    async fn test_transcripts_for_meeting() {
        let calendar = Arc::new(FakeCalendar::with_events(sample_events()));
        let drive = drive_with_transcript();
        let service = service(calendar, drive.clone());

        let meeting = service.get_meeting("newer").await.unwrap().unwrap();
        let transcripts = service.transcripts_for_meeting(&meeting).await.unwrap();
        assert_eq!(transcripts.len(), 1);
        assert_eq!(transcripts[0].meeting_title.as_deref(), Some("Weekly Sync"));
        assert!(drive.queries().iter().all(|q| !q.contains("abc-defg-hij")));
    }

    #[tokio::test]
    async fn test_pasted_link_finds_transcript() {
        let drive = drive_with_transcript();
        let service = service(Arc::new(FakeCalendar::new()), drive.clone());

        let meeting = service
            .meeting_from_link("https://meet.google.com/abc-defg-hij")
            .unwrap();
        let transcripts = service.transcripts_for_meeting(&meeting).await.unwrap();
        assert_eq!(transcripts.len(), 1);
        assert_eq!(transcripts[0].file_id, "t1");

        let search = drive.queries().last().cloned().unwrap();
        assert!(!search.contains(&meeting.title));
        assert!(!search.contains("abc-defg-hij"));
    }

    #[tokio::test]
    async fn test_transcript_search_retries_transient_failure() {
        let drive = drive_with_transcript();
        drive.fail_next(RemoteError::transient("search drive files", "503"));
        let service = service(Arc::new(FakeCalendar::new()), drive.clone());

        let request = LocateRequest {
            title: Some("Weekly Sync".to_string()),
            ..LocateRequest::default()
        };
        let transcripts = service.locate_transcripts(&request).await.unwrap();
        assert_eq!(transcripts.len(), 1);
        // failed folder lookup, its retry, then the transcript search
        assert_eq!(drive.search_calls(), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_is_not_retried() {
        let drive = drive_with_transcript();
        drive.fail_next(RemoteError::permanent("search drive files", "403 forbidden"));
        let service = service(Arc::new(FakeCalendar::new()), drive.clone());

        let result = service.locate_transcripts(&LocateRequest::default()).await;
        assert!(matches!(result, Err(TranscriptError::Remote(e)) if !e.is_transient()));
        assert_eq!(drive.search_calls(), 1);
    }
}
