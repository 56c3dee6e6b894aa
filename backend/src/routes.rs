use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{health, meetings, transcripts};
use crate::state::AppState;

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))

        // Meeting routes
        .route("/meetings", get(meetings::list_meetings))
        .route("/meetings/:id", get(meetings::get_meeting))
        .route("/meetings/:id/transcripts", get(meetings::meeting_transcripts))
        .route("/links/parse", post(meetings::parse_link))

        // Transcript routes
        .route("/transcripts", get(transcripts::locate_transcripts))
        .route("/transcripts/range", get(transcripts::transcripts_in_range))
        .route("/transcripts/folder/:name", get(transcripts::folder_transcripts))
        .route("/transcripts/:file_id/content", get(transcripts::transcript_content))
        .route("/transcripts/:file_id/download", get(transcripts::download_transcript))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use std::path::Path;
    use std::sync::Arc;
    use tower::ServiceExt;

    use ::transcripts::calendar::RawEvent;
    use ::transcripts::content::{DocumentReader, ReaderError};
    use ::transcripts::drive::{FileRecord, DOCX_MIME, FOLDER_MIME, GOOGLE_DOC_MIME};
    use ::transcripts::testing::{FakeCalendar, FakeDrive};
    use ::transcripts::{RemoteError, Session, TranscriptService, TranscriptsConfig};

    struct NoReader;

    #[async_trait::async_trait]
    impl DocumentReader for NoReader {
        async fn read_text(&self, _path: &Path) -> Result<String, ReaderError> {
            Err(ReaderError::Unavailable("no reader in tests".to_string()))
        }
    }

    fn app(calendar: Arc<FakeCalendar>, drive: Arc<FakeDrive>, download_dir: &Path) -> Router {
        let mut config = TranscriptsConfig::default();
        config.content.download_dir = download_dir.to_path_buf();
        config.retry.base_delay_ms = 0;
        config.retry.max_delay_ms = 0;
        let service = TranscriptService::with_reader(
            Session::new(calendar, drive),
            config,
            Arc::new(NoReader),
        );
        Router::new()
            .nest("/api", api_routes())
            .with_state(AppState::new(service))
    }

    fn events() -> Vec<RawEvent> {
        vec![serde_json::from_value(json!({
            "id": "evt1",
            "summary": "Weekly Sync",
            "start": { "dateTime": "2024-01-05T15:00:00Z" },
            "location": "https://meet.google.com/abc-defg-hij"
        }))
        .unwrap()]
    }

    fn drive_with_transcript() -> FakeDrive {
        let drive = FakeDrive::new();
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
        drive.add_export("t1", "text/plain", b"Alice: hello\nBob: hi");
        drive
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, body.to_vec())
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let (status, body) = send(app, request).await;
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(FakeCalendar::new()), Arc::new(FakeDrive::new()), dir.path());

        let (status, body) = get_json(app, "/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_meetings() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(FakeCalendar::with_events(events())), Arc::new(FakeDrive::new()), dir.path());

        let (status, body) = get_json(app, "/api/meetings?months_back=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["meetings"][0]["meeting_code"], "abc-defg-hij");
        assert_eq!(body["warning"], Value::Null);
    }

    #[tokio::test]
    async fn test_list_meetings_degrades_on_remote_failure() {
        let dir = tempfile::tempdir().unwrap();
        let calendar = Arc::new(FakeCalendar::with_events(events()));
        calendar.fail_with(RemoteError::transient("list calendar events", "503"));
        let app = app(calendar, Arc::new(FakeDrive::new()), dir.path());

        let (status, body) = get_json(app, "/api/meetings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 0);
        assert!(body["warning"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn test_list_meetings_rejects_out_of_range_window() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(FakeCalendar::new()), Arc::new(FakeDrive::new()), dir.path());

        let (status, body) = get_json(app, "/api/meetings?months_back=500").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_get_meeting_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(FakeCalendar::with_events(events())), Arc::new(FakeDrive::new()), dir.path());

        let (status, body) = get_json(app, "/api/meetings/missing").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "not_found");
    }

    #[tokio::test]
    async fn test_meeting_transcripts() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(
            Arc::new(FakeCalendar::with_events(events())),
            Arc::new(drive_with_transcript()),
            dir.path(),
        );

        let (status, body) = get_json(app, "/api/meetings/evt1/transcripts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["meeting"]["title"], "Weekly Sync");
        assert_eq!(body["transcripts"][0]["file_id"], "t1");
        assert_eq!(body["transcripts"][0]["meeting_title"], "Weekly Sync");
    }

    #[tokio::test]
    async fn test_parse_link() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(FakeCalendar::new()), Arc::new(FakeDrive::new()), dir.path());

        let request = Request::builder()
            .method("POST")
            .uri("/api/links/parse")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "url": "https://meet.google.com/abc-defg-hij?authuser=1" }).to_string(),
            ))
            .unwrap();
        let (status, body) = send(app.clone(), request).await;
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], true);
        assert_eq!(body["meeting_code"], "abc-defg-hij");
        assert_eq!(body["query_params"][0]["name"], "authuser");

        let request = Request::builder()
            .method("POST")
            .uri("/api/links/parse")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "url": "https://zoom.us/j/123" }).to_string()))
            .unwrap();
        let (status, body) = send(app, request).await;
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["valid"], false);
    }

    #[tokio::test]
    async fn test_locate_rejects_bad_date() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(FakeCalendar::new()), Arc::new(drive_with_transcript()), dir.path());

        let (status, _) = get_json(app, "/api/transcripts?date=someday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_locate_by_title() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(FakeCalendar::new()), Arc::new(drive_with_transcript()), dir.path());

        let (status, body) = get_json(app, "/api/transcripts?title=Weekly%20Sync&date=2024-01-05").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
    }

    #[tokio::test]
    async fn test_range_must_be_ordered() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(FakeCalendar::new()), Arc::new(drive_with_transcript()), dir.path());

        let (status, _) = get_json(
            app,
            "/api/transcripts/range?start=2024-02-01T00:00:00Z&end=2024-01-01T00:00:00Z",
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_transcript_content() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(FakeCalendar::new()), Arc::new(drive_with_transcript()), dir.path());

        let (status, body) = get_json(app, "/api/transcripts/t1/content").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "Alice: hello\nBob: hi");
        assert_eq!(body["degraded"], false);
    }

    #[tokio::test]
    async fn test_download_transcript() {
        let dir = tempfile::tempdir().unwrap();
        let drive = drive_with_transcript();
        drive.add_export("t1", DOCX_MIME, b"docx bytes");
        let app = app(Arc::new(FakeCalendar::new()), Arc::new(drive), dir.path());

        let request = Request::builder()
            .uri("/api/transcripts/t1/download")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response.headers()[header::CONTENT_DISPOSITION].to_str().unwrap().to_string();
        assert!(disposition.contains(".docx"));

        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"docx bytes");
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(Arc::new(FakeCalendar::new()), Arc::new(FakeDrive::new()), dir.path());

        let (status, _) = get_json(app, "/api/transcripts/nope/content").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
