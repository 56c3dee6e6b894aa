//! Finds transcript documents in drive.
//!
//! Transcript names carry the meeting title and a human-readable date, never
//! the meeting code, so searches go by folder, title and the transcript marker.

use std::cmp::Reverse;
use std::sync::{Arc, OnceLock};

use chrono::{DateTime, NaiveDateTime, Utc};
use regex::Regex;

use crate::config::LocatorConfig;
use crate::drive::{DriveApi, DriveQuery, FieldSet, FileRecord, Predicate, FOLDER_MIME};
use crate::error::Result;
use crate::models::{FolderHandle, TranscriptDescriptor};
use crate::naming::{decompose_transcript_name, extract_meeting_code};

fn punctuation_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation regex should compile"))
}

/// What is known about the meeting whose transcripts are wanted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocateRequest {
    /// Advisory only. Transcript names do not contain codes, so this never
    /// reaches the remote query.
    pub code: Option<String>,
    pub title: Option<String>,
    /// Used to rank results by proximity
    pub date: Option<NaiveDateTime>,
}

pub struct TranscriptLocator {
    drive: Arc<dyn DriveApi>,
    config: LocatorConfig,
}

impl TranscriptLocator {
    pub fn new(drive: Arc<dyn DriveApi>, config: LocatorConfig) -> Self {
        Self { drive, config }
    }

    /// Find the transcripts folder: the conventional name first, then each
    /// alternate in order. Stops at the first hit.
    pub async fn resolve_folder(&self) -> Result<Option<FolderHandle>> {
        if let Some(folder) = self.find_folder_named(&self.config.folder_name).await? {
            return Ok(Some(folder));
        }

        for alternate in &self.config.alternate_folder_names {
            let query = DriveQuery::new()
                .and(Predicate::NameContains(alternate.clone()))
                .and(Predicate::MimeTypeEquals(FOLDER_MIME.to_string()));
            if let Some(folder) = self.first_folder(&query).await? {
                tracing::info!("Using alternate transcripts folder '{}'", folder.name);
                return Ok(Some(folder));
            }
        }

        tracing::info!(
            "No transcripts folder found (tried '{}' and {} alternates)",
            self.config.folder_name,
            self.config.alternate_folder_names.len()
        );
        Ok(None)
    }

    async fn find_folder_named(&self, name: &str) -> Result<Option<FolderHandle>> {
        let query = DriveQuery::new()
            .and(Predicate::NameEquals(name.to_string()))
            .and(Predicate::MimeTypeEquals(FOLDER_MIME.to_string()));
        self.first_folder(&query).await
    }

    async fn first_folder(&self, query: &DriveQuery) -> Result<Option<FolderHandle>> {
        let folders = self.drive.search(query, FieldSet::Folder).await?;
        Ok(folders.into_iter().next().map(|f| FolderHandle {
            id: f.id,
            name: f.name,
        }))
    }

    /// Transcripts in the transcripts folder matching the request.
    ///
    /// A missing folder yields an empty list. A failed search is an error.
    pub async fn locate(&self, request: &LocateRequest) -> Result<Vec<TranscriptDescriptor>> {
        let Some(folder) = self.resolve_folder().await? else {
            return Ok(Vec::new());
        };

        let mut query = DriveQuery::new().and(Predicate::InParents(folder.id.clone()));
        if let Some(title) = request.title.as_deref().and_then(clean_title) {
            query = query.and(Predicate::NameContains(title));
        }
        query = query
            .and(Predicate::NameContains(self.config.transcript_marker.clone()))
            .and(Predicate::Trashed(false));

        if let Some(code) = &request.code {
            tracing::debug!("Locating transcripts for meeting {} in '{}'", code, folder.name);
        }

        let files = self.drive.search(&query, FieldSet::File).await?;
        let mut transcripts = self.qualifying(files);
        rank(&mut transcripts, request.date);

        tracing::debug!("Found {} transcripts in '{}'", transcripts.len(), folder.name);
        Ok(transcripts)
    }

    /// Transcripts modified within `[start, end]`, anywhere in drive.
    pub async fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<TranscriptDescriptor>> {
        let marker = &self.config.transcript_marker;
        let query = DriveQuery::new()
            .and(Predicate::ModifiedAtOrAfter(start))
            .and(Predicate::ModifiedAtOrBefore(end))
            .and(Predicate::Or(vec![
                Predicate::NameContains(marker.to_lowercase()),
                Predicate::NameContains(marker.clone()),
            ]))
            .and(Predicate::Trashed(false));

        let files = self.drive.search(&query, FieldSet::File).await?;
        let mut transcripts = self.qualifying(files);
        rank(&mut transcripts, None);
        Ok(transcripts)
    }

    /// Every transcript in the folder with exactly this name. No alternates are tried.
    pub async fn list_folder(&self, name: &str) -> Result<Vec<TranscriptDescriptor>> {
        let Some(folder) = self.find_folder_named(name).await? else {
            tracing::info!("Folder '{}' not found", name);
            return Ok(Vec::new());
        };

        let query = DriveQuery::new()
            .and(Predicate::InParents(folder.id))
            .and(Predicate::Trashed(false));
        let files = self.drive.search(&query, FieldSet::File).await?;
        let mut transcripts = self.qualifying(files);
        rank(&mut transcripts, None);
        Ok(transcripts)
    }

    fn qualifying(&self, files: Vec<FileRecord>) -> Vec<TranscriptDescriptor> {
        files
            .into_iter()
            .filter(|f| is_transcript(f, &self.config.transcript_marker))
            .map(describe)
            .collect()
    }
}

/// Strip punctuation so user text cannot over-constrain the remote match.
fn clean_title(title: &str) -> Option<String> {
    let cleaned = punctuation_regex().replace_all(title, "");
    let cleaned = cleaned.trim();
    (!cleaned.is_empty()).then(|| cleaned.to_string())
}

fn is_transcript(file: &FileRecord, marker: &str) -> bool {
    let marker = marker.to_lowercase();
    let name = file.name.to_lowercase();
    name.contains(&marker)
        || name.ends_with(&format!(" - {}", marker))
        || file.mime_type.to_lowercase().contains(&marker)
}

fn describe(file: FileRecord) -> TranscriptDescriptor {
    let decomposed = decompose_transcript_name(&file.name);
    let meeting_code = extract_meeting_code(&file.name);
    TranscriptDescriptor {
        meeting_title: Some(decomposed.title).filter(|t| !t.is_empty()),
        meeting_date: decomposed.date,
        meeting_code,
        file_id: file.id,
        name: file.name,
        mime_type: file.mime_type,
        size: file.size,
        created_time: file.created_time,
        modified_time: file.modified_time,
        web_view_link: file.web_view_link,
    }
}

/// Closest inferred date first when `target` is given, undated last; then
/// most recently modified.
fn rank(transcripts: &mut [TranscriptDescriptor], target: Option<NaiveDateTime>) {
    transcripts.sort_by_key(|t| {
        let distance = target.and_then(|target| {
            t.meeting_date
                .as_ref()
                .and_then(|d| d.as_naive())
                .map(|d| (d - target).num_seconds().abs())
        });
        (
            target.is_some() && distance.is_none(),
            distance,
            Reverse(t.modified_time),
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RemoteError, TranscriptError};
    use crate::testing::FakeDrive;
    use chrono::{NaiveDate, TimeZone};

    fn folder(id: &str, name: &str) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: FOLDER_MIME.to_string(),
            ..FileRecord::default()
        }
    }

    fn doc(id: &str, name: &str, parent: &str, modified_day: u32) -> FileRecord {
        FileRecord {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: "application/vnd.google-apps.document".to_string(),
            parents: vec![parent.to_string()],
            modified_time: Some(Utc.with_ymd_and_hms(2024, 1, modified_day, 12, 0, 0).unwrap()),
            ..FileRecord::default()
        }
    }

    fn locator(drive: Arc<FakeDrive>) -> TranscriptLocator {
        TranscriptLocator::new(drive, LocatorConfig::default())
    }

    #[tokio::test]
    async fn test_primary_folder_hit_skips_alternates() {
        let drive = Arc::new(FakeDrive::new());
        drive.add_file(folder("main", "Meet Recordings"), b"");
        drive.add_file(folder("alt", "Recordings"), b"");

        let found = locator(drive.clone()).resolve_folder().await.unwrap().unwrap();
        assert_eq!(found.id, "main");
        assert_eq!(drive.search_calls(), 1);
    }

    #[tokio::test]
    async fn test_alternates_tried_in_order_until_first_hit() {
        let drive = Arc::new(FakeDrive::new());
        drive.add_file(folder("mm", "Meeting Recordings"), b"");
        drive.add_file(folder("rec", "Recordings"), b"");

        let found = locator(drive.clone()).resolve_folder().await.unwrap().unwrap();
        // Primary, "Meet recordings", "Google Meet Recordings", "Meeting Recordings"
        assert_eq!(found.id, "mm");
        assert_eq!(drive.search_calls(), 4);
    }

    #[tokio::test]
    async fn test_missing_folder_is_empty_not_error() {
        let drive = Arc::new(FakeDrive::new());
        let locator = locator(drive.clone());

        assert!(locator.resolve_folder().await.unwrap().is_none());
        assert_eq!(drive.search_calls(), 5);
        assert!(locator.locate(&LocateRequest::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_failure_is_distinct_from_no_results() {
        let drive = Arc::new(FakeDrive::new());
        drive.fail_with(RemoteError::transient("search drive files", "503 backend error"));

        let result = locator(drive).locate(&LocateRequest::default()).await;
        assert!(matches!(result, Err(TranscriptError::Remote(e)) if e.is_transient()));
    }

    #[tokio::test]
    async fn test_query_uses_clean_title_and_never_the_code() {
        let drive = Arc::new(FakeDrive::new());
        drive.add_file(folder("main", "Meet Recordings"), b"");
        drive.add_file(doc("t1", "Q3 Planning (Jan 5, 2024, 3:00 PM) - Transcript", "main", 5), b"");
        drive.add_file(doc("t2", "Retro (Jan 6, 2024, 3:00 PM) - Transcript", "main", 6), b"");

        let request = LocateRequest {
            code: Some("abc-defg-hij".to_string()),
            title: Some("Q3 Planning?!".to_string()),
            date: None,
        };
        let found = locator(drive.clone()).locate(&request).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_id, "t1");
        assert_eq!(found[0].meeting_title.as_deref(), Some("Q3 Planning"));

        let queries = drive.queries();
        let search = queries.last().unwrap();
        assert!(search.contains("'main' in parents"));
        assert!(search.contains("name contains 'Q3 Planning'"));
        assert!(search.contains("name contains 'Transcript'"));
        assert!(!search.contains("abc-defg-hij"));
    }

    #[tokio::test]
    async fn test_non_transcripts_are_dropped() {
        let drive = Arc::new(FakeDrive::new());
        drive.add_file(folder("main", "Meet Recordings"), b"");
        drive.add_file(doc("t1", "Sync - Transcript", "main", 5), b"");
        drive.add_file(doc("r1", "Sync recording.mp4", "main", 5), b"");

        let found = locator(drive).list_folder("Meet Recordings").await.unwrap();
        let ids: Vec<_> = found.iter().map(|t| t.file_id.as_str()).collect();
        assert_eq!(ids, vec!["t1"]);
    }

    #[tokio::test]
    async fn test_ranked_by_date_proximity() {
        let drive = Arc::new(FakeDrive::new());
        drive.add_file(folder("main", "Meet Recordings"), b"");
        drive.add_file(doc("far", "Sync (Jan 20, 2024, 3:00 PM) - Transcript", "main", 20), b"");
        drive.add_file(doc("near", "Sync (Jan 5, 2024, 4:00 PM) - Transcript", "main", 5), b"");
        drive.add_file(doc("undated", "Sync - Transcript", "main", 28), b"");

        let request = LocateRequest {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(15, 0, 0),
            ..LocateRequest::default()
        };
        let found = locator(drive).locate(&request).await.unwrap();
        let ids: Vec<_> = found.iter().map(|t| t.file_id.as_str()).collect();
        assert_eq!(ids, vec!["near", "far", "undated"]);
    }

    #[tokio::test]
    async fn test_without_date_newest_first() {
        let drive = Arc::new(FakeDrive::new());
        drive.add_file(folder("main", "Meet Recordings"), b"");
        drive.add_file(doc("old", "A - Transcript", "main", 2), b"");
        drive.add_file(doc("new", "B - Transcript", "main", 9), b"");

        let found = locator(drive).locate(&LocateRequest::default()).await.unwrap();
        assert_eq!(found[0].file_id, "new");
        assert_eq!(found[1].file_id, "old");
    }

    #[tokio::test]
    async fn test_between_filters_on_modified_time() {
        let drive = Arc::new(FakeDrive::new());
        drive.add_file(doc("in", "Sync - Transcript", "anywhere", 10), b"");
        drive.add_file(doc("out", "Sync - Transcript", "anywhere", 25), b"");

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap();
        let found = locator(drive.clone()).between(start, end).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_id, "in");
        assert!(drive.queries()[0].contains("(name contains 'transcript' or name contains 'Transcript')"));
    }

    #[test]
    fn test_clean_title() {
        assert_eq!(clean_title("Bob's 1:1").as_deref(), Some("Bobs 11"));
        assert_eq!(clean_title("  ?!  "), None);
    }
}
