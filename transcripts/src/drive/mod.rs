//! File storage access.

pub mod google;
pub mod query;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::RemoteError;
pub use query::{DriveQuery, Predicate};

/// Mime type of drive folders.
pub const FOLDER_MIME: &str = "application/vnd.google-apps.folder";

/// Mime type of native Google Docs.
pub const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";

/// Office Open XML word-processing documents.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Metadata of a stored file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FileRecord {
    pub id: String,
    pub name: String,
    pub mime_type: String,
    pub size: Option<u64>,
    pub created_time: Option<DateTime<Utc>>,
    pub modified_time: Option<DateTime<Utc>>,
    pub parents: Vec<String>,
    pub web_view_link: Option<String>,
    pub trashed: bool,
}

/// Which metadata fields a search should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSet {
    /// Identity only
    Folder,
    /// Everything a transcript descriptor needs
    File,
}

impl FieldSet {
    /// Partial-response selector understood by the Drive API.
    pub fn as_drive_fields(&self) -> &'static str {
        match self {
            FieldSet::Folder => "nextPageToken, files(id, name)",
            FieldSet::File => {
                "nextPageToken, files(id, name, mimeType, size, createdTime, modifiedTime, parents, webViewLink, trashed)"
            }
        }
    }
}

/// Read-only file storage capability.
#[async_trait]
pub trait DriveApi: Send + Sync {
    /// Every file matching the query, following pagination.
    async fn search(&self, query: &DriveQuery, fields: FieldSet) -> Result<Vec<FileRecord>, RemoteError>;

    /// Metadata for one file. `Ok(None)` when it does not exist.
    async fn get_metadata(&self, file_id: &str) -> Result<Option<FileRecord>, RemoteError>;

    /// Raw bytes of a stored (non-native) file.
    async fn get_content(&self, file_id: &str) -> Result<Vec<u8>, RemoteError>;

    /// Convert a native document to `mime_type` and return the bytes.
    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>, RemoteError>;
}
