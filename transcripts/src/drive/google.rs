//! Google Drive API adapter.

use async_trait::async_trait;
use google_drive3::api::File;
use google_drive3::hyper_rustls::HttpsConnector;
use google_drive3::DriveHub;
use http_body_util::BodyExt;
use hyper_util::client::legacy::connect::HttpConnector;

use super::{DriveApi, DriveQuery, FieldSet, FileRecord};
use crate::error::RemoteError;

/// Read-only scope requested for drive access.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";

const METADATA_FIELDS: &str =
    "id, name, mimeType, size, createdTime, modifiedTime, parents, webViewLink, trashed";

pub type Hub = DriveHub<HttpsConnector<HttpConnector>>;

/// [`DriveApi`] backed by the Google Drive v3 API.
pub struct GoogleDrive {
    hub: Hub,
    page_size: i32,
}

impl GoogleDrive {
    pub fn new(hub: Hub, page_size: i32) -> Self {
        Self { hub, page_size }
    }

    async fn search_page(
        &self,
        query: &str,
        fields: FieldSet,
        page_token: Option<&str>,
    ) -> Result<(Vec<File>, Option<String>), RemoteError> {
        let mut call = self
            .hub
            .files()
            .list()
            .q(query)
            .spaces("drive")
            .page_size(self.page_size)
            .param("fields", fields.as_drive_fields())
            .add_scope(DRIVE_SCOPE);
        if let Some(token) = page_token {
            call = call.page_token(token);
        }

        let (_, list) = call
            .doit()
            .await
            .map_err(|e| classify("search drive files", e))?;

        Ok((list.files.unwrap_or_default(), list.next_page_token))
    }

    async fn read_body(operation: &str, response: google_drive3::common::Response) -> Result<Vec<u8>, RemoteError> {
        let bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| RemoteError::transient(operation, e.to_string()))?
            .to_bytes();
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl DriveApi for GoogleDrive {
    async fn search(&self, query: &DriveQuery, fields: FieldSet) -> Result<Vec<FileRecord>, RemoteError> {
        let q = query.to_query_string();
        tracing::debug!("Drive search: {}", q);

        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let (items, next) = self.search_page(&q, fields, page_token.as_deref()).await?;
            files.extend(items.into_iter().map(FileRecord::from));

            match next {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(files)
    }

    async fn get_metadata(&self, file_id: &str) -> Result<Option<FileRecord>, RemoteError> {
        let file = match self
            .hub
            .files()
            .get(file_id)
            .param("fields", METADATA_FIELDS)
            .add_scope(DRIVE_SCOPE)
            .doit()
            .await
        {
            Ok((_, file)) => Some(file),
            Err(e) if status_of(&e) == Some(404) => None,
            Err(e) => return Err(classify("get file metadata", e)),
        };

        Ok(file.map(FileRecord::from))
    }

    async fn get_content(&self, file_id: &str) -> Result<Vec<u8>, RemoteError> {
        let (response, _) = self
            .hub
            .files()
            .get(file_id)
            .param("alt", "media")
            .add_scope(DRIVE_SCOPE)
            .doit()
            .await
            .map_err(|e| classify("download file", e))?;
        Self::read_body("download file", response).await
    }

    async fn export(&self, file_id: &str, mime_type: &str) -> Result<Vec<u8>, RemoteError> {
        let response = self
            .hub
            .files()
            .export(file_id, mime_type)
            .add_scope(DRIVE_SCOPE)
            .doit()
            .await
            .map_err(|e| classify("export document", e))?;
        Self::read_body("export document", response).await
    }
}

impl From<File> for FileRecord {
    fn from(file: File) -> Self {
        FileRecord {
            id: file.id.unwrap_or_default(),
            name: file.name.unwrap_or_default(),
            mime_type: file.mime_type.unwrap_or_default(),
            size: file.size.and_then(|s| u64::try_from(s).ok()),
            created_time: file.created_time,
            modified_time: file.modified_time,
            parents: file.parents.unwrap_or_default(),
            web_view_link: file.web_view_link,
            trashed: file.trashed.unwrap_or(false),
        }
    }
}

fn status_of(error: &google_drive3::Error) -> Option<u16> {
    match error {
        google_drive3::Error::BadRequest(value) => value
            .get("error")
            .and_then(|e| e.get("code"))
            .and_then(|c| c.as_u64())
            .and_then(|c| u16::try_from(c).ok()),
        google_drive3::Error::Failure(response) => Some(response.status().as_u16()),
        _ => None,
    }
}

/// Map a client error onto the transient/permanent split used for retries.
fn classify(operation: &str, error: google_drive3::Error) -> RemoteError {
    let transient = match &error {
        google_drive3::Error::HttpError(_) | google_drive3::Error::Io(_) => true,
        _ => matches!(status_of(&error), Some(408 | 429 | 500..=599)),
    };

    if transient {
        RemoteError::transient(operation, error.to_string())
    } else {
        RemoteError::permanent(operation, error.to_string())
    }
}
