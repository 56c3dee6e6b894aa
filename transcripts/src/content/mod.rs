//! Content extraction: downloads transcript files and turns them into text.
//!
//! Every branch that needs a local copy goes through [`TemporaryArtifact`],
//! which is removed before the operation returns whatever the outcome.

pub mod artifact;
pub mod encoding;
pub mod reader;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::config::ContentConfig;
use crate::drive::{DriveApi, FileRecord, DOCX_MIME, GOOGLE_DOC_MIME};
use crate::error::{Result, TranscriptError};
use crate::models::MeetingDescriptor;
use crate::naming::transcript_file_name;
pub use artifact::TemporaryArtifact;
pub use encoding::Encoding;
pub use reader::{DocumentReader, PandocReader, ReaderError};

const PLAIN_TEXT_MIME: &str = "text/plain";

/// How a stored file is turned into bytes and text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocKind {
    /// Native document; must be exported
    GoogleDoc,
    /// `.docx`; text needs a structure-aware reader
    WordDocument,
    /// Read directly as UTF-8
    PlainText,
    /// Anything else; decoded through the encoding chain
    Other,
}

impl DocKind {
    pub fn classify(file: &FileRecord) -> Self {
        let name = file.name.to_lowercase();
        let mime = file.mime_type.to_lowercase();

        if mime == GOOGLE_DOC_MIME {
            DocKind::GoogleDoc
        } else if mime == DOCX_MIME || mime.contains("docx") || name.ends_with(".docx") {
            DocKind::WordDocument
        } else if mime.contains("text") || name.ends_with(".txt") {
            DocKind::PlainText
        } else {
            DocKind::Other
        }
    }

    /// Extension used when saving the downloaded bytes.
    fn extension(&self, name: &str) -> String {
        match self {
            DocKind::GoogleDoc | DocKind::WordDocument => "docx".to_string(),
            DocKind::PlainText => "txt".to_string(),
            DocKind::Other => Path::new(name)
                .extension()
                .map(|e| e.to_string_lossy().into_owned())
                .unwrap_or_else(|| "bin".to_string()),
        }
    }
}

/// Text recovered from a transcript file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptText {
    pub text: String,
    /// Encoding that decoded the bytes; `None` when a document reader produced the text
    pub encoding: Option<Encoding>,
    /// Set when the document reader was unavailable and the bytes were decoded
    /// naively. Paragraph structure is lost and markup may leak into the text.
    pub degraded: bool,
}

impl TranscriptText {
    fn decoded(text: String, encoding: Encoding) -> Self {
        Self {
            text,
            encoding: Some(encoding),
            degraded: false,
        }
    }
}

pub struct ContentPipeline {
    drive: Arc<dyn DriveApi>,
    reader: Arc<dyn DocumentReader>,
    config: ContentConfig,
}

impl ContentPipeline {
    pub fn new(drive: Arc<dyn DriveApi>, reader: Arc<dyn DocumentReader>, config: ContentConfig) -> Self {
        Self {
            drive,
            reader,
            config,
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.config.download_dir
    }

    async fn metadata(&self, file_id: &str) -> Result<FileRecord> {
        self.drive
            .get_metadata(file_id)
            .await?
            .ok_or_else(|| TranscriptError::not_found(format!("file {}", file_id)))
    }

    /// Read a transcript as text.
    ///
    /// `Ok(None)` means the file exists but could not be rendered as text; the
    /// raw bytes remain available through [`ContentPipeline::download`]. A
    /// missing file is [`TranscriptError::NotFound`].
    pub async fn get_text(&self, file_id: &str) -> Result<Option<TranscriptText>> {
        let file = self.metadata(file_id).await?;
        let kind = DocKind::classify(&file);
        tracing::debug!("Reading {} ({}) as {:?}", file.name, file.id, kind);

        match kind {
            DocKind::GoogleDoc => {
                let bytes = self.drive.export(&file.id, PLAIN_TEXT_MIME).await?;
                Ok(encoding::decode_chain(&bytes, &[Encoding::Utf8])
                    .map(|d| TranscriptText::decoded(d.text, d.encoding)))
            }
            DocKind::PlainText => {
                let bytes = self.drive.get_content(&file.id).await?;
                let decoded = encoding::decode_chain(&bytes, &[Encoding::Utf8]);
                if decoded.is_none() {
                    tracing::warn!("{} is not valid UTF-8", file.name);
                }
                Ok(decoded.map(|d| TranscriptText::decoded(d.text, d.encoding)))
            }
            DocKind::WordDocument => {
                let bytes = self.drive.get_content(&file.id).await?;
                self.read_document(&file, &bytes).await
            }
            DocKind::Other => {
                let bytes = self.drive.get_content(&file.id).await?;
                let artifact = TemporaryArtifact::create(
                    &self.config.scratch_dir(),
                    &file.id,
                    &kind.extension(&file.name),
                    &bytes,
                )?;
                let stored = artifact.read();
                artifact.close();

                let decoded = encoding::decode_chain(&stored?, &self.config.encodings);
                if decoded.is_none() {
                    tracing::warn!(
                        "No encoding in {:?} could decode {}",
                        self.config.encodings,
                        file.name
                    );
                }
                Ok(decoded.map(|d| TranscriptText::decoded(d.text, d.encoding)))
            }
        }
    }

    async fn read_document(&self, file: &FileRecord, bytes: &[u8]) -> Result<Option<TranscriptText>> {
        let artifact =
            TemporaryArtifact::create(&self.config.scratch_dir(), &file.id, "docx", bytes)?;
        let result = self.reader.read_text(artifact.path()).await;
        artifact.close();

        match result {
            Ok(text) => Ok(Some(TranscriptText {
                text,
                encoding: None,
                degraded: false,
            })),
            Err(ReaderError::Unavailable(reason)) => {
                tracing::warn!(
                    "{}; falling back to plain decoding of {}",
                    reason,
                    file.name
                );
                Ok(Some(TranscriptText {
                    text: encoding::decode_lossy(bytes),
                    encoding: None,
                    degraded: true,
                }))
            }
            Err(e) => {
                tracing::warn!("Could not read {}: {}", file.name, e);
                Ok(None)
            }
        }
    }

    /// Save a transcript locally and return where it was written.
    ///
    /// Native documents are exported as `.docx`. Without a destination the file
    /// lands in the download directory under its remote display name; when
    /// `destination` is an existing directory the display name is kept inside it.
    pub async fn download(&self, file_id: &str, destination: Option<&Path>) -> Result<PathBuf> {
        let file = self.metadata(file_id).await?;
        let kind = DocKind::classify(&file);

        let path = match destination {
            Some(dest) if is_dir(dest).await => dest.join(display_file_name(&file, kind)),
            Some(dest) => dest.to_path_buf(),
            None => self.config.download_dir.join(display_file_name(&file, kind)),
        };
        self.save(&file, kind, &path).await
    }

    /// Save a transcript under `<date>_<title>_transcript.<ext>` derived from `meeting`.
    pub async fn download_for_meeting(&self, file_id: &str, meeting: &MeetingDescriptor) -> Result<PathBuf> {
        let file = self.metadata(file_id).await?;
        let kind = DocKind::classify(&file);
        let path = self
            .config
            .download_dir
            .join(transcript_file_name(meeting, &kind.extension(&file.name)));
        self.save(&file, kind, &path).await
    }

    async fn save(&self, file: &FileRecord, kind: DocKind, path: &Path) -> Result<PathBuf> {
        let bytes = match kind {
            DocKind::GoogleDoc => self.drive.export(&file.id, DOCX_MIME).await?,
            _ => self.drive.get_content(&file.id).await?,
        };

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &bytes).await?;

        tracing::info!("Downloaded {} to {}", file.name, path.display());
        Ok(path.to_path_buf())
    }
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

/// Remote display name with path separators neutralized. Native documents get
/// a `.docx` extension since they are exported in that format.
fn display_file_name(file: &FileRecord, kind: DocKind) -> String {
    let name = file.name.replace(['/', '\\'], "_");
    let name = if name.trim().is_empty() {
        file.id.clone()
    } else {
        name
    };
    match kind {
        DocKind::GoogleDoc if !name.to_lowercase().ends_with(".docx") => format!("{}.docx", name),
        _ => name,
    }
}
