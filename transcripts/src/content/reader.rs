//! Structure-aware readers for word-processing documents.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;

#[derive(Debug, Error)]
pub enum ReaderError {
    /// The reader is not installed. Callers fall back to byte decoding.
    #[error("document reader unavailable: {0}")]
    Unavailable(String),

    #[error("document reader timed out after {0:?}")]
    Timeout(Duration),

    #[error("document reader failed: {0}")]
    Failed(String),
}

/// Extracts paragraph text from a document on disk.
#[async_trait]
pub trait DocumentReader: Send + Sync {
    async fn read_text(&self, path: &Path) -> Result<String, ReaderError>;
}

/// Runs `pandoc -f docx -t plain --wrap=none`.
#[derive(Debug, Clone)]
pub struct PandocReader {
    binary: PathBuf,
    timeout: Duration,
}

impl PandocReader {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl DocumentReader for PandocReader {
    async fn read_text(&self, path: &Path) -> Result<String, ReaderError> {
        let mut command = Command::new(&self.binary);
        command
            .arg("-f")
            .arg("docx")
            .arg("-t")
            .arg("plain")
            .arg("--wrap=none")
            .arg(path)
            .kill_on_drop(true);

        tracing::debug!("Reading {} with {}", path.display(), self.binary.display());

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .map_err(|_| ReaderError::Timeout(self.timeout))?
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    ReaderError::Unavailable(format!("{} not found", self.binary.display()))
                }
                _ => ReaderError::Failed(e.to_string()),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ReaderError::Failed(format!(
                "exit {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        let reader = PandocReader::new(
            "/nonexistent/definitely-not-pandoc",
            Duration::from_secs(5),
        );
        let result = reader.read_text(Path::new("whatever.docx")).await;
        assert!(matches!(result, Err(ReaderError::Unavailable(_))));
    }
}
