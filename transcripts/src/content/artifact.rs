//! Scoped temporary copies of remote files.

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::naming::sanitize_file_name;

/// A local copy of downloaded bytes, deleted when closed or dropped.
#[derive(Debug)]
pub struct TemporaryArtifact {
    file: Option<NamedTempFile>,
}

impl TemporaryArtifact {
    /// Write `bytes` to a fresh file in `scratch_dir`.
    ///
    /// The name is unique per call even for the same `file_id`.
    pub fn create(scratch_dir: &Path, file_id: &str, extension: &str, bytes: &[u8]) -> Result<Self> {
        std::fs::create_dir_all(scratch_dir)?;

        let prefix = format!("transcript-{}-", sanitize_file_name(file_id));
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        let mut file = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(scratch_dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        tracing::debug!("Created temporary artifact {}", file.path().display());
        Ok(Self { file: Some(file) })
    }

    pub fn path(&self) -> &Path {
        match &self.file {
            Some(file) => file.path(),
            None => Path::new(""),
        }
    }

    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.path())?)
    }

    /// Delete the file now. Failures are logged, not returned.
    pub fn close(mut self) {
        self.remove();
    }

    fn remove(&mut self) {
        if let Some(file) = self.file.take() {
            let path = file.path().to_path_buf();
            if let Err(e) = file.close() {
                tracing::warn!("Failed to remove temporary artifact {}: {}", path.display(), e);
            }
        }
    }
}

impl Drop for TemporaryArtifact {
    fn drop(&mut self) {
        self.remove();
    }
}
