//! Filesystem download sink for native hosts.

use std::path::{Path, PathBuf};

use tile_core::{DownloadSink, EditorError, EditorResult};
use tracing::info;

use crate::error::RenderResult;

/// Writes downloads into a directory.
#[derive(Debug, Clone)]
pub struct FsDownloadSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl FsDownloadSink {
    /// Sink writing into `dir`, created on first download.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    /// Target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Files written so far, in order.
    #[must_use]
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    /// Write one file, keeping only the final component of `file_name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty or the write fails.
    pub fn write(&mut self, file_name: &str, bytes: &[u8]) -> RenderResult<PathBuf> {
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("invalid file name: {file_name:?}"),
                )
            })?;
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        std::fs::write(&path, bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "Wrote download");
        self.written.push(path.clone());
        Ok(path)
    }
}

impl DownloadSink for FsDownloadSink {
    fn download(&mut self, file_name: &str, _mime: &str, bytes: &[u8]) -> EditorResult<()> {
        self.write(file_name, bytes).map_err(EditorError::from)?;
        Ok(())
    }
}
