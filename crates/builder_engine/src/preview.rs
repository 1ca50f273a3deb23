use std::io::{self, Write};
use std::path::{Path, PathBuf};

use builder_logging::{builder_debug, builder_warn};
use tempfile::TempPath;
use thiserror::Error;

use crate::persist::{ensure_output_dir, PersistError};

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("preview directory: {0}")]
    Persist(#[from] PersistError),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

/// Shows documents as standalone files in a dedicated directory.
///
/// Each render gets a fresh `preview-*.html` file; the previous one is deleted as soon
/// as its replacement exists, so at most one preview file is live per renderer.
/// Dropping the renderer deletes the last one.
#[derive(Debug)]
pub struct PreviewRenderer {
    dir: PathBuf,
    current: Option<TempPath>,
    issued: u64,
}

impl PreviewRenderer {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            current: None,
            issued: 0,
        }
    }

    pub fn render(&mut self, html: &str) -> Result<PathBuf, PreviewError> {
        ensure_output_dir(&self.dir)?;
        let mut file = tempfile::Builder::new()
            .prefix("preview-")
            .suffix(".html")
            .tempfile_in(&self.dir)?;
        file.write_all(html.as_bytes())?;
        file.flush()?;

        let handle = file.into_temp_path();
        let path = handle.to_path_buf();
        self.issued += 1;
        if let Some(previous) = self.current.replace(handle) {
            let previous_path = previous.to_path_buf();
            if let Err(err) = previous.close() {
                builder_warn!("Could not remove old preview {:?}: {}", previous_path, err);
            }
        }
        builder_debug!("Preview #{} written to {:?}", self.issued, path);
        Ok(path)
    }

    pub fn current_path(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Number of preview files currently owned (0 or 1).
    pub fn live_handles(&self) -> usize {
        usize::from(self.current.is_some())
    }

    /// Total renders since construction.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    pub fn release(&mut self) {
        if let Some(handle) = self.current.take() {
            if let Err(err) = handle.close() {
                builder_warn!("Could not remove preview: {}", err);
            }
        }
    }
}
