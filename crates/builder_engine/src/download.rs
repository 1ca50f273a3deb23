use std::path::PathBuf;
use std::sync::Arc;

use builder_logging::{builder_info, builder_warn};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};
use crate::{ApiError, BuilderApi, FailureKind};

/// Name the exported site is saved under.
pub const DOWNLOAD_FILENAME: &str = "my-website.html";

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("generate the website first")]
    NotGenerated,
    #[error("download failed: {0}")]
    Api(#[from] ApiError),
    #[error("could not save download: {0}")]
    Persist(#[from] PersistError),
}

/// Fetches the finished site and saves it locally. One attempt per call.
#[derive(Clone)]
pub struct DownloadExporter {
    api: Arc<dyn BuilderApi>,
    dir: PathBuf,
}

impl DownloadExporter {
    pub fn new(api: Arc<dyn BuilderApi>, dir: PathBuf) -> Self {
        Self { api, dir }
    }

    pub fn target_path(&self) -> PathBuf {
        self.dir.join(DOWNLOAD_FILENAME)
    }

    pub async fn download(&self) -> Result<PathBuf, DownloadError> {
        let payload = match self.api.download().await {
            Ok(payload) => payload,
            Err(err) if matches!(err.kind, FailureKind::HttpStatus(_)) => {
                builder_info!("Nothing to download yet: {}", err);
                return Err(DownloadError::NotGenerated);
            }
            Err(err) => {
                builder_warn!("Download request failed: {}", err);
                return Err(err.into());
            }
        };

        let writer = AtomicFileWriter::new(self.dir.clone());
        let path = writer.write(DOWNLOAD_FILENAME, &payload)?;
        builder_info!("Saved {} bytes to {:?}", payload.len(), path);
        Ok(path)
    }
}
