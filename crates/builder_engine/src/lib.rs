//! Builder engine: server calls, preview files and effect execution.
mod client;
mod download;
mod engine;
mod persist;
mod preview;
mod probe;
mod types;

pub use client::{
    ApiSettings, BuilderApi, ReqwestBuilderApi, DOWNLOAD_PATH, GENERATE_PATH, PREVIEW_PATH,
    PROGRESS_PATH, REGENERATE_PATH, STATUS_PATH,
};
pub use download::{DownloadError, DownloadExporter, DOWNLOAD_FILENAME};
pub use engine::{EngineConfig, EngineHandle};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use preview::{PreviewError, PreviewRenderer};
pub use probe::{looks_like_document, StatusProbe};
pub use types::{
    ApiError, EngineEvent, FailureKind, JobId, PollReply, PrerequisiteState, ProgressReply,
    RegenerateReply, StartReply, TweakPayload,
};
