use std::path::PathBuf;

use crate::{JobId, PrerequisiteState, TweakField};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Host surface attached; run the startup probes.
    Initialize,
    /// User asked to build the website.
    StartClicked,
    /// Prerequisite probe answered (or failed to).
    PrerequisiteChecked(Result<PrerequisiteState, String>),
    /// Startup lookup of an already generated site. `None` when there is none.
    ExistingPreviewLoaded(Option<String>),
    /// Reply to the start-generation request.
    GenerationStarted(Result<StartReply, String>),
    /// Reply to one status poll.
    PollCompleted {
        job_id: JobId,
        result: Result<PollReply, String>,
    },
    /// Document retrieved after the job reported completion.
    DocumentRetrieved {
        job_id: JobId,
        result: Result<String, String>,
    },
    /// Preview surface finished (or failed) showing the last document.
    PreviewRendered(Result<(), String>),
    /// User edited one of the tweak boxes.
    TweakInputChanged { field: TweakField, value: String },
    /// User moved the color picker.
    ColorPickerChanged(String),
    /// User asked to apply the current tweaks.
    RegenerateClicked,
    /// Reply to the regenerate request.
    RegenerateFinished(Result<RegenerateReply, String>),
    DownloadClicked,
    DownloadFinished(DownloadResult),
    DeployClicked,
    ModalClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartStatus {
    Running,
    Error,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartReply {
    pub status: StartStatus,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    Completed,
    Error,
    /// Any non-terminal status the server reports (`running`, `idle`, ...).
    Pending(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollReply {
    pub status: PollStatus,
    pub message: Option<String>,
    pub step: Option<String>,
}

impl PollReply {
    pub fn new(status: PollStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            message: Some(message.into()),
            step: None,
        }
    }

    /// Text for the loading overlay: the message, else the step, else a placeholder.
    pub fn progress_text(&self) -> &str {
        [self.message.as_deref(), self.step.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
            .unwrap_or("Working...")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenerateReply {
    pub success: bool,
    pub html: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DownloadResult {
    Saved(PathBuf),
    NotGenerated,
    Failed(String),
}
