use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{DownloadError, PreviewError};

pub type JobId = u64;

/// Results reported by the engine worker, one per command (none for `CancelPoll`).
#[derive(Debug)]
pub enum EngineEvent {
    PrerequisiteChecked(Result<PrerequisiteState, ApiError>),
    ExistingPreview(Option<String>),
    GenerationStarted(Result<StartReply, ApiError>),
    PollCompleted {
        job_id: JobId,
        result: Result<PollReply, ApiError>,
    },
    DocumentFetched {
        job_id: JobId,
        result: Result<String, ApiError>,
    },
    Regenerated(Result<RegenerateReply, ApiError>),
    Downloaded(Result<PathBuf, DownloadError>),
    /// Path of the live preview file.
    PreviewRendered(Result<PathBuf, PreviewError>),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64 },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes } => {
                write!(f, "response larger than {max_bytes} bytes")
            }
            FailureKind::Decode => write!(f, "malformed response"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

/// `GET /api/router/progress`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProgressReply {
    #[serde(default)]
    pub complete: bool,
    #[serde(default)]
    pub current_question: u32,
    #[serde(default)]
    pub total_questions: u32,
}

/// Onboarding progress as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrerequisiteState {
    pub complete: bool,
    pub answered: u32,
    pub total: u32,
}

impl From<ProgressReply> for PrerequisiteState {
    fn from(reply: ProgressReply) -> Self {
        Self {
            complete: reply.complete,
            answered: reply.current_question,
            total: reply.total_questions,
        }
    }
}

/// `POST /api/builder/generate`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StartReply {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

impl StartReply {
    pub fn is_running(&self) -> bool {
        self.status == "running"
    }

    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

/// `GET /api/builder/status`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PollReply {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub step: Option<String>,
}

impl PollReply {
    pub fn is_completed(&self) -> bool {
        self.status == "completed"
    }

    pub fn is_error(&self) -> bool {
        self.status == "error"
    }
}

/// `POST /api/builder/regenerate`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegenerateReply {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

impl RegenerateReply {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Body of the `tweaks` object. Absent fields are not serialized.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TweakPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subheadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegenerateRequest<'a> {
    pub tweaks: &'a TweakPayload,
}
