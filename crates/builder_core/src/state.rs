use std::time::Duration;

use crate::overlay::Overlays;
use crate::tweak::TweakInput;
use crate::view_model::{AppViewModel, StatusLine};

pub type JobId = u64;

/// Fixed delay between the end of one status poll and the start of the next.
pub const POLL_INTERVAL: Duration = Duration::from_millis(2000);

/// Lifecycle of the generation controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Re-verifying the prerequisite before a start request.
    AwaitingPrerequisite,
    /// Start request sent, not yet acknowledged.
    Starting,
    Polling,
    Completed,
    Failed,
    /// Prerequisite not met (or unknown); generation is not offered.
    Blocked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Idle,
    Running,
    Completed,
    Error,
}

/// One generation attempt. Replaced when a new attempt starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub id: JobId,
    pub status: JobStatus,
    pub message: String,
    pub result_document: Option<String>,
    /// Poll attempts consumed for this job, failed ones included.
    pub polls: u32,
}

impl GenerationJob {
    fn new(id: JobId) -> Self {
        Self {
            id,
            status: JobStatus::Idle,
            message: String::new(),
            result_document: None,
            polls: 0,
        }
    }
}

/// Snapshot of the onboarding questionnaire progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PrerequisiteState {
    pub complete: bool,
    pub answered: u32,
    pub total: u32,
}

/// Startup sequence: existing preview first, then the prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum InitStage {
    #[default]
    Fresh,
    LoadingPreview,
    CheckingPrerequisite,
    Ready,
}

/// Document currently shown on the preview surface.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreviewState {
    pub document: Option<String>,
    /// Number of successful renders so far.
    pub revision: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub(crate) init: InitStage,
    pub(crate) phase: Phase,
    pub(crate) job: Option<GenerationJob>,
    pub(crate) next_job_id: JobId,
    pub(crate) prerequisite: Option<PrerequisiteState>,
    pub(crate) overlays: Overlays,
    pub(crate) preview: PreviewState,
    pub(crate) tweaks: TweakInput,
    pub(crate) color_picker: String,
    pub(crate) regenerating: bool,
    pub(crate) modal_visible: bool,
    pub(crate) status: StatusLine,
    pub(crate) poll_interval: Duration,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            init: InitStage::Fresh,
            phase: Phase::Idle,
            job: None,
            next_job_id: 1,
            prerequisite: None,
            overlays: Overlays::default(),
            preview: PreviewState::default(),
            tweaks: TweakInput::default(),
            color_picker: String::new(),
            regenerating: false,
            modal_visible: false,
            status: StatusLine::default(),
            poll_interval: POLL_INTERVAL,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            phase: self.phase,
            job_status: self.job.as_ref().map(|job| job.status),
            status: self.status.clone(),
            start_enabled: self.init == InitStage::Ready
                && !self.is_generating()
                && !self.regenerating
                && self.phase != Phase::Blocked
                && self.prerequisite.is_some_and(|p| p.complete),
            regenerate_enabled: self.can_regenerate() && !self.regenerating,
            is_generating: self.is_generating(),
            start_prompt_visible: self.overlays.start_visible(),
            loading: self.overlays.loading().map(ToOwned::to_owned),
            has_preview: self.preview.document.is_some(),
            preview_revision: self.preview.revision,
            tweaks: self.tweaks.clone(),
            color_picker: self.color_picker.clone(),
            modal_visible: self.modal_visible,
            dirty: self.dirty,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn job(&self) -> Option<&GenerationJob> {
        self.job.as_ref()
    }

    pub fn overlays(&self) -> &Overlays {
        &self.overlays
    }

    pub fn preview(&self) -> &PreviewState {
        &self.preview
    }

    pub fn prerequisite(&self) -> Option<PrerequisiteState> {
        self.prerequisite
    }

    /// Single-flight flag: a start lifecycle is between the prerequisite check and a terminal poll.
    pub fn is_generating(&self) -> bool {
        matches!(
            self.phase,
            Phase::AwaitingPrerequisite | Phase::Starting | Phase::Polling
        )
    }

    pub fn is_regenerating(&self) -> bool {
        self.regenerating
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn can_regenerate(&self) -> bool {
        self.phase == Phase::Completed && self.preview.document.is_some()
    }

    pub(crate) fn current_job_id(&self) -> Option<JobId> {
        self.job.as_ref().map(|job| job.id)
    }

    pub(crate) fn job_mut(&mut self) -> Option<&mut GenerationJob> {
        self.job.as_mut()
    }

    /// Discards the previous job and allocates a new one.
    pub(crate) fn begin_job(&mut self) -> JobId {
        let id = self.next_job_id;
        self.next_job_id += 1;
        self.job = Some(GenerationJob::new(id));
        id
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, is_error: bool) {
        self.status = StatusLine {
            text: text.into(),
            is_error,
        };
    }
}
