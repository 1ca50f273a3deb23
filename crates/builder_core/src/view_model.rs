use crate::{JobStatus, Phase, TweakInput};

/// Status banner under the build button.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub phase: Phase,
    pub job_status: Option<JobStatus>,
    pub status: StatusLine,
    pub start_enabled: bool,
    pub regenerate_enabled: bool,
    pub is_generating: bool,
    pub start_prompt_visible: bool,
    /// Loading overlay message while it is shown.
    pub loading: Option<String>,
    pub has_preview: bool,
    pub preview_revision: u64,
    pub tweaks: TweakInput,
    pub color_picker: String,
    pub modal_visible: bool,
    pub dirty: bool,
}
