use std::time::Duration;

use crate::{JobId, TweakSet};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchExistingPreview,
    CheckPrerequisite,
    StartGeneration,
    /// Wait `delay`, then issue exactly one status poll for `job_id`.
    SchedulePoll { job_id: JobId, delay: Duration },
    /// Stop polling `job_id`. Safe to repeat.
    CancelPoll { job_id: JobId },
    FetchDocument { job_id: JobId },
    RenderPreview { html: String },
    Regenerate { tweaks: TweakSet },
    Download,
}

impl Effect {
    /// True for effects that put a request on the wire.
    pub fn is_network(&self) -> bool {
        !matches!(self, Effect::CancelPoll { .. } | Effect::RenderPreview { .. })
    }
}
