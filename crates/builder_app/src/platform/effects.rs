use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use builder_core::{
    DownloadResult, Effect, Msg, PollReply, PollStatus, PrerequisiteState, RegenerateReply,
    StartReply, StartStatus, TweakSet,
};
use builder_engine::{DownloadError, EngineConfig, EngineEvent, EngineHandle, TweakPayload};
use builder_logging::{builder_debug, builder_warn};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
    /// Commands sent whose event has not arrived yet.
    pending: usize,
    preview_path: Option<PathBuf>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let engine = EngineHandle::new(config).context("setting up the builder client")?;
        Ok(Self::with_engine(engine))
    }

    pub fn with_engine(engine: EngineHandle) -> Self {
        Self {
            engine,
            pending: 0,
            preview_path: None,
        }
    }

    pub fn pending(&self) -> usize {
        self.pending
    }

    /// File currently showing the preview, if one was rendered.
    pub fn preview_path(&self) -> Option<&Path> {
        self.preview_path.as_deref()
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            if effect.is_network() {
                builder_debug!("Request {:?}", effect);
            }
            match effect {
                Effect::FetchExistingPreview => self.engine.fetch_existing_preview(),
                Effect::CheckPrerequisite => self.engine.check_prerequisite(),
                Effect::StartGeneration => self.engine.start_generation(),
                Effect::SchedulePoll { job_id, delay } => self.engine.schedule_poll(job_id, delay),
                Effect::CancelPoll { job_id } => {
                    self.engine.cancel_poll(job_id);
                    // Answered by silence.
                    continue;
                }
                Effect::FetchDocument { job_id } => self.engine.fetch_document(job_id),
                Effect::RenderPreview { html } => {
                    builder_debug!("Rendering preview ({} bytes)", html.len());
                    self.engine.render_preview(html);
                }
                Effect::Regenerate { tweaks } => self.engine.regenerate(to_payload(tweaks)),
                Effect::Download => self.engine.download(),
            }
            self.pending += 1;
        }
    }

    /// Waits up to `timeout` for the next engine event.
    pub fn next_msg(&mut self, timeout: Duration) -> Option<Msg> {
        let event = self.engine.recv_timeout(timeout)?;
        self.pending = self.pending.saturating_sub(1);
        Some(self.map_event(event))
    }

    fn map_event(&mut self, event: EngineEvent) -> Msg {
        match event {
            EngineEvent::PrerequisiteChecked(result) => Msg::PrerequisiteChecked(
                result
                    .map(|state| PrerequisiteState {
                        complete: state.complete,
                        answered: state.answered,
                        total: state.total,
                    })
                    .map_err(|err| err.to_string()),
            ),
            EngineEvent::ExistingPreview(document) => Msg::ExistingPreviewLoaded(document),
            EngineEvent::GenerationStarted(result) => Msg::GenerationStarted(
                result.map(to_start_reply).map_err(|err| err.to_string()),
            ),
            EngineEvent::PollCompleted { job_id, result } => Msg::PollCompleted {
                job_id,
                result: result.map(to_poll_reply).map_err(|err| err.to_string()),
            },
            EngineEvent::DocumentFetched { job_id, result } => Msg::DocumentRetrieved {
                job_id,
                result: result.map_err(|err| err.to_string()),
            },
            EngineEvent::Regenerated(result) => Msg::RegenerateFinished(
                result
                    .map(|reply| RegenerateReply {
                        success: reply.is_success(),
                        html: reply.html,
                        message: reply.message,
                    })
                    .map_err(|err| err.to_string()),
            ),
            EngineEvent::Downloaded(result) => Msg::DownloadFinished(to_download_result(result)),
            EngineEvent::PreviewRendered(Ok(path)) => {
                self.preview_path = Some(path);
                Msg::PreviewRendered(Ok(()))
            }
            EngineEvent::PreviewRendered(Err(err)) => {
                builder_warn!("Preview render failed: {}", err);
                Msg::PreviewRendered(Err(err.to_string()))
            }
        }
    }
}

fn to_payload(tweaks: TweakSet) -> TweakPayload {
    TweakPayload {
        headline: tweaks.headline,
        subheadline: tweaks.subheadline,
        cta: tweaks.cta,
        color: tweaks.color,
    }
}

fn to_start_reply(reply: builder_engine::StartReply) -> StartReply {
    let status = if reply.is_running() {
        StartStatus::Running
    } else if reply.is_error() {
        StartStatus::Error
    } else {
        StartStatus::Other(reply.status.clone())
    };
    StartReply {
        status,
        message: reply.message,
    }
}

fn to_poll_reply(reply: builder_engine::PollReply) -> PollReply {
    let status = if reply.is_completed() {
        PollStatus::Completed
    } else if reply.is_error() {
        PollStatus::Error
    } else {
        PollStatus::Pending(reply.status.clone())
    };
    PollReply {
        status,
        message: reply.message,
        step: reply.step,
    }
}

fn to_download_result(result: Result<PathBuf, DownloadError>) -> DownloadResult {
    match result {
        Ok(path) => DownloadResult::Saved(path),
        Err(DownloadError::NotGenerated) => DownloadResult::NotGenerated,
        Err(err) => DownloadResult::Failed(err.to_string()),
    }
}
