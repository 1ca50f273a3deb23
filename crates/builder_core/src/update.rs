use builder_logging::{builder_debug, builder_info, builder_warn};

use crate::state::InitStage;
use crate::tweak::{is_hex_color, TweakField, TweakSet};
use crate::{
    AppState, DownloadResult, Effect, JobId, JobStatus, Msg, Phase, PollReply, PollStatus,
    PrerequisiteState, RegenerateReply, StartReply, StartStatus,
};

const GENERATE_FIRST: &str = "Generate the website first";

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::Initialize => initialize(&mut state),
        Msg::ExistingPreviewLoaded(document) => existing_preview_loaded(&mut state, document),
        Msg::PrerequisiteChecked(result) => prerequisite_checked(&mut state, result),
        Msg::StartClicked => start_clicked(&mut state),
        Msg::GenerationStarted(result) => generation_started(&mut state, result),
        Msg::PollCompleted { job_id, result } => poll_completed(&mut state, job_id, result),
        Msg::DocumentRetrieved { job_id, result } => {
            document_retrieved(&mut state, job_id, result)
        }
        Msg::PreviewRendered(result) => {
            match result {
                Ok(()) => {
                    state.overlays.hide_start();
                    state.preview.revision += 1;
                }
                Err(err) => state.set_status(format!("❌ Preview failed: {err}"), true),
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::TweakInputChanged { field, value } => {
            if field == TweakField::Color && is_hex_color(value.trim()) {
                state.color_picker = value.trim().to_string();
            }
            state.tweaks.set(field, value);
            state.mark_dirty();
            Vec::new()
        }
        Msg::ColorPickerChanged(value) => {
            state.tweaks.color = value.clone();
            state.color_picker = value;
            state.mark_dirty();
            Vec::new()
        }
        Msg::RegenerateClicked => regenerate_clicked(&mut state),
        Msg::RegenerateFinished(result) => regenerate_finished(&mut state, result),
        Msg::DownloadClicked => {
            state.mark_dirty();
            if state.preview.document.is_none() {
                state.set_status(GENERATE_FIRST, true);
                Vec::new()
            } else {
                state.set_status("Downloading website...", false);
                vec![Effect::Download]
            }
        }
        Msg::DownloadFinished(result) => {
            match result {
                DownloadResult::Saved(path) => {
                    state.set_status(format!("✅ Saved {}", path.display()), false)
                }
                DownloadResult::NotGenerated => state.set_status(GENERATE_FIRST, true),
                DownloadResult::Failed(err) => {
                    state.set_status(format!("Download failed: {err}"), true)
                }
            }
            state.mark_dirty();
            Vec::new()
        }
        Msg::DeployClicked => {
            state.modal_visible = true;
            state.mark_dirty();
            Vec::new()
        }
        Msg::ModalClosed => {
            state.modal_visible = false;
            state.mark_dirty();
            Vec::new()
        }
    };

    (state, effects)
}

fn initialize(state: &mut AppState) -> Vec<Effect> {
    if state.init != InitStage::Fresh {
        return Vec::new();
    }
    state.init = InitStage::LoadingPreview;
    state.set_status("Checking onboarding status...", false);
    state.mark_dirty();
    vec![Effect::FetchExistingPreview]
}

fn existing_preview_loaded(state: &mut AppState, document: Option<String>) -> Vec<Effect> {
    if state.init != InitStage::LoadingPreview {
        builder_debug!("Ignoring existing preview outside of startup");
        return Vec::new();
    }
    state.init = InitStage::CheckingPrerequisite;
    state.mark_dirty();

    let mut effects = Vec::with_capacity(2);
    if let Some(html) = document {
        builder_info!("Found existing preview ({} bytes)", html.len());
        state.phase = Phase::Completed;
        state.preview.document = Some(html.clone());
        effects.push(Effect::RenderPreview { html });
    }
    effects.push(Effect::CheckPrerequisite);
    effects
}

fn prerequisite_checked(
    state: &mut AppState,
    result: Result<PrerequisiteState, String>,
) -> Vec<Effect> {
    if state.init == InitStage::CheckingPrerequisite {
        state.init = InitStage::Ready;
        initial_prerequisite(state, result);
        state.mark_dirty();
        return Vec::new();
    }
    if state.phase != Phase::AwaitingPrerequisite {
        builder_debug!("Ignoring prerequisite answer in phase {:?}", state.phase);
        return Vec::new();
    }
    state.mark_dirty();

    match result {
        Ok(prerequisite) if prerequisite.complete => {
            state.prerequisite = Some(prerequisite);
            let job_id = state.begin_job();
            builder_info!("Prerequisite confirmed, starting job {}", job_id);
            state.phase = Phase::Starting;
            state.overlays.hide_start();
            state.overlays.show_loading("Starting website generation...");
            state.set_status("🔄 Generating your website...", false);
            vec![Effect::StartGeneration]
        }
        Ok(prerequisite) => {
            state.prerequisite = Some(prerequisite);
            abort_start(
                state,
                format!(
                    "❌ Please complete all {} onboarding questions first!",
                    prerequisite.total
                ),
            );
            Vec::new()
        }
        Err(err) => {
            builder_warn!("Prerequisite check failed: {}", err);
            state.prerequisite = None;
            abort_start(state, "❌ Unable to verify onboarding status");
            Vec::new()
        }
    }
}

fn initial_prerequisite(state: &mut AppState, result: Result<PrerequisiteState, String>) {
    let has_document = state.preview.document.is_some();
    match result {
        Ok(prerequisite) if prerequisite.complete => {
            state.prerequisite = Some(prerequisite);
            if !has_document {
                state.phase = Phase::Idle;
            }
            state.set_status(
                format!(
                    "✅ Onboarding complete! ({}/{} questions answered)",
                    prerequisite.answered, prerequisite.total
                ),
                false,
            );
        }
        Ok(prerequisite) => {
            state.prerequisite = Some(prerequisite);
            if !has_document {
                state.phase = Phase::Blocked;
            }
            state.set_status(
                format!(
                    "⚠️ Complete onboarding first ({}/{} questions)",
                    prerequisite.answered, prerequisite.total
                ),
                true,
            );
        }
        Err(err) => {
            builder_warn!("Status check error: {}", err);
            state.prerequisite = None;
            if !has_document {
                state.phase = Phase::Blocked;
            }
            state.set_status("Unable to check status", true);
        }
    }
    if !has_document {
        state.overlays.show_start();
    }
}

/// Returns from `AwaitingPrerequisite` without having sent a start request.
fn abort_start(state: &mut AppState, status: impl Into<String>) {
    state.overlays.hide_loading();
    if state.preview.document.is_some() {
        state.phase = Phase::Completed;
    } else {
        state.phase = Phase::Blocked;
        state.overlays.show_start();
    }
    state.set_status(status, true);
}

fn start_clicked(state: &mut AppState) -> Vec<Effect> {
    if state.init != InitStage::Ready {
        builder_debug!("Start ignored: startup checks still running");
        return Vec::new();
    }
    if state.is_generating() || state.regenerating {
        builder_debug!("Start ignored: already busy in phase {:?}", state.phase);
        return Vec::new();
    }
    state.phase = Phase::AwaitingPrerequisite;
    state.overlays.hide_start();
    state.overlays.show_loading("Checking onboarding status...");
    state.mark_dirty();
    vec![Effect::CheckPrerequisite]
}

fn generation_started(state: &mut AppState, result: Result<StartReply, String>) -> Vec<Effect> {
    if state.phase != Phase::Starting {
        builder_debug!("Ignoring start reply in phase {:?}", state.phase);
        return Vec::new();
    }
    let Some(job_id) = state.current_job_id() else {
        return Vec::new();
    };
    state.mark_dirty();

    match result {
        Ok(StartReply {
            status: StartStatus::Running,
            message,
        }) => {
            if let Some(job) = state.job_mut() {
                job.status = JobStatus::Running;
                job.message = message;
            }
            state.phase = Phase::Polling;
            vec![Effect::SchedulePoll {
                job_id,
                delay: state.poll_interval,
            }]
        }
        Ok(StartReply {
            status: StartStatus::Error,
            message,
        }) => {
            fail_job(state, format!("❌ {message}"));
            Vec::new()
        }
        Ok(StartReply {
            status: StartStatus::Other(status),
            ..
        }) => {
            builder_warn!("Unexpected start status {:?}", status);
            fail_job(state, "❌ Unexpected response from server");
            Vec::new()
        }
        Err(err) => {
            builder_warn!("Generation error: {}", err);
            fail_job(state, "❌ Failed to start generation");
            Vec::new()
        }
    }
}

/// Terminal failure for the current job. Leaves the start affordance usable.
///
/// A document still on screen keeps the controller in `Completed` so it can be tweaked.
fn fail_job(state: &mut AppState, status: impl Into<String>) {
    let status = status.into();
    if let Some(job) = state.job_mut() {
        job.status = JobStatus::Error;
        job.message = status.clone();
    }
    state.overlays.hide_loading();
    if state.preview.document.is_some() {
        state.phase = Phase::Completed;
    } else {
        state.phase = Phase::Failed;
        state.overlays.show_start();
    }
    state.set_status(status, true);
}

fn poll_completed(
    state: &mut AppState,
    job_id: JobId,
    result: Result<PollReply, String>,
) -> Vec<Effect> {
    if state.phase != Phase::Polling || state.current_job_id() != Some(job_id) {
        builder_debug!("Discarding late poll response for job {}", job_id);
        return Vec::new();
    }
    let delay = state.poll_interval;
    let Some(job) = state.job_mut() else {
        return Vec::new();
    };
    job.polls += 1;

    let reply = match result {
        Ok(reply) => reply,
        Err(err) => {
            builder_warn!("Poll {} for job {} failed: {}", job.polls, job_id, err);
            return vec![Effect::SchedulePoll { job_id, delay }];
        }
    };

    let progress = reply.progress_text().to_string();
    job.message = progress.clone();
    state.overlays.update_loading_message(progress);
    state.mark_dirty();

    match reply.status {
        PollStatus::Completed => {
            builder_info!("Job {} completed", job_id);
            if let Some(job) = state.job_mut() {
                job.status = JobStatus::Completed;
            }
            state.phase = Phase::Completed;
            state.overlays.hide_loading();
            vec![
                Effect::CancelPoll { job_id },
                Effect::FetchDocument { job_id },
            ]
        }
        PollStatus::Error => {
            builder_info!("Job {} failed", job_id);
            let message = reply.message.unwrap_or_else(|| "Generation failed".to_string());
            fail_job(state, format!("❌ {message}"));
            vec![Effect::CancelPoll { job_id }]
        }
        PollStatus::Pending(status) => {
            builder_debug!("Job {} still {}", job_id, status);
            vec![Effect::SchedulePoll { job_id, delay }]
        }
    }
}

fn document_retrieved(
    state: &mut AppState,
    job_id: JobId,
    result: Result<String, String>,
) -> Vec<Effect> {
    let is_current = state
        .job()
        .is_some_and(|job| job.id == job_id && job.status == JobStatus::Completed);
    if !is_current || state.phase != Phase::Completed {
        builder_debug!("Discarding document for job {}", job_id);
        return Vec::new();
    }
    state.mark_dirty();

    match result {
        Ok(html) => {
            if let Some(job) = state.job_mut() {
                job.result_document = Some(html.clone());
            }
            state.preview.document = Some(html.clone());
            state.set_status(
                "✅ Website generated successfully! Use tweaks to customize.",
                false,
            );
            vec![Effect::RenderPreview { html }]
        }
        Err(err) => {
            builder_warn!("Preview retrieval for job {} failed: {}", job_id, err);
            state.set_status("❌ Could not load the generated website", true);
            Vec::new()
        }
    }
}

fn regenerate_clicked(state: &mut AppState) -> Vec<Effect> {
    if state.regenerating {
        return Vec::new();
    }
    state.mark_dirty();
    if !state.can_regenerate() {
        state.set_status(GENERATE_FIRST, true);
        return Vec::new();
    }
    match TweakSet::from_input(&state.tweaks) {
        Ok(tweaks) => {
            state.regenerating = true;
            state.overlays.show_loading("Applying your changes...");
            state.set_status("🔄 Regenerating...", false);
            vec![Effect::Regenerate { tweaks }]
        }
        Err(err) => {
            state.set_status(err.to_string(), true);
            Vec::new()
        }
    }
}

fn regenerate_finished(
    state: &mut AppState,
    result: Result<RegenerateReply, String>,
) -> Vec<Effect> {
    if !state.regenerating {
        return Vec::new();
    }
    state.regenerating = false;
    state.overlays.hide_loading();
    state.mark_dirty();

    match result {
        Ok(RegenerateReply {
            success: true,
            html: Some(html),
            ..
        }) => {
            if let Some(job) = state.job_mut() {
                job.result_document = Some(html.clone());
            }
            state.preview.document = Some(html.clone());
            state.tweaks.clear_text();
            state.set_status("✅ Website updated with your changes!", false);
            vec![Effect::RenderPreview { html }]
        }
        Ok(reply) => {
            let message = reply.message.unwrap_or_else(|| "Update failed".to_string());
            state.set_status(format!("❌ {message}"), true);
            Vec::new()
        }
        Err(err) => {
            builder_warn!("Regenerate error: {}", err);
            state.set_status("❌ Failed to update website", true);
            Vec::new()
        }
    }
}
