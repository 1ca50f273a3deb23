use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use builder_logging::{builder_debug, builder_info, builder_warn};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use crate::{
    ApiError, ApiSettings, BuilderApi, DownloadError, DownloadExporter, EngineEvent, JobId,
    PreviewRenderer, ReqwestBuilderApi, StatusProbe, TweakPayload,
};

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    pub preview_dir: PathBuf,
    pub download_dir: PathBuf,
}

enum EngineCommand {
    CheckPrerequisite,
    FetchExistingPreview,
    StartGeneration,
    SchedulePoll { job_id: JobId, delay: Duration },
    CancelPoll { job_id: JobId },
    FetchDocument { job_id: JobId },
    Regenerate(TweakPayload),
    Download,
    RenderPreview(String),
}

/// Runs server calls on a background tokio runtime and reports back as [`EngineEvent`]s.
///
/// Dropping the handle stops the worker, cancels pending polls and removes the live preview file.
pub struct EngineHandle {
    cmd_tx: Option<mpsc::Sender<EngineCommand>>,
    event_rx: mpsc::Receiver<EngineEvent>,
    worker: Option<thread::JoinHandle<()>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, ApiError> {
        let api = Arc::new(ReqwestBuilderApi::new(config.api)?);
        Ok(Self::with_api(api, config.preview_dir, config.download_dir))
    }

    pub fn with_api(api: Arc<dyn BuilderApi>, preview_dir: PathBuf, download_dir: PathBuf) -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        let worker = thread::spawn(move || {
            let runtime = Runtime::new().expect("tokio runtime");
            let mut worker = Worker {
                probe: StatusProbe::new(api.clone()),
                exporter: DownloadExporter::new(api.clone(), download_dir),
                renderer: PreviewRenderer::new(preview_dir),
                api,
                polls: HashMap::new(),
                event_tx,
            };
            while let Ok(command) = cmd_rx.recv() {
                worker.handle(&runtime, command);
            }
            worker.shutdown();
        });

        Self {
            cmd_tx: Some(cmd_tx),
            event_rx,
            worker: Some(worker),
        }
    }

    pub fn check_prerequisite(&self) {
        self.send(EngineCommand::CheckPrerequisite);
    }

    pub fn fetch_existing_preview(&self) {
        self.send(EngineCommand::FetchExistingPreview);
    }

    pub fn start_generation(&self) {
        self.send(EngineCommand::StartGeneration);
    }

    /// Waits `delay`, then polls once. Ignored if `job_id` was already cancelled.
    pub fn schedule_poll(&self, job_id: JobId, delay: Duration) {
        self.send(EngineCommand::SchedulePoll { job_id, delay });
    }

    /// Idempotent. Also suppresses a response already in flight.
    pub fn cancel_poll(&self, job_id: JobId) {
        self.send(EngineCommand::CancelPoll { job_id });
    }

    pub fn fetch_document(&self, job_id: JobId) {
        self.send(EngineCommand::FetchDocument { job_id });
    }

    pub fn regenerate(&self, tweaks: TweakPayload) {
        self.send(EngineCommand::Regenerate(tweaks));
    }

    pub fn download(&self) {
        self.send(EngineCommand::Download);
    }

    pub fn render_preview(&self, html: impl Into<String>) {
        self.send(EngineCommand::RenderPreview(html.into()));
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        if let Some(tx) = &self.cmd_tx {
            let _ = tx.send(command);
        }
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        self.cmd_tx.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

struct Worker {
    api: Arc<dyn BuilderApi>,
    probe: StatusProbe,
    exporter: DownloadExporter,
    renderer: PreviewRenderer,
    polls: HashMap<JobId, CancellationToken>,
    event_tx: mpsc::Sender<EngineEvent>,
}

impl Worker {
    fn handle(&mut self, runtime: &Runtime, command: EngineCommand) {
        let tx = self.event_tx.clone();
        match command {
            EngineCommand::CheckPrerequisite => {
                let probe = self.probe.clone();
                runtime.spawn(async move {
                    let result = probe.check_prerequisite().await;
                    let _ = tx.send(EngineEvent::PrerequisiteChecked(result));
                });
            }
            EngineCommand::FetchExistingPreview => {
                let probe = self.probe.clone();
                runtime.spawn(async move {
                    let document = probe.check_for_existing_preview().await;
                    let _ = tx.send(EngineEvent::ExistingPreview(document));
                });
            }
            EngineCommand::StartGeneration => {
                let api = self.api.clone();
                runtime.spawn(async move {
                    let result = api.generate().await;
                    let _ = tx.send(EngineEvent::GenerationStarted(result));
                });
            }
            EngineCommand::SchedulePoll { job_id, delay } => {
                self.schedule_poll(runtime, job_id, delay);
            }
            EngineCommand::CancelPoll { job_id } => {
                if let Some(token) = self.polls.get(&job_id) {
                    builder_debug!("Cancelling poll loop for job {}", job_id);
                    token.cancel();
                }
            }
            EngineCommand::FetchDocument { job_id } => {
                let api = self.api.clone();
                runtime.spawn(async move {
                    let result = api.preview().await;
                    let _ = tx.send(EngineEvent::DocumentFetched { job_id, result });
                });
            }
            EngineCommand::Regenerate(tweaks) => {
                let api = self.api.clone();
                runtime.spawn(async move {
                    let result = api.regenerate(&tweaks).await;
                    let _ = tx.send(EngineEvent::Regenerated(result));
                });
            }
            EngineCommand::Download => {
                let exporter = self.exporter.clone();
                runtime.spawn(async move {
                    let result: Result<PathBuf, DownloadError> = exporter.download().await;
                    let _ = tx.send(EngineEvent::Downloaded(result));
                });
            }
            EngineCommand::RenderPreview(html) => {
                let result = self.renderer.render(&html);
                let _ = tx.send(EngineEvent::PreviewRendered(result));
            }
        }
    }

    fn schedule_poll(&mut self, runtime: &Runtime, job_id: JobId, delay: Duration) {
        // Only one job lifecycle at a time: older loops are torn down.
        self.polls.retain(|id, token| {
            if *id != job_id {
                token.cancel();
                false
            } else {
                true
            }
        });
        let token = self.polls.entry(job_id).or_default().clone();
        if token.is_cancelled() {
            builder_debug!("Poll for job {} not scheduled: loop already cancelled", job_id);
            return;
        }

        let api = self.api.clone();
        let tx = self.event_tx.clone();
        runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {
                    builder_debug!("Poll for job {} cancelled", job_id);
                }
                result = async {
                    tokio::time::sleep(delay).await;
                    api.status().await
                } => {
                    if token.is_cancelled() {
                        builder_debug!("Dropping poll response for cancelled job {}", job_id);
                        return;
                    }
                    if let Err(err) = &result {
                        builder_warn!("Poll error for job {}: {}", job_id, err);
                    }
                    let _ = tx.send(EngineEvent::PollCompleted { job_id, result });
                }
            }
        });
    }

    fn shutdown(&mut self) {
        for token in self.polls.values() {
            token.cancel();
        }
        self.renderer.release();
        builder_info!("Engine stopped after {} preview renders", self.renderer.issued());
    }
}
