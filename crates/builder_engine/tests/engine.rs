use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use builder_engine::{
    ApiError, BuilderApi, EngineEvent, EngineHandle, PollReply, ProgressReply, RegenerateReply,
    StartReply, TweakPayload,
};
use bytes::Bytes;
use tempfile::TempDir;

const WAIT: Duration = Duration::from_secs(2);
const QUIET: Duration = Duration::from_millis(500);

/// In-memory server: answers status polls from a script, counts calls.
#[derive(Default)]
struct ScriptedApi {
    statuses: Mutex<VecDeque<&'static str>>,
    status_delay: Duration,
    status_calls: AtomicUsize,
    generate_calls: AtomicUsize,
}

impl ScriptedApi {
    fn with_statuses(statuses: &[&'static str]) -> Self {
        Self {
            statuses: Mutex::new(statuses.iter().copied().collect()),
            ..Self::default()
        }
    }
}

#[async_trait::async_trait]
impl BuilderApi for ScriptedApi {
    async fn progress(&self) -> Result<ProgressReply, ApiError> {
        Ok(ProgressReply {
            complete: true,
            current_question: 10,
            total_questions: 10,
        })
    }

    async fn preview(&self) -> Result<String, ApiError> {
        Ok("<!DOCTYPE html><p>done</p>".to_string())
    }

    async fn generate(&self) -> Result<StartReply, ApiError> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        Ok(StartReply {
            status: "running".to_string(),
            message: "Started".to_string(),
        })
    }

    async fn status(&self) -> Result<PollReply, ApiError> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.status_delay).await;
        let status = self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or("running");
        Ok(PollReply {
            status: status.to_string(),
            message: Some(format!("{status}...")),
            step: None,
        })
    }

    async fn regenerate(&self, tweaks: &TweakPayload) -> Result<RegenerateReply, ApiError> {
        Ok(RegenerateReply {
            status: "success".to_string(),
            message: None,
            html: tweaks.headline.clone(),
        })
    }

    async fn download(&self) -> Result<Bytes, ApiError> {
        Ok(Bytes::from_static(b"<!DOCTYPE html>"))
    }
}

fn engine_with(api: Arc<ScriptedApi>, temp: &TempDir) -> EngineHandle {
    EngineHandle::with_api(
        api,
        temp.path().join("preview"),
        temp.path().join("downloads"),
    )
}

fn expect_poll(engine: &EngineHandle) -> (u64, String) {
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::PollCompleted { job_id, result }) => (job_id, result.unwrap().status),
        other => panic!("expected poll result, got {other:?}"),
    }
}

#[test]
fn each_scheduled_poll_issues_one_request() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(ScriptedApi::with_statuses(&["running", "completed"]));
    let engine = engine_with(api.clone(), &temp);

    engine.schedule_poll(1, Duration::from_millis(5));
    assert_eq!(expect_poll(&engine), (1, "running".to_string()));
    engine.schedule_poll(1, Duration::from_millis(5));
    assert_eq!(expect_poll(&engine), (1, "completed".to_string()));

    assert!(engine.recv_timeout(QUIET).is_none());
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn cancelled_poll_is_never_sent_and_cancel_is_idempotent() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(ScriptedApi::default());
    let engine = engine_with(api.clone(), &temp);

    engine.schedule_poll(1, Duration::from_millis(300));
    engine.cancel_poll(1);
    engine.cancel_poll(1);
    engine.schedule_poll(1, Duration::ZERO);

    assert!(engine.recv_timeout(QUIET).is_none());
    assert!(engine.try_recv().is_none());
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn response_in_flight_is_dropped_after_cancel() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(ScriptedApi {
        status_delay: Duration::from_millis(300),
        ..ScriptedApi::with_statuses(&["completed"])
    });
    let engine = engine_with(api.clone(), &temp);

    engine.schedule_poll(1, Duration::ZERO);
    std::thread::sleep(Duration::from_millis(100));
    engine.cancel_poll(1);

    assert!(engine.recv_timeout(QUIET).is_none());
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn scheduling_a_new_job_tears_down_the_old_loop() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(ScriptedApi::default());
    let engine = engine_with(api.clone(), &temp);

    engine.schedule_poll(1, Duration::from_millis(300));
    engine.schedule_poll(2, Duration::ZERO);

    assert_eq!(expect_poll(&engine).0, 2);
    assert!(engine.recv_timeout(QUIET).is_none());
    assert_eq!(api.status_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn start_generation_reports_reply() {
    let temp = TempDir::new().unwrap();
    let api = Arc::new(ScriptedApi::default());
    let engine = engine_with(api.clone(), &temp);

    engine.start_generation();
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::GenerationStarted(Ok(reply))) => assert!(reply.is_running()),
        other => panic!("unexpected event {other:?}"),
    }
    assert_eq!(api.generate_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn renders_replace_previous_preview_and_drop_cleans_up() {
    let temp = TempDir::new().unwrap();
    let engine = engine_with(Arc::new(ScriptedApi::default()), &temp);

    let mut paths = Vec::new();
    for n in 0..3 {
        engine.render_preview(format!("<!DOCTYPE html><p>{n}</p>"));
        match engine.recv_timeout(WAIT) {
            Some(EngineEvent::PreviewRendered(Ok(path))) => paths.push(path),
            other => panic!("unexpected event {other:?}"),
        }
    }

    assert!(!paths[0].exists());
    assert!(!paths[1].exists());
    assert!(paths[2].exists());

    drop(engine);
    assert!(!paths[2].exists());
}

#[test]
fn download_goes_through_exporter() {
    let temp = TempDir::new().unwrap();
    let engine = engine_with(Arc::new(ScriptedApi::default()), &temp);

    engine.download();
    match engine.recv_timeout(WAIT) {
        Some(EngineEvent::Downloaded(Ok(path))) => {
            assert_eq!(path, temp.path().join("downloads").join("my-website.html"));
            assert!(path.exists());
        }
        other => panic!("unexpected event {other:?}"),
    }
}
