use std::io::{self, BufRead, Write};
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use builder_core::{update, AppState, AppViewModel, Msg, TweakField};
use builder_logging::{builder_info, builder_warn};
use log::LevelFilter;

use super::config::{load_settings, Settings};
use super::effects::EffectRunner;
use super::ui;
use crate::cli::Cli;

/// Longest single wait on the engine before re-checking the deadline.
const EVENT_WAIT: Duration = Duration::from_millis(100);

pub fn run_app(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    builder_logging::initialize(settings.log, LevelFilter::Info);
    builder_info!("site-builder talking to {}", settings.api.base_url);

    let mut app = App::new(&settings, io::stdout())?;
    let view = app.run_session(&Session::from_cli(&cli))?;

    if cli.open {
        match app.runner.preview_path() {
            Some(path) => {
                open::that(path).with_context(|| format!("opening preview {:?}", path))?;
                println!("Preview opened in your browser. Press Enter to quit.");
                let mut line = String::new();
                io::stdin().lock().read_line(&mut line)?;
            }
            None => builder_warn!("--open given but no preview was rendered"),
        }
    }

    if view.status.is_error {
        bail!("{}", view.status.text);
    }
    Ok(())
}

/// User actions to perform, in order, after startup.
#[derive(Debug, Clone, Default)]
pub(crate) struct Session {
    pub build: bool,
    pub tweaks: Vec<(TweakField, String)>,
    pub download: bool,
}

impl Session {
    fn from_cli(cli: &Cli) -> Self {
        Self {
            build: cli.build,
            tweaks: cli.tweaks(),
            download: cli.download,
        }
    }
}

pub(crate) struct App<W: Write> {
    state: AppState,
    runner: EffectRunner,
    out: W,
    last_view: Option<AppViewModel>,
    session_timeout: Duration,
}

impl<W: Write> App<W> {
    pub(crate) fn new(settings: &Settings, out: W) -> Result<Self> {
        let runner = EffectRunner::new(settings.engine_config())?;
        Ok(Self {
            state: AppState::new().with_poll_interval(settings.poll_interval),
            runner,
            out,
            last_view: None,
            session_timeout: settings.session_timeout,
        })
    }

    pub(crate) fn run_session(&mut self, session: &Session) -> Result<AppViewModel> {
        self.dispatch(Msg::Initialize);
        self.settle()?;

        if session.build {
            self.dispatch(Msg::StartClicked);
            self.settle()?;
        }

        if !session.tweaks.is_empty() {
            for (field, value) in &session.tweaks {
                self.dispatch(Msg::TweakInputChanged {
                    field: *field,
                    value: value.clone(),
                });
            }
            self.dispatch(Msg::RegenerateClicked);
            self.settle()?;
        }

        if session.download {
            self.dispatch(Msg::DownloadClicked);
            self.settle()?;
        }

        Ok(self.state.view())
    }

    pub(crate) fn dispatch(&mut self, msg: Msg) {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let view = state.view();
        let was_dirty = state.consume_dirty();
        self.state = state;

        self.runner.enqueue(effects);
        if was_dirty {
            self.render(view);
        }
    }

    /// Feeds engine events back into the core until no request is outstanding.
    fn settle(&mut self) -> Result<()> {
        let deadline = Instant::now() + self.session_timeout;
        while self.runner.pending() > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                bail!(
                    "no answer from the builder server within {:?}",
                    self.session_timeout
                );
            }
            if let Some(msg) = self.runner.next_msg(remaining.min(EVENT_WAIT)) {
                self.dispatch(msg);
            }
        }
        Ok(())
    }

    fn render(&mut self, view: AppViewModel) {
        for line in ui::render::render(self.last_view.as_ref(), &view) {
            if let Err(err) = writeln!(self.out, "{line}") {
                builder_warn!("Could not write to terminal: {}", err);
                break;
            }
        }
        self.last_view = Some(view);
    }
}
