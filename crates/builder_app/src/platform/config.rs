use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use builder_core::POLL_INTERVAL;
use builder_engine::{ApiSettings, EngineConfig};
use builder_logging::{builder_info, LogDestination};
use serde::Deserialize;

use crate::cli::Cli;

pub const CONFIG_FILENAME: &str = "site-builder.ron";

const PREVIEW_DIRNAME: &str = "site-builder-preview";
const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(600);

/// Optional settings file. Every field may be left out.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    base_url: Option<String>,
    poll_interval_ms: Option<u64>,
    request_timeout_secs: Option<u64>,
    session_timeout_secs: Option<u64>,
    preview_dir: Option<PathBuf>,
    download_dir: Option<PathBuf>,
    log: Option<String>,
}

/// Effective settings: command line over config file over defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub poll_interval: Duration,
    /// Upper bound on waiting for one user action to settle.
    pub session_timeout: Duration,
    pub preview_dir: PathBuf,
    pub download_dir: PathBuf,
    pub log: LogDestination,
}

impl Settings {
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            api: self.api.clone(),
            preview_dir: self.preview_dir.clone(),
            download_dir: self.download_dir.clone(),
        }
    }
}

pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let file = match &cli.config {
        Some(path) => match read_config(path)? {
            Some(file) => file,
            None => bail!("config file {:?} not found", path),
        },
        None => read_config(Path::new(CONFIG_FILENAME))?.unwrap_or_default(),
    };
    resolve(cli, file)
}

fn read_config(path: &Path) -> Result<Option<FileConfig>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("reading config file {:?}", path));
        }
    };
    let file: FileConfig =
        ron::from_str(&content).with_context(|| format!("parsing config file {:?}", path))?;
    builder_info!("Loaded settings from {:?}", path);
    Ok(Some(file))
}

fn resolve(cli: &Cli, file: FileConfig) -> Result<Settings> {
    let mut api = ApiSettings::default();
    if let Some(base_url) = cli.base_url.clone().or(file.base_url) {
        api.base_url = base_url;
    }
    if let Some(secs) = file.request_timeout_secs {
        api.request_timeout = Duration::from_secs(secs);
    }

    let poll_interval = cli
        .poll_interval_ms
        .or(file.poll_interval_ms)
        .map(Duration::from_millis)
        .unwrap_or(POLL_INTERVAL);

    let session_timeout = file
        .session_timeout_secs
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_SESSION_TIMEOUT);

    let preview_dir = cli
        .preview_dir
        .clone()
        .or(file.preview_dir)
        .unwrap_or_else(|| std::env::temp_dir().join(PREVIEW_DIRNAME));

    let download_dir = cli
        .download_dir
        .clone()
        .or(file.download_dir)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));

    let log = match cli.log.clone().or(file.log) {
        Some(name) => LogDestination::parse(&name)
            .with_context(|| format!("unknown log destination {:?}", name))?,
        None => LogDestination::File,
    };

    Ok(Settings {
        api,
        poll_interval,
        session_timeout,
        preview_dir,
        download_dir,
        log,
    })
}
