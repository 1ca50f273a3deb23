use std::path::PathBuf;

use builder_core::TweakField;
use clap::Parser;

#[derive(Debug, Parser, Clone, Default)]
#[command(
    name = "site-builder",
    version,
    about = "Generate, tweak and download a website from the builder server"
)]
pub struct Cli {
    /// Base URL of the builder server
    #[arg(long)]
    pub base_url: Option<String>,

    /// RON config file (default: ./site-builder.ron when present)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Delay between status polls in milliseconds
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Directory for the live preview file
    #[arg(long)]
    pub preview_dir: Option<PathBuf>,

    /// Directory the downloaded site is saved to
    #[arg(long)]
    pub download_dir: Option<PathBuf>,

    /// Log destination: file, terminal or both
    #[arg(long)]
    pub log: Option<String>,

    /// Open the rendered preview in the system browser
    #[arg(long)]
    pub open: bool,

    /// Start a generation run
    #[arg(long)]
    pub build: bool,

    /// New headline to apply after generation
    #[arg(long)]
    pub headline: Option<String>,

    /// New subheadline to apply after generation
    #[arg(long)]
    pub subheadline: Option<String>,

    /// New call-to-action text to apply after generation
    #[arg(long)]
    pub cta: Option<String>,

    /// New primary color, e.g. #1A2B3C
    #[arg(long)]
    pub color: Option<String>,

    /// Save the finished site as my-website.html
    #[arg(long)]
    pub download: bool,
}

impl Cli {
    /// Tweak inputs given on the command line, in input-box order.
    pub fn tweaks(&self) -> Vec<(TweakField, String)> {
        [
            (TweakField::Headline, &self.headline),
            (TweakField::Subheadline, &self.subheadline),
            (TweakField::Cta, &self.cta),
            (TweakField::Color, &self.color),
        ]
        .into_iter()
        .filter_map(|(field, value)| value.clone().map(|value| (field, value)))
        .collect()
    }
}
