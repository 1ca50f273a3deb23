//! Builder core: pure generation state machine and view-model helpers.
//!
//! Everything here is driven by plain [`Msg`] values through [`update`]; IO is
//! requested by returning [`Effect`]s and answered with further messages.
mod effect;
mod msg;
mod overlay;
mod state;
mod tweak;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::{
    DownloadResult, Msg, PollReply, PollStatus, RegenerateReply, StartReply, StartStatus,
};
pub use overlay::{LoadingOverlay, Overlays, StartPrompt};
pub use state::{
    AppState, GenerationJob, JobId, JobStatus, Phase, PrerequisiteState, PreviewState,
    POLL_INTERVAL,
};
pub use tweak::{is_hex_color, TweakError, TweakField, TweakInput, TweakSet};
pub use update::update;
pub use view_model::{AppViewModel, StatusLine};
