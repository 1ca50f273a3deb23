use std::path::PathBuf;
use std::sync::Once;

use builder_core::{
    update, AppState, DownloadResult, Effect, JobStatus, Msg, Phase, PollReply, PollStatus,
    PrerequisiteState, RegenerateReply, StartReply, StartStatus, TweakField, TweakSet,
};
use pretty_assertions::assert_eq;

const PAGE: &str = "<!DOCTYPE html><html><body>v1</body></html>";
const UPDATED: &str = "<!DOCTYPE html><html><body>v2</body></html>";

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(builder_logging::initialize_for_tests);
}

fn complete() -> PrerequisiteState {
    PrerequisiteState {
        complete: true,
        answered: 10,
        total: 10,
    }
}

fn state_with_preview() -> AppState {
    let (state, _) = update(AppState::new(), Msg::Initialize);
    let (state, _) = update(state, Msg::ExistingPreviewLoaded(Some(PAGE.to_string())));
    let (state, _) = update(state, Msg::PreviewRendered(Ok(())));
    let (state, _) = update(state, Msg::PrerequisiteChecked(Ok(complete())));
    state
}

fn state_without_preview() -> AppState {
    let (state, _) = update(AppState::new(), Msg::Initialize);
    let (state, _) = update(state, Msg::ExistingPreviewLoaded(None));
    let (state, _) = update(state, Msg::PrerequisiteChecked(Ok(complete())));
    state
}

fn type_into(state: AppState, field: TweakField, value: &str) -> AppState {
    let (state, _) = update(
        state,
        Msg::TweakInputChanged {
            field,
            value: value.to_string(),
        },
    );
    state
}

#[test]
fn empty_tweaks_never_reach_the_network() {
    init_logging();
    let state = type_into(state_with_preview(), TweakField::Headline, "   ");
    let (state, effects) = update(state, Msg::RegenerateClicked);

    assert!(effects.is_empty());
    let view = state.view();
    assert!(view.status.is_error);
    assert_eq!(
        view.status.text,
        "Enter at least one change (headline, subheadline, CTA, or color)"
    );
    assert_eq!(view.loading, None);
    assert!(!state.is_regenerating());
}

#[test]
fn invalid_color_is_excluded_from_the_patch() {
    init_logging();
    let state = type_into(state_with_preview(), TweakField::Headline, "Hi");
    let state = type_into(state, TweakField::Color, "red");
    let (state, effects) = update(state, Msg::RegenerateClicked);

    assert_eq!(
        effects,
        vec![Effect::Regenerate {
            tweaks: TweakSet {
                headline: Some("Hi".to_string()),
                subheadline: None,
                cta: None,
                color: None,
            }
        }]
    );
    assert_eq!(state.view().loading.as_deref(), Some("Applying your changes..."));
    assert_eq!(state.view().status.text, "🔄 Regenerating...");
    assert!(!state.view().regenerate_enabled);
}

#[test]
fn lone_invalid_color_is_rejected_locally() {
    init_logging();
    let state = type_into(state_with_preview(), TweakField::Color, "#12");
    let (state, effects) = update(state, Msg::RegenerateClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().status.text, "Color must be a hex value like #1A2B3C");
}

#[test]
fn regenerate_requires_a_completed_site() {
    init_logging();
    let state = type_into(state_without_preview(), TweakField::Headline, "Hi");
    let (state, effects) = update(state, Msg::RegenerateClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().status.text, "Generate the website first");
}

#[test]
fn successful_regenerate_renders_and_clears_text_inputs() {
    init_logging();
    let state = type_into(state_with_preview(), TweakField::Headline, "New headline");
    let state = type_into(state, TweakField::Cta, "Book a call");
    let state = type_into(state, TweakField::Color, "#336699");
    let (state, _) = update(state, Msg::RegenerateClicked);

    // Double click while in flight is swallowed.
    let (state, effects) = update(state, Msg::RegenerateClicked);
    assert!(effects.is_empty());

    let (state, effects) = update(
        state,
        Msg::RegenerateFinished(Ok(RegenerateReply {
            success: true,
            html: Some(UPDATED.to_string()),
            message: Some("Regenerated!".to_string()),
        })),
    );
    assert_eq!(
        effects,
        vec![Effect::RenderPreview {
            html: UPDATED.to_string()
        }]
    );

    let view = state.view();
    assert_eq!(view.phase, Phase::Completed);
    assert_eq!(view.status.text, "✅ Website updated with your changes!");
    assert_eq!(view.loading, None);
    assert_eq!(view.tweaks.headline, "");
    assert_eq!(view.tweaks.cta, "");
    assert_eq!(view.tweaks.color, "#336699");
    assert_eq!(state.preview().document.as_deref(), Some(UPDATED));
}

#[test]
fn failed_regenerate_keeps_completed_classification() {
    init_logging();
    let state = type_into(state_with_preview(), TweakField::Subheadline, "Faster");
    let (state, _) = update(state, Msg::RegenerateClicked);
    let (state, effects) = update(
        state,
        Msg::RegenerateFinished(Ok(RegenerateReply {
            success: false,
            html: None,
            message: Some("Generate website first".to_string()),
        })),
    );

    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.phase, Phase::Completed);
    assert_eq!(view.status.text, "❌ Generate website first");
    assert_eq!(view.tweaks.subheadline, "Faster");
    assert_eq!(state.preview().document.as_deref(), Some(PAGE));
    assert!(view.regenerate_enabled);

    let (state, _) = update(state, Msg::RegenerateClicked);
    let (state, _) = update(
        state,
        Msg::RegenerateFinished(Err("timeout".to_string())),
    );
    assert_eq!(state.phase(), Phase::Completed);
    assert_eq!(state.view().status.text, "❌ Failed to update website");
}

#[test]
fn success_without_html_is_treated_as_failure() {
    init_logging();
    let state = type_into(state_with_preview(), TweakField::Headline, "x");
    let (state, _) = update(state, Msg::RegenerateClicked);
    let (state, effects) = update(
        state,
        Msg::RegenerateFinished(Ok(RegenerateReply {
            success: true,
            html: None,
            message: None,
        })),
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().status.text, "❌ Update failed");
}

#[test]
fn start_is_ignored_while_regenerating() {
    init_logging();
    let state = type_into(state_with_preview(), TweakField::Headline, "x");
    let (state, _) = update(state, Msg::RegenerateClicked);
    assert!(!state.view().start_enabled);
    let (state, effects) = update(state, Msg::StartClicked);

    assert!(effects.is_empty());
    assert_eq!(state.phase(), Phase::Completed);

    let (state, _) = update(
        state,
        Msg::RegenerateFinished(Ok(RegenerateReply {
            success: true,
            html: Some(UPDATED.to_string()),
            message: None,
        })),
    );
    assert!(state.view().start_enabled);
}

#[test]
fn failed_rebuild_keeps_preview_tweakable() {
    init_logging();
    let (state, _) = update(state_with_preview(), Msg::StartClicked);
    let (state, _) = update(state, Msg::PrerequisiteChecked(Ok(complete())));
    let (state, _) = update(
        state,
        Msg::GenerationStarted(Ok(StartReply {
            status: StartStatus::Error,
            message: "busy".to_string(),
        })),
    );

    let view = state.view();
    assert_eq!(view.phase, Phase::Completed);
    assert_eq!(view.job_status, Some(JobStatus::Error));
    assert_eq!(view.status.text, "❌ busy");
    assert!(view.regenerate_enabled);
    assert!(!view.start_prompt_visible);

    let state = type_into(state, TweakField::Headline, "Hi");
    let (_, effects) = update(state, Msg::RegenerateClicked);
    assert_eq!(
        effects,
        vec![Effect::Regenerate {
            tweaks: TweakSet {
                headline: Some("Hi".to_string()),
                subheadline: None,
                cta: None,
                color: None,
            },
        }]
    );
}

#[test]
fn failed_poll_after_preview_returns_to_completed() {
    init_logging();
    let (state, _) = update(state_with_preview(), Msg::StartClicked);
    let (state, _) = update(state, Msg::PrerequisiteChecked(Ok(complete())));
    let (state, _) = update(
        state,
        Msg::GenerationStarted(Ok(StartReply {
            status: StartStatus::Running,
            message: "Started".to_string(),
        })),
    );
    assert_eq!(state.phase(), Phase::Polling);
    let (state, _) = update(
        state,
        Msg::PollCompleted {
            job_id: 1,
            result: Ok(PollReply::new(PollStatus::Error, "Model unavailable")),
        },
    );

    assert_eq!(state.phase(), Phase::Completed);
    assert!(state.view().regenerate_enabled);
}

#[test]
fn download_without_preview_asks_to_generate_first() {
    init_logging();
    let (state, effects) = update(state_without_preview(), Msg::DownloadClicked);

    assert!(effects.is_empty());
    assert_eq!(state.view().status.text, "Generate the website first");
    assert!(state.view().status.is_error);
}

#[test]
fn download_reports_outcome() {
    init_logging();
    let (state, effects) = update(state_with_preview(), Msg::DownloadClicked);
    assert_eq!(effects, vec![Effect::Download]);

    let (state, _) = update(
        state,
        Msg::DownloadFinished(DownloadResult::Saved(PathBuf::from("out/my-website.html"))),
    );
    assert_eq!(state.view().status.text, "✅ Saved out/my-website.html");

    let (state, _) = update(state, Msg::DownloadFinished(DownloadResult::NotGenerated));
    assert_eq!(state.view().status.text, "Generate the website first");

    let (state, _) = update(
        state,
        Msg::DownloadFinished(DownloadResult::Failed("network error".to_string())),
    );
    assert_eq!(state.view().status.text, "Download failed: network error");
}

#[test]
fn color_text_only_syncs_picker_when_valid() {
    init_logging();
    let state = type_into(AppState::new(), TweakField::Color, "#AABBCC");
    assert_eq!(state.view().color_picker, "#AABBCC");

    let state = type_into(state, TweakField::Color, "#AABB");
    let view = state.view();
    assert_eq!(view.color_picker, "#AABBCC");
    assert_eq!(view.tweaks.color, "#AABB");

    let (state, _) = update(state, Msg::ColorPickerChanged("#010203".to_string()));
    let view = state.view();
    assert_eq!(view.color_picker, "#010203");
    assert_eq!(view.tweaks.color, "#010203");
}

#[test]
fn deploy_modal_toggles() {
    init_logging();
    let (mut state, _) = update(AppState::new(), Msg::DeployClicked);
    assert!(state.view().modal_visible);
    assert!(state.consume_dirty());

    let (state, _) = update(state, Msg::ModalClosed);
    assert!(!state.view().modal_visible);
}
