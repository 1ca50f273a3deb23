use builder_core::{AppViewModel, Phase};

/// Lines describing what changed between `previous` and `view`.
pub fn render(previous: Option<&AppViewModel>, view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    let changed = |f: fn(&AppViewModel) -> bool| previous.is_none_or(|prev| f(prev) != f(view));

    if previous.is_none_or(|prev| prev.phase != view.phase) {
        lines.push(format!("[{}]", phase_label(view.phase)));
    }

    if previous.is_none_or(|prev| prev.status != view.status)
        && !view.status.text.is_empty()
    {
        let marker = if view.status.is_error { "!" } else { ">" };
        lines.push(format!("{marker} {}", view.status.text));
    }

    if previous.is_none_or(|prev| prev.loading != view.loading) {
        if let Some(message) = &view.loading {
            lines.push(format!("  ... {message}"));
        }
    }

    if changed(|v| v.start_prompt_visible) && view.start_prompt_visible {
        lines.push("  Ready to build your website. Run with --build to start.".to_string());
    }

    if previous.map_or(view.preview_revision > 0, |prev| {
        prev.preview_revision != view.preview_revision
    }) {
        lines.push(format!("  preview updated (revision {})", view.preview_revision));
    }

    if changed(|v| v.modal_visible) && view.modal_visible {
        lines.push("  Deploy requested.".to_string());
    }

    lines
}

fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::Idle => "Idle",
        Phase::AwaitingPrerequisite => "Checking onboarding",
        Phase::Starting => "Starting",
        Phase::Polling => "Generating",
        Phase::Completed => "Ready",
        Phase::Failed => "Failed",
        Phase::Blocked => "Blocked",
    }
}
