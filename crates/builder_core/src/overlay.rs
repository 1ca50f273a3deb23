//! Overlays layered over the preview surface.
//!
//! The start prompt and the loading overlay are mutually exclusive in practice, but
//! that is kept by the order in which `update` calls these methods, not here.

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StartPrompt {
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LoadingOverlay {
    pub visible: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Overlays {
    start_prompt: Option<StartPrompt>,
    loading: LoadingOverlay,
    start_prompts_created: usize,
}

impl Overlays {
    /// Shows the start prompt, creating it on first use.
    pub fn show_start(&mut self) {
        if self.start_prompt.is_none() {
            self.start_prompts_created += 1;
        }
        self.start_prompt
            .get_or_insert_with(StartPrompt::default)
            .visible = true;
    }

    pub fn hide_start(&mut self) {
        if let Some(prompt) = self.start_prompt.as_mut() {
            prompt.visible = false;
        }
    }

    pub fn show_loading(&mut self, message: impl Into<String>) {
        self.loading.visible = true;
        self.update_loading_message(message);
    }

    pub fn update_loading_message(&mut self, message: impl Into<String>) {
        self.loading.message = message.into();
    }

    pub fn hide_loading(&mut self) {
        self.loading.visible = false;
    }

    pub fn start_visible(&self) -> bool {
        self.start_prompt.as_ref().is_some_and(|prompt| prompt.visible)
    }

    /// Loading message while the loading overlay is shown.
    pub fn loading(&self) -> Option<&str> {
        self.loading
            .visible
            .then_some(self.loading.message.as_str())
    }

    /// How many start prompt instances were ever created. Stays at one once shown.
    pub fn start_prompts_created(&self) -> usize {
        self.start_prompts_created
    }
}
