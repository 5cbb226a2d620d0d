//! Terminal implementation of the engine's view capability.

use deskchat_engine::{ChatMessage, ChatView, Visibility};

use crate::widgets::{LogState, TextInputState};

/// Element handles for the chat panel: log, input, visibility and toggle label.
#[derive(Debug)]
pub struct TuiView {
    /// The rendered log.
    pub log: LogState,
    /// The input field.
    pub input: TextInputState,
    visibility: Visibility,
    toggle_label: String,
}

impl TuiView {
    /// Create a view with the given initial visibility.
    pub fn new(visibility: Visibility) -> Self {
        let mut input = TextInputState::new();
        input.focused = visibility.is_visible();
        Self {
            log: LogState::new(),
            input,
            visibility,
            toggle_label: visibility.toggle_label().to_string(),
        }
    }

    /// Current label of the toggle control.
    pub fn toggle_label(&self) -> &str {
        &self.toggle_label
    }
}

impl ChatView for TuiView {
    fn input(&self) -> &str {
        self.input.content()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn focus_input(&mut self) {
        self.input.focused = true;
    }

    fn append(&mut self, message: ChatMessage) {
        self.log.push(message);
    }

    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
        // A hidden input cannot hold focus.
        self.input.focused = visibility.is_visible();
    }

    fn set_toggle_label(&mut self, label: &str) {
        label.clone_into(&mut self.toggle_label);
    }
}
