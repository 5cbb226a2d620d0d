//! The view capability the controller drives.
//!
//! A host (terminal UI, stdout printer, test fake) implements [`ChatView`]
//! and hands it to the controller at construction.

use crate::chat::ChatMessage;

/// Whether the chat panel is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

impl Visibility {
    /// The opposite state.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Visibility::Visible => Visibility::Hidden,
            Visibility::Hidden => Visibility::Visible,
        }
    }

    /// Label for the toggle control: the action the next press performs.
    pub fn toggle_label(self) -> &'static str {
        match self {
            Visibility::Visible => "Hide",
            Visibility::Hidden => "Show",
        }
    }

    /// Convenience for hosts that store a bool.
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

/// Element handles the controller needs from its host.
pub trait ChatView {
    /// Current content of the input field.
    fn input(&self) -> &str;

    /// Empty the input field.
    fn clear_input(&mut self);

    /// Give the input field focus.
    fn focus_input(&mut self);

    /// Append a message to the log and scroll to it.
    fn append(&mut self, message: ChatMessage);

    /// Current panel visibility.
    fn visibility(&self) -> Visibility;

    /// Show or hide the panel.
    fn set_visibility(&mut self, visibility: Visibility);

    /// Set the text of the toggle control.
    fn set_toggle_label(&mut self, label: &str);
}
