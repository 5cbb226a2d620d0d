//! UI widgets for the TUI.
//!
//! This module provides:
//! - [`ChatPanel`] - The chat widget: title bar, log, input
//! - [`LogViewer`] - Scrolling, auto-following message log
//! - [`StatusBar`] - Bottom status line
//! - [`TextInputState`] - Input field state

mod chat_panel;
mod log_viewer;
mod status_bar;
mod text_input;

pub use chat_panel::{ChatPanel, PanelControl, PanelLayout};
pub use log_viewer::{LogState, LogViewer};
pub use status_bar::{StatusBar, StatusBarContent};
pub use text_input::TextInputState;
