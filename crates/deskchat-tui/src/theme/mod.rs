//! Theme components for the TUI.
//!
//! [`Theme`] is the color palette (Catppuccin Mocha / High Contrast).

mod colors;

pub use colors::Theme;
