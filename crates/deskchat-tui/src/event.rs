//! Event handling for the deskchat TUI.

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent,
};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Event handler that runs in a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // crossterm polling is blocking, so it gets its own thread
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            loop {
                if event::poll(tick_rate).unwrap_or(false) {
                    if let Ok(evt) = event::read() {
                        let event = match evt {
                            CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                                Some(Event::Key(key))
                            }
                            CrosstermEvent::Mouse(mouse) => Some(Event::Mouse(mouse)),
                            CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
                            _ => None,
                        };
                        if let Some(e) = event {
                            if tx_clone.send(e).is_err() {
                                break;
                            }
                        }
                    }
                } else if tx_clone.send(Event::Tick).is_err() {
                    break;
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, waiting until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// Action that can be performed in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Send the current input (Enter or the send control).
    Send,
    /// Show or hide the panel (Ctrl+T or the title bar).
    Toggle,
    /// Reset the server-side conversation.
    Reset,
    ScrollUp,
    ScrollDown,
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    HistoryPrev,
    HistoryNext,
    None,
}

/// Lines moved per scroll action.
pub const SCROLL_STEP: usize = 3;

/// Convert a key event to an action.
pub fn key_to_action(key: KeyEvent) -> Action {
    // AltGr arrives as Ctrl+Alt on Windows and types a character.
    let altgr = key
        .modifiers
        .contains(KeyModifiers::CONTROL | KeyModifiers::ALT);
    if key.modifiers.contains(KeyModifiers::CONTROL) && !altgr {
        return match key.code {
            KeyCode::Char('c' | 'q') => Action::Quit,
            KeyCode::Char('t') => Action::Toggle,
            KeyCode::Char('r') => Action::Reset,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Enter => Action::Send,
        KeyCode::PageUp => Action::ScrollUp,
        KeyCode::PageDown => Action::ScrollDown,
        KeyCode::Char(c) => Action::Insert(c),
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::Up => Action::HistoryPrev,
        KeyCode::Down => Action::HistoryNext,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_enter_sends() {
        assert_eq!(key_to_action(key(KeyCode::Enter)), Action::Send);
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(key_to_action(ctrl('t')), Action::Toggle);
        assert_eq!(key_to_action(ctrl('r')), Action::Reset);
        assert_eq!(key_to_action(ctrl('c')), Action::Quit);
        assert_eq!(key_to_action(ctrl('x')), Action::None);
    }

    #[test]
    fn test_plain_characters_are_input() {
        assert_eq!(key_to_action(key(KeyCode::Char('t'))), Action::Insert('t'));
        assert_eq!(key_to_action(key(KeyCode::Char('å'))), Action::Insert('å'));
        assert_eq!(
            key_to_action(KeyEvent::new(KeyCode::Char('T'), KeyModifiers::SHIFT)),
            Action::Insert('T')
        );
    }

    #[test]
    fn test_altgr_characters_are_input() {
        let altgr = KeyModifiers::CONTROL | KeyModifiers::ALT;
        for c in ['@', '{', '€', 't'] {
            assert_eq!(
                key_to_action(KeyEvent::new(KeyCode::Char(c), altgr)),
                Action::Insert(c)
            );
        }
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(key_to_action(key(KeyCode::Esc)), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::PageUp)), Action::ScrollUp);
        assert_eq!(key_to_action(key(KeyCode::Up)), Action::HistoryPrev);
        assert_eq!(key_to_action(key(KeyCode::F(5))), Action::None);
    }
}
