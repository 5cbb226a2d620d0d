//! deskchat-tui: terminal host for the deskchat widget
//!
//! This crate draws the chat panel with ratatui and drives a
//! [`deskchat_engine::ChatController`] from keyboard and mouse input:
//! - Collapsible chat panel with title-bar toggle
//! - Auto-following message log and input line
//! - Status bar with server, pending requests and reply topic
//! - Headless mode for testing and automation

mod app;
mod event;
pub mod headless;
mod requests;
#[cfg(test)]
pub mod test_utils;
mod theme;
mod view;
mod widgets;

pub use app::App;
pub use deskchat_engine;
pub use event::{key_to_action, Action, Event, EventHandler};
pub use theme::Theme;
pub use view::TuiView;

use std::io::{self, stdout};
use std::sync::Arc;

use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use deskchat_engine::{ChatTransport, ClientConfig};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::info;

use requests::RequestPool;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            stdout(),
            DisableMouseCapture,
            LeaveAlternateScreen,
            ShowCursor
        );
    }
}

/// Run the TUI application.
///
/// Sets up the terminal, runs the event loop, and restores the terminal on
/// exit. Requests still in flight when the user quits are cancelled.
pub async fn run_tui(
    config: &ClientConfig,
    transport: Arc<dyn ChatTransport>,
) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(config, transport);
    info!(server = %config.server_url, "tui started");

    // 4 Hz tick rate
    let mut events = EventHandler::new(250);

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut requests = RequestPool::new();

    loop {
        terminal.draw(|frame| app.render(frame))?;

        if app.should_quit {
            break;
        }

        tokio::select! {
            event = events.next() => {
                let pending = match event {
                    Some(Event::Key(key)) => app.handle_action(key_to_action(key)),
                    Some(Event::Mouse(mouse)) => app.handle_mouse(mouse),
                    // Redraw on the next iteration
                    Some(Event::Tick | Event::Resize(_, _)) => None,
                    None => break,
                };
                if let Some(pending) = pending {
                    requests.spawn(pending);
                }
            }
            Some(outcome) = requests.next() => app.complete(outcome),
        }
    }

    requests.abort_all();
    info!(pending = app.controller.in_flight(), "tui stopped");
    Ok(())
}

/// Get the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
