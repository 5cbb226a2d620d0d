//! Application state and update logic for the deskchat TUI.

use std::sync::Arc;

use chrono::Local;
use crossterm::event::{MouseButton, MouseEvent, MouseEventKind};
use deskchat_engine::{
    ChatController, ChatTransport, ChatView, ClientConfig, Outcome, PendingRequest, Visibility,
};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

use crate::event::{Action, SCROLL_STEP};
use crate::theme::Theme;
use crate::view::TuiView;
use crate::widgets::{ChatPanel, PanelControl, PanelLayout, StatusBar, StatusBarContent};

/// Keybinding summary shown in the status bar.
const HINT: &str = "Enter send · ^T show/hide · ^R reset · Esc quit";

/// Application state.
pub struct App {
    /// The widget controller, which owns the view.
    pub controller: ChatController<TuiView>,
    /// Theme colors.
    pub theme: Theme,
    /// Server shown in the status bar.
    pub server: String,
    /// Whether the app should quit.
    pub should_quit: bool,
    /// Where the panel was drawn last frame (for mouse hit-testing).
    panel_area: Rect,
}

impl App {
    /// Create the app over an injected transport.
    pub fn new(config: &ClientConfig, transport: Arc<dyn ChatTransport>) -> Self {
        let visibility = if config.start_hidden {
            Visibility::Hidden
        } else {
            Visibility::Visible
        };
        Self {
            controller: ChatController::new(TuiView::new(visibility), transport, config),
            theme: Theme::from_env(),
            server: config.server_url.clone(),
            should_quit: false,
            panel_area: Rect::default(),
        }
    }

    /// The view.
    pub fn view(&self) -> &TuiView {
        self.controller.view()
    }

    /// Apply an action. Returns a request for the caller to run, if any.
    pub fn handle_action(&mut self, action: Action) -> Option<PendingRequest> {
        let visible = self.view().visibility().is_visible();

        match action {
            Action::Quit => self.should_quit = true,
            Action::Toggle => {
                self.controller.toggle();
            }
            Action::Reset => return Some(self.controller.begin_reset()),
            Action::ScrollUp => self.controller.view_mut().log.scroll_up(SCROLL_STEP),
            Action::ScrollDown => self.controller.view_mut().log.scroll_down(SCROLL_STEP),

            // The input is part of the panel; a hidden panel takes no input.
            _ if !visible => {}

            Action::Send => return self.controller.begin_send(),
            edit => self.edit_input(edit),
        }
        None
    }

    fn edit_input(&mut self, action: Action) {
        let input = &mut self.controller.view_mut().input;
        match action {
            Action::Insert(c) => input.insert(c),
            Action::Backspace => input.backspace(),
            Action::Delete => input.delete(),
            Action::Left => input.move_left(),
            Action::Right => input.move_right(),
            Action::Home => input.move_home(),
            Action::End => input.move_end(),
            Action::HistoryPrev => input.history_prev(),
            Action::HistoryNext => input.history_next(),
            _ => {}
        }
    }

    /// Apply a mouse event: clicks on panel controls and wheel scrolling.
    pub fn handle_mouse(&mut self, mouse: MouseEvent) -> Option<PendingRequest> {
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let layout =
                    PanelLayout::compute(self.panel_area, self.view().visibility().is_visible());
                match layout.hit(mouse.column, mouse.row)? {
                    PanelControl::Toggle => self.handle_action(Action::Toggle),
                    PanelControl::Send => self.handle_action(Action::Send),
                }
            }
            MouseEventKind::ScrollUp => self.handle_action(Action::ScrollUp),
            MouseEventKind::ScrollDown => self.handle_action(Action::ScrollDown),
            _ => None,
        }
    }

    /// Render a resolved request into the log.
    pub fn complete(&mut self, outcome: Outcome) {
        self.controller.complete(outcome);
    }

    /// Draw the panel and the status bar.
    pub fn render(&mut self, frame: &mut Frame<'_>) {
        let [main, status] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(frame.area());

        self.panel_area = Rect {
            height: ChatPanel::desired_height(self.view(), main.height),
            ..main
        };

        frame.render_widget(ChatPanel::new(self.view(), &self.theme), self.panel_area);

        let content = self.status_content();
        frame.render_widget(StatusBar::new(&content, &self.theme), status);
    }

    fn status_content(&self) -> StatusBarContent {
        StatusBarContent {
            server: self.server.clone(),
            in_flight: self.controller.in_flight(),
            last_message: self.view().log.messages().last().map(|message| {
                message
                    .timestamp
                    .with_timezone(&Local)
                    .format("%H:%M")
                    .to_string()
            }),
            topic: self
                .controller
                .last_reply()
                .and_then(|reply| reply.topic.clone()),
            hint: Some(HINT.into()),
        }
    }
}
