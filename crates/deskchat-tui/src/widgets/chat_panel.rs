//! Chat panel widget.
//!
//! Combines the log viewer with an input line at the bottom. When the panel
//! is hidden only the title bar with the toggle label is drawn.

use ratatui::{
    buffer::Buffer,
    layout::{Position, Rect},
    style::Style,
    symbols::line,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use deskchat_engine::ChatView;
use unicode_width::UnicodeWidthChar;

use crate::theme::Theme;
use crate::view::TuiView;
use crate::widgets::LogViewer;

/// Height of the input area (in lines).
const INPUT_HEIGHT: u16 = 1;

/// Height of the divider line.
const DIVIDER_HEIGHT: u16 = 1;

/// Panel title.
const TITLE: &str = " Helpdesk chat ";

/// Shown in an empty, unfocused input.
const PLACEHOLDER: &str = "Type a message and press Enter";

/// Label of the send control.
const SEND_LABEL: &str = " [Send]";

/// Width of the send control.
#[allow(clippy::cast_possible_truncation)]
const SEND_WIDTH: u16 = SEND_LABEL.len() as u16;

/// Width of the `> ` prompt.
const PROMPT_WIDTH: usize = 2;

/// Longest suffix of `text` that fits in `width` columns.
fn tail_fitting(text: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (i, c) in text.char_indices().rev() {
        used += c.width().unwrap_or(0);
        if used > width {
            break;
        }
        start = i;
    }
    &text[start..]
}

/// Chat panel widget.
///
/// ```text
/// ┌ Helpdesk chat ────────────── [^T Hide] ┐
/// │You: my printer is offline              │
/// │Bot: Try turning it off and on again.   │
/// ├────────────────────────────────────────┤
/// │> _                               [Send]│
/// └────────────────────────────────────────┘
/// ```
pub struct ChatPanel<'a> {
    view: &'a TuiView,
    theme: &'a Theme,
}

impl<'a> ChatPanel<'a> {
    /// Create a new chat panel.
    pub fn new(view: &'a TuiView, theme: &'a Theme) -> Self {
        Self { view, theme }
    }

    /// Rows the panel wants for the given available height.
    pub fn desired_height(view: &TuiView, available: u16) -> u16 {
        if view.visibility().is_visible() {
            available
        } else {
            available.min(1)
        }
    }

    fn title_bar(&self) -> (Line<'a>, Line<'a>) {
        let title = Line::from(Span::styled(TITLE, Style::default().fg(self.theme.text)));
        let toggle = Line::from(Span::styled(
            format!("[^T {}]", self.view.toggle_label()),
            Style::default().fg(self.theme.primary),
        ))
        .right_aligned();
        (title, toggle)
    }

    fn render_input(&self, area: Rect, buf: &mut Buffer) {
        let input = &self.view.input;
        let prompt = Span::styled("> ", Style::default().fg(self.theme.primary));
        let text_style = Style::default().fg(self.theme.text);

        let line = if input.is_empty() {
            if input.focused {
                Line::from(vec![prompt, Span::styled("_", text_style)])
            } else {
                Line::from(vec![
                    prompt,
                    Span::styled(PLACEHOLDER, Style::default().fg(self.theme.muted)),
                ])
            }
        } else {
            let (before, after) = input.split_at_cursor();
            // Scroll so the cursor stays in view; text after it is clipped.
            let room = usize::from(area.width).saturating_sub(PROMPT_WIDTH + 1);
            let before = tail_fitting(before, room);
            let mut spans = vec![prompt, Span::styled(before.to_string(), text_style)];
            if input.focused {
                spans.push(Span::styled(
                    if after.is_empty() { "_" } else { "|" },
                    text_style,
                ));
            }
            spans.push(Span::styled(after.to_string(), text_style));
            Line::from(spans)
        };

        Paragraph::new(line).render(area, buf);
    }

    fn render_divider(&self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 {
            return;
        }
        let divider = line::HORIZONTAL.repeat(area.width as usize);
        Paragraph::new(Line::from(Span::styled(
            divider,
            Style::default().fg(self.theme.border),
        )))
        .render(area, buf);
    }
}

impl Widget for ChatPanel<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (title, toggle) = self.title_bar();
        let layout = PanelLayout::compute(area, self.view.visibility().is_visible());

        if !self.view.visibility().is_visible() {
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(self.theme.border))
                .title_top(title)
                .title_top(toggle)
                .render(layout.title_bar, buf);
            return;
        }

        let border_style = if self.view.input.focused {
            Style::default().fg(self.theme.border_focused)
        } else {
            Style::default().fg(self.theme.border)
        };

        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title_top(title)
            .title_top(toggle)
            .style(Style::default().bg(self.theme.base))
            .render(area, buf);

        LogViewer::new(&self.view.log, self.theme).render(layout.log, buf);
        self.render_divider(layout.divider, buf);
        self.render_input(layout.input, buf);
        Paragraph::new(Span::styled(
            SEND_LABEL,
            Style::default().fg(self.theme.secondary),
        ))
        .render(layout.send_button, buf);
    }
}

/// Where each part of the panel lands for a given area.
///
/// Shared by rendering and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelLayout {
    /// Top row; clicking it toggles the panel.
    pub title_bar: Rect,
    pub log: Rect,
    pub divider: Rect,
    pub input: Rect,
    /// Clicking it sends the input.
    pub send_button: Rect,
}

impl PanelLayout {
    /// Compute the layout. Hidden panels only have a title bar.
    pub fn compute(area: Rect, visible: bool) -> Self {
        let title_bar = Rect {
            height: area.height.min(1),
            ..area
        };
        if !visible || area.height < 3 || area.width < 3 {
            return Self {
                title_bar,
                ..Self::default()
            };
        }

        let inner = Rect::new(area.x + 1, area.y + 1, area.width - 2, area.height - 2);
        let send_width = if inner.width > SEND_WIDTH * 2 {
            SEND_WIDTH
        } else {
            0
        };

        if inner.height < INPUT_HEIGHT + DIVIDER_HEIGHT + 1 {
            // Not enough space - just show input
            return Self {
                title_bar,
                input: Rect {
                    width: inner.width - send_width,
                    ..inner
                },
                send_button: Rect::new(inner.right() - send_width, inner.y, send_width, 1),
                ..Self::default()
            };
        }

        let log_height = inner.height - INPUT_HEIGHT - DIVIDER_HEIGHT;
        let divider_y = inner.y + log_height;
        let input_y = divider_y + DIVIDER_HEIGHT;

        Self {
            title_bar,
            log: Rect::new(inner.x, inner.y, inner.width, log_height),
            divider: Rect::new(inner.x, divider_y, inner.width, DIVIDER_HEIGHT),
            input: Rect::new(inner.x, input_y, inner.width - send_width, INPUT_HEIGHT),
            send_button: Rect::new(
                inner.right() - send_width,
                input_y,
                send_width,
                INPUT_HEIGHT,
            ),
        }
    }

    /// The control under a mouse click, if any.
    pub fn hit(&self, column: u16, row: u16) -> Option<PanelControl> {
        let position = Position::new(column, row);
        if self.title_bar.contains(position) {
            Some(PanelControl::Toggle)
        } else if self.send_button.contains(position) {
            Some(PanelControl::Send)
        } else {
            None
        }
    }
}

/// Clickable controls on the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelControl {
    Toggle,
    Send,
}
