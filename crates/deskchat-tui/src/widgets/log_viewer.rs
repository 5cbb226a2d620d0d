//! Chat log viewer with scrolling.
//!
//! The log is append-only. Every append re-enables follow mode, so the
//! newest entry is always on screen right after it arrives.
//!
//! Each message is wrapped once per width to count its lines; a frame only
//! builds the lines that are actually on screen.

use std::cell::{Cell, RefCell};

use deskchat_engine::{ChatMessage, Sender};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::theme::Theme;

/// Wrapped line count of every message, for one width.
#[derive(Debug, Default)]
struct WrapCache {
    width: usize,
    counts: Vec<usize>,
    total: usize,
}

/// Messages plus scroll position.
#[derive(Debug)]
pub struct LogState {
    messages: Vec<ChatMessage>,
    offset: usize,
    follow: bool,
    /// Largest valid offset as of the last render.
    max_offset: Cell<usize>,
    wrap_cache: RefCell<WrapCache>,
}

impl LogState {
    /// Create an empty log.
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            offset: 0,
            follow: true,
            max_offset: Cell::new(0),
            wrap_cache: RefCell::new(WrapCache::default()),
        }
    }

    /// Append a message and scroll to it.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
        self.follow = true;
    }

    /// All messages in append order.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether the view is pinned to the newest entry.
    pub fn is_following(&self) -> bool {
        self.follow
    }

    /// Scroll towards older entries.
    pub fn scroll_up(&mut self, amount: usize) {
        let current = self.effective_offset(self.max_offset.get());
        self.offset = current.saturating_sub(amount);
        self.follow = false;
    }

    /// Scroll towards newer entries; reaching the bottom resumes following.
    pub fn scroll_down(&mut self, amount: usize) {
        let max = self.max_offset.get();
        self.offset = (self.effective_offset(max) + amount).min(max);
        self.follow = self.offset >= max;
    }

    fn effective_offset(&self, max: usize) -> usize {
        if self.follow {
            max
        } else {
            self.offset.min(max)
        }
    }

    /// Total wrapped lines at `width`. Only messages not yet counted at
    /// this width are wrapped.
    pub fn wrapped_len(&self, width: usize) -> usize {
        let mut cache = self.wrap_cache.borrow_mut();
        if cache.width != width {
            *cache = WrapCache {
                width,
                ..WrapCache::default()
            };
        }

        let start = cache.counts.len();
        for message in &self.messages[start..] {
            let count = wrapped_text(message, width).len().max(1);
            cache.counts.push(count);
            cache.total += count;
        }
        cache.total
    }

    /// The `height` lines starting at wrapped line `offset`.
    pub fn visible_lines(
        &self,
        width: usize,
        offset: usize,
        height: usize,
        theme: &Theme,
    ) -> Vec<Line<'static>> {
        self.wrapped_len(width);
        let cache = self.wrap_cache.borrow();

        let mut skip = offset;
        let mut lines = Vec::with_capacity(height);
        for (message, &count) in self.messages.iter().zip(&cache.counts) {
            if lines.len() >= height {
                break;
            }
            if skip >= count {
                skip -= count;
                continue;
            }
            let remaining = height - lines.len();
            lines.extend(
                message_lines(message, width, theme)
                    .into_iter()
                    .skip(skip)
                    .take(remaining),
            );
            skip = 0;
        }
        lines
    }
}

impl Default for LogState {
    fn default() -> Self {
        Self::new()
    }
}

fn label_prefix(message: &ChatMessage) -> String {
    format!("{}: ", message.sender.label())
}

fn wrapped_text(message: &ChatMessage, width: usize) -> Vec<std::borrow::Cow<'_, str>> {
    let text_width = width.saturating_sub(label_prefix(message).width()).max(1);
    textwrap::wrap(&message.text, text_width)
}

/// One message as wrapped lines, continuation lines indented under the text.
fn message_lines(message: &ChatMessage, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let (label_style, text_style) = match message.sender {
        Sender::User => (
            Style::default().fg(theme.user).add_modifier(Modifier::BOLD),
            Style::default().fg(theme.text),
        ),
        Sender::Bot => (
            Style::default().fg(theme.bot).add_modifier(Modifier::BOLD),
            Style::default().fg(theme.subtext),
        ),
    };

    let prefix = label_prefix(message);
    let indent = prefix.width();
    let wrapped = wrapped_text(message, width);
    if wrapped.is_empty() {
        return vec![Line::from(Span::styled(prefix, label_style))];
    }

    wrapped
        .iter()
        .enumerate()
        .map(|(i, chunk)| {
            let lead = if i == 0 {
                Span::styled(prefix.clone(), label_style)
            } else {
                Span::raw(" ".repeat(indent))
            };
            Line::from(vec![lead, Span::styled(chunk.to_string(), text_style)])
        })
        .collect()
}

/// Widget that draws a [`LogState`].
pub struct LogViewer<'a> {
    state: &'a LogState,
    theme: &'a Theme,
}

impl<'a> LogViewer<'a> {
    /// Create a new log viewer.
    pub fn new(state: &'a LogState, theme: &'a Theme) -> Self {
        Self { state, theme }
    }
}

impl Widget for LogViewer<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 2 {
            return;
        }

        // Leave a column for the scrollbar.
        let text_width = area.width.saturating_sub(1) as usize;
        let viewport = area.height as usize;
        let total = self.state.wrapped_len(text_width);
        let max_offset = total.saturating_sub(viewport);
        self.state.max_offset.set(max_offset);
        let offset = self.state.effective_offset(max_offset);

        let lines = self
            .state
            .visible_lines(text_width, offset, viewport, self.theme);
        Paragraph::new(Text::from(lines)).render(
            Rect {
                width: area.width.saturating_sub(1),
                ..area
            },
            buf,
        );

        if total > viewport {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
            let mut scrollbar_state = ScrollbarState::new(max_offset).position(offset);
            scrollbar.render(area, buf, &mut scrollbar_state);
        }
    }
}
