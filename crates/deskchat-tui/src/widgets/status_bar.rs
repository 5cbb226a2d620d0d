//! Status bar widget for the bottom of the TUI.
//!
//! Format: `● server │ N waiting │ last 14:02 │ topic: x │ → hint`

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::Theme;

/// Status bar content.
#[derive(Debug, Clone, Default)]
pub struct StatusBarContent {
    /// Server the widget talks to.
    pub server: String,
    /// Requests still waiting for a response.
    pub in_flight: usize,
    /// Local time of the newest log entry, already formatted.
    pub last_message: Option<String>,
    /// Topic of the last reply, if the server reported one.
    pub topic: Option<String>,
    /// Keybinding hint.
    pub hint: Option<String>,
}

/// Status bar widget.
pub struct StatusBar<'a> {
    content: &'a StatusBarContent,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    /// Create a new status bar widget.
    pub fn new(content: &'a StatusBarContent, theme: &'a Theme) -> Self {
        Self { content, theme }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let separator = || Span::styled(" │ ", Style::default().fg(self.theme.muted));

        let dot_color = if self.content.in_flight > 0 {
            self.theme.warning
        } else {
            self.theme.primary
        };

        let mut spans = vec![
            Span::styled("● ", Style::default().fg(dot_color)),
            Span::styled(&self.content.server, Style::default().fg(self.theme.text)),
        ];

        if self.content.in_flight > 0 {
            spans.push(separator());
            spans.push(Span::styled(
                format!("{} waiting", self.content.in_flight),
                Style::default().fg(self.theme.warning),
            ));
        }

        if let Some(ref time) = self.content.last_message {
            spans.push(separator());
            spans.push(Span::styled(
                format!("last {time}"),
                Style::default().fg(self.theme.subtext),
            ));
        }

        if let Some(ref topic) = self.content.topic {
            spans.push(separator());
            spans.push(Span::styled(
                format!("topic: {topic}"),
                Style::default().fg(self.theme.info),
            ));
        }

        if let Some(ref hint) = self.content.hint {
            spans.push(separator());
            spans.push(Span::styled(
                format!("→ {hint}"),
                Style::default().fg(self.theme.secondary),
            ));
        }

        let paragraph =
            Paragraph::new(Line::from(spans)).style(Style::default().bg(self.theme.surface));
        paragraph.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    fn render(content: &StatusBarContent) -> String {
        let theme = Theme::default();
        let area = Rect::new(0, 0, 100, 1);
        let mut buf = Buffer::empty(area);
        StatusBar::new(content, &theme).render(area, &mut buf);
        buffer_to_string(&buf)
    }

    #[test]
    fn test_idle_status() {
        let content = StatusBarContent {
            server: "http://localhost:5000".into(),
            ..Default::default()
        };
        let line = render(&content);
        assert!(line.contains("http://localhost:5000"));
        assert!(!line.contains("waiting"));
    }

    #[test]
    fn test_in_flight_and_topic() {
        let content = StatusBarContent {
            server: "http://localhost:5000".into(),
            in_flight: 2,
            last_message: Some("14:02".into()),
            topic: Some("printer".into()),
            hint: Some("Enter send".into()),
        };
        let line = render(&content);
        assert!(line.contains("2 waiting"));
        assert!(line.contains("last 14:02"));
        assert!(line.contains("topic: printer"));
        assert!(line.contains("→ Enter send"));
    }
}
