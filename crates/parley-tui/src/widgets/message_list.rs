//! Transcript view

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Indent applied to message bodies
const INDENT: &str = "  ";

/// Who a display entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    User,
    Assistant,
    /// Local output: command results, hints. Never part of the transcript.
    Notice,
}

/// One entry in the transcript view
#[derive(Debug, Clone, PartialEq)]
pub struct ChatMessage {
    pub kind: MessageKind,
    pub content: String,
    /// Small print under the body, e.g. response time
    pub caption: Option<String>,
    /// Render the body as an error
    pub is_error: bool,
}

impl ChatMessage {
    fn new(kind: MessageKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            content: content.into(),
            caption: None,
            is_error: false,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageKind::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Assistant, content)
    }

    /// An assistant entry whose text is an error notice
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Self {
            is_error: true,
            ..Self::new(MessageKind::Assistant, content)
        }
    }

    pub fn notice(content: impl Into<String>) -> Self {
        Self::new(MessageKind::Notice, content)
    }

    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }
}

/// Lay out one message at the given width.
///
/// Both rendering and height calculation go through here so they never
/// disagree.
pub fn message_lines(msg: &ChatMessage, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let content_width = width.saturating_sub(INDENT.len()).max(1);
    let mut lines = Vec::new();

    let (header, header_style) = match msg.kind {
        MessageKind::User => ("▶ You", theme.accent_bold()),
        MessageKind::Assistant => ("◀ Assistant", theme.assistant_bold()),
        MessageKind::Notice => ("● parley", theme.dim_style()),
    };
    lines.push(Line::from(Span::styled(header, header_style)));

    let body_style = match (msg.kind, msg.is_error) {
        (_, true) => theme.error_style(),
        (MessageKind::User, false) => theme.user_style(),
        (MessageKind::Assistant, false) => theme.base_style(),
        (MessageKind::Notice, false) => theme.dim_style(),
    };

    for row in textwrap::wrap(&msg.content, content_width) {
        let text = if msg.kind == MessageKind::User {
            // Pad so the background forms a block
            format!("{:<content_width$}", row)
        } else {
            row.into_owned()
        };
        lines.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(text, body_style),
        ]));
    }

    if let Some(caption) = &msg.caption {
        lines.push(Line::from(vec![
            Span::raw(INDENT),
            Span::styled(caption.clone(), theme.caption_style()),
        ]));
    }

    lines.push(Line::from(""));
    lines
}

/// Total rendered height of a message list
pub fn calculate_message_height(messages: &[ChatMessage], width: usize, theme: &Theme) -> usize {
    messages
        .iter()
        .map(|msg| message_lines(msg, width, theme).len())
        .sum()
}

/// Widget for the transcript
pub struct MessageList<'a> {
    messages: &'a [ChatMessage],
    theme: &'a Theme,
    scroll: usize,
}

impl<'a> MessageList<'a> {
    pub fn new(messages: &'a [ChatMessage], theme: &'a Theme) -> Self {
        Self {
            messages,
            theme,
            scroll: 0,
        }
    }

    /// Skip this many lines from the top
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let visible: Vec<Line> = self
            .messages
            .iter()
            .flat_map(|msg| message_lines(msg, width, self.theme))
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();

        Paragraph::new(visible)
            .style(Style::default())
            .render(area, buf);
    }
}
