//! Single-line question input with a character counter

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Columns taken by the border and padding
const CHROME_WIDTH: usize = 4;

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Single-line text input.
///
/// The cursor is a char index. Horizontal scroll is tracked in display
/// columns so wide characters stay aligned.
#[derive(Debug, Default)]
pub struct InputBox {
    content: String,
    cursor: usize,
    scroll: usize,
    placeholder: String,
    focused: bool,
    /// Soft limit shown in the counter; input past it is still accepted
    limit: Option<usize>,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Show a `count/limit` counter in the bottom border
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_over_limit(&self) -> bool {
        self.limit.is_some_and(|limit| self.char_count() > limit)
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.char_count();
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }

    fn cursor_column(&self) -> usize {
        self.content.chars().take(self.cursor).map(char_width).sum()
    }

    fn insert_char(&mut self, c: char) {
        let at = self.byte_offset(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Remove chars in `[start, end)` and put the cursor at `start`
    fn remove_range(&mut self, start: usize, end: usize) {
        let (from, to) = (self.byte_offset(start), self.byte_offset(end));
        self.content.drain(from..to);
        self.cursor = start;
    }

    fn word_start_before_cursor(&self) -> usize {
        let chars: Vec<char> = self.content.chars().take(self.cursor).collect();
        let mut idx = chars.len();
        while idx > 0 && chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
        while idx > 0 && !chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
        idx
    }

    /// Apply an editing action. Returns whether it was consumed.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        let len = self.char_count();

        let handled = match action {
            Action::Char(c) => {
                self.insert_char(*c);
                true
            }
            Action::Backspace if self.cursor > 0 => {
                self.remove_range(self.cursor - 1, self.cursor);
                true
            }
            Action::Delete if self.cursor < len => {
                let cursor = self.cursor;
                self.remove_range(cursor, cursor + 1);
                true
            }
            Action::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Action::Right if self.cursor < len => {
                self.cursor += 1;
                true
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = len;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord => {
                let start = self.word_start_before_cursor();
                self.remove_range(start, self.cursor);
                true
            }
            Action::Paste(text) => {
                // Line breaks become single spaces
                for c in text.chars() {
                    if c == '\n' || c == '\r' {
                        if self.cursor > 0 && !self.content.ends_with(' ') {
                            self.insert_char(' ');
                        }
                    } else {
                        self.insert_char(c);
                    }
                }
                true
            }
            _ => false,
        };

        if handled {
            self.update_scroll(width as usize);
        }
        handled
    }

    fn update_scroll(&mut self, width: usize) {
        let visible = width.saturating_sub(CHROME_WIDTH).max(1);
        let column = self.cursor_column();

        if column < self.scroll {
            self.scroll = column;
        } else if column >= self.scroll + visible {
            self.scroll = column + 1 - visible;
        }
    }

    /// Visible slice of the content for a given inner width
    fn visible_text(&self, width: usize) -> String {
        let mut column = 0;
        let mut out = String::new();
        for c in self.content.chars() {
            let w = char_width(c);
            if column >= self.scroll {
                if column - self.scroll + w > width {
                    break;
                }
                out.push(c);
            }
            column += w;
        }
        out
    }

    fn counter_line(&self, theme: &Theme) -> Option<Line<'static>> {
        let limit = self.limit?;
        let style = if self.is_over_limit() {
            theme.error_style()
        } else {
            theme.dim_style()
        };
        let counter = format!(" {}/{} ", self.char_count(), limit);
        Some(Line::from(Span::styled(counter, style)).right_aligned())
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(if self.focused {
                theme.accent_style()
            } else {
                theme.border_style()
            });
        if let Some(counter) = self.counter_line(theme) {
            block = block.title_bottom(counter);
        }

        let inner = block.inner(area);
        block.render(area, buf);

        let (text, style) = if self.content.is_empty() {
            (self.placeholder.clone(), theme.dim_style())
        } else {
            (self.visible_text(inner.width as usize), theme.base_style())
        };
        Paragraph::new(text).style(style).render(inner, buf);

        if self.focused && inner.width > 0 {
            let x = self.cursor_column().saturating_sub(self.scroll);
            if x < inner.width as usize {
                if let Some(cell) = buf.cell_mut((inner.x + x as u16, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_action(&Action::Char(c), 80);
        }
        input
    }

    fn buffer_text(buf: &Buffer) -> String {
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = typed("héllo");
        assert_eq!(input.content(), "héllo");
        assert_eq!(input.cursor(), 5);

        input.handle_action(&Action::Backspace, 80);
        assert_eq!(input.content(), "héll");

        input.handle_action(&Action::Home, 80);
        input.handle_action(&Action::Delete, 80);
        assert_eq!(input.content(), "éll");
        assert_eq!(input.cursor(), 0);

        assert!(!input.handle_action(&Action::Backspace, 80));
        assert!(!input.handle_action(&Action::Left, 80));
    }

    #[test]
    fn test_insert_mid_line() {
        let mut input = typed("ac");
        input.handle_action(&Action::Left, 80);
        input.handle_action(&Action::Char('b'), 80);
        assert_eq!(input.content(), "abc");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn test_delete_word() {
        let mut input = typed("what is  ");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "what ");
        input.handle_action(&Action::DeleteWord, 80);
        assert_eq!(input.content(), "");
    }

    #[test]
    fn test_paste_flattens_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("one\r\ntwo\nthree".into()), 80);
        assert_eq!(input.content(), "one two three");
    }

    #[test]
    fn test_clear_empties() {
        let mut input = typed("question");
        input.clear();
        assert_eq!(input.content(), "");
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_over_limit() {
        let mut input = InputBox::new().with_limit(3);
        input.set_content("abc");
        assert!(!input.is_over_limit());
        input.handle_action(&Action::Char('d'), 80);
        assert!(input.is_over_limit());

        assert!(!typed("abcdef").is_over_limit());
    }

    #[test]
    fn test_scroll_keeps_cursor_visible() {
        let mut input = InputBox::new();
        for _ in 0..30 {
            input.handle_action(&Action::Char('x'), 14);
        }
        // 10 visible columns, cursor at column 30
        assert_eq!(input.scroll, 21);
        input.handle_action(&Action::Home, 14);
        assert_eq!(input.scroll, 0);
    }

    #[test]
    fn test_render_counter_and_placeholder() {
        let area = Rect::new(0, 0, 30, 3);
        let mut buf = Buffer::empty(area);
        let input = InputBox::new()
            .with_placeholder("Ask away")
            .with_limit(5000);
        input.render(area, &mut buf, &Theme::dark());

        let text = buffer_text(&buf);
        assert!(text.contains("Ask away"));
        assert!(text.contains("0/5000"));
    }
}
