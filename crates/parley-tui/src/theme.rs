//! Color themes

use ratatui::style::{Color, Modifier, Style};

/// Indigo used for the title, prompt and focused borders
const INDIGO: Color = Color::Rgb(75, 86, 210);
/// Navy behind user messages
const NAVY: Color = Color::Rgb(46, 56, 86);
/// Slate for assistant headers and captions
const SLATE: Color = Color::Rgb(113, 128, 150);

/// Color theme for the chat screen
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub bg: Color,
    pub fg: Color,
    /// Secondary text
    pub dim: Color,
    /// Highlights and prompts
    pub accent: Color,
    pub error: Color,
    pub success: Color,
    pub warning: Color,
    pub border: Color,
    /// Background of user messages
    pub user_bg: Color,
    /// Assistant header color
    pub assistant: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: INDIGO,
            error: Color::Red,
            success: Color::Green,
            warning: Color::Yellow,
            border: Color::DarkGray,
            user_bg: NAVY,
            assistant: SLATE,
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: INDIGO,
            error: Color::Red,
            success: Color::Green,
            warning: Color::Rgb(180, 120, 0),
            border: Color::Gray,
            user_bg: Color::Rgb(226, 232, 240),
            assistant: SLATE,
        }
    }

    /// Look a theme up by name ("dark" or "light")
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        Style::default()
            .fg(self.accent)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.success)
    }

    pub fn warning_style(&self) -> Style {
        Style::default().fg(self.warning)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }

    /// Body text of user messages
    pub fn user_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.user_bg)
    }

    pub fn assistant_bold(&self) -> Style {
        Style::default()
            .fg(self.assistant)
            .add_modifier(Modifier::BOLD)
    }

    /// Small print under answers
    pub fn caption_style(&self) -> Style {
        Style::default()
            .fg(self.assistant)
            .add_modifier(Modifier::ITALIC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_by_name() {
        assert_eq!(Theme::by_name("dark"), Some(Theme::dark()));
        assert_eq!(Theme::by_name(" Light "), Some(Theme::light()));
        assert_eq!(Theme::by_name("solarized"), None);
    }

    #[test]
    fn test_default_is_dark() {
        assert_eq!(Theme::default(), Theme::dark());
    }
}
