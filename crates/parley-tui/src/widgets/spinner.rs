//! Spinner with an elapsed-time readout

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};
use std::time::{Duration, Instant};

const FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const FRAME_INTERVAL: Duration = Duration::from_millis(80);

/// Frame to show after `elapsed`
fn frame_at(elapsed: Duration) -> &'static str {
    let index = (elapsed.as_millis() / FRAME_INTERVAL.as_millis()) as usize;
    FRAMES[index % FRAMES.len()]
}

/// Animated "waiting" line
pub struct Spinner<'a> {
    label: &'a str,
    theme: &'a Theme,
    started: Instant,
}

impl<'a> Spinner<'a> {
    pub fn new(label: &'a str, theme: &'a Theme) -> Self {
        Self {
            label,
            theme,
            started: Instant::now(),
        }
    }

    /// Animate relative to a fixed start so frames advance across redraws
    pub fn with_start_time(mut self, started: Instant) -> Self {
        self.started = started;
        self
    }

    fn text(&self, elapsed: Duration) -> String {
        format!(
            "{} {} ({:.1}s)",
            frame_at(elapsed),
            self.label,
            elapsed.as_secs_f64()
        )
    }
}

impl Widget for Spinner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width < 3 || area.height == 0 {
            return;
        }
        let text = self.text(self.started.elapsed());
        let line = Line::from(Span::styled(text, self.theme.accent_style()));
        buf.set_line(area.x, area.y, &line, area.width);
    }
}
