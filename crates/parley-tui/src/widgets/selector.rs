//! Popup selector for choosing one option from a short list

use crate::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, HighlightSpacing, List, ListItem, ListState, StatefulWidget, Widget,
    },
};

const MIN_POPUP_WIDTH: u16 = 24;
const MAX_POPUP_WIDTH: u16 = 80;
const MAX_POPUP_HEIGHT: u16 = 24;

/// One option in a [`Selector`]
#[derive(Debug, Clone, PartialEq)]
pub struct SelectorItem {
    pub label: String,
    /// Shown dimmed after the label
    pub description: Option<String>,
    /// Marks the value currently in effect
    pub is_current: bool,
}

impl SelectorItem {
    pub fn new(label: impl Into<String>, is_current: bool) -> Self {
        Self {
            label: label.into(),
            description: None,
            is_current,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    fn width(&self) -> usize {
        let desc = self.description.as_ref().map_or(0, |d| d.chars().count() + 2);
        self.label.chars().count() + desc + 6
    }
}

/// A centered popup list
pub struct Selector<'a> {
    title: &'a str,
    items: &'a [SelectorItem],
    selected: usize,
    theme: &'a Theme,
}

impl<'a> Selector<'a> {
    pub fn new(title: &'a str, items: &'a [SelectorItem], theme: &'a Theme) -> Self {
        let selected = items.iter().position(|item| item.is_current).unwrap_or(0);
        Self {
            title,
            items,
            selected,
            theme,
        }
    }

    pub fn with_selected(mut self, index: usize) -> Self {
        self.selected = index.min(self.items.len().saturating_sub(1));
        self
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Popup size before clamping to the screen
    fn popup_size(&self) -> (u16, u16) {
        let widest = self
            .items
            .iter()
            .map(SelectorItem::width)
            .chain(std::iter::once(self.title.chars().count() + 4))
            .max()
            .unwrap_or(0);
        let width = (widest.min(u16::MAX as usize) as u16).clamp(MIN_POPUP_WIDTH, MAX_POPUP_WIDTH);
        let height = (self.items.len() as u16 + 2).min(MAX_POPUP_HEIGHT);
        (width, height)
    }

    fn list_item(&self, index: usize, item: &SelectorItem) -> ListItem<'static> {
        let marker = if item.is_current { "● " } else { "  " };
        let label_style = if index == self.selected {
            self.theme
                .accent_style()
                .bg(self.theme.user_bg)
                .add_modifier(Modifier::BOLD)
        } else if item.is_current {
            self.theme.accent_style()
        } else {
            self.theme.base_style()
        };

        let mut spans = vec![Span::styled(format!("{}{}", marker, item.label), label_style)];
        if let Some(desc) = &item.description {
            spans.push(Span::styled(format!("  {}", desc), self.theme.dim_style()));
        }
        ListItem::new(Line::from(spans))
    }

    /// Render the popup centered in `area`
    pub fn render_centered(&self, area: Rect, buf: &mut Buffer) {
        let (width, height) = self.popup_size();
        let width = width.min(area.width);
        let height = height.min(area.height);
        let popup = Rect::new(
            area.x + (area.width - width) / 2,
            area.y + (area.height - height) / 2,
            width,
            height,
        );

        Clear.render(popup, buf);

        let block = Block::default()
            .title(format!(" {} ", self.title))
            .title_style(self.theme.accent_bold())
            .borders(Borders::ALL)
            .border_style(self.theme.accent_style());

        let items: Vec<ListItem> = self
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| self.list_item(i, item))
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_spacing(HighlightSpacing::Always);

        let mut state = ListState::default();
        state.select(Some(self.selected));
        StatefulWidget::render(list, popup, buf, &mut state);
    }
}

/// Visibility and cursor of a popup selector
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectorState {
    pub selected: usize,
    pub visible: bool,
}

impl SelectorState {
    /// Show with the cursor on `index`
    pub fn open_at(&mut self, index: usize) {
        self.selected = index;
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    /// Move up, wrapping to the bottom
    pub fn up(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        self.selected = if self.selected == 0 {
            item_count - 1
        } else {
            self.selected - 1
        };
    }

    /// Move down, wrapping to the top
    pub fn down(&mut self, item_count: usize) {
        if item_count == 0 {
            return;
        }
        self.selected = (self.selected + 1) % item_count;
    }
}
