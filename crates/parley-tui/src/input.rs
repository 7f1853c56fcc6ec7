//! Key mapping

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};

/// What a key press means to the chat screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Regular character input
    Char(char),
    /// Enter
    Submit,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    /// Close a popup
    Escape,
    /// Ctrl+C
    Interrupt,
    /// Ctrl+Q
    Quit,
    /// Ctrl+L: clear the conversation
    ClearConversation,
    /// Ctrl+U: clear the input line
    ClearLine,
    /// Ctrl+W: delete the word before the cursor
    DeleteWord,
    /// Bracketed paste
    Paste(String),
    /// Ctrl+K
    ModelSelect,
    /// Ctrl+P
    PersonaSelect,
    /// Ctrl+T
    TemperatureSelect,
    /// Ctrl+O
    TokensSelect,
    Unknown,
}

impl Action {
    /// Whether this action ends the program
    pub fn is_exit(&self) -> bool {
        matches!(self, Action::Interrupt | Action::Quit)
    }
}

/// Convert a crossterm key event to an action
pub fn key_to_action(event: KeyEvent) -> Action {
    let KeyEvent {
        code, modifiers, ..
    } = event;

    if modifiers.contains(KeyModifiers::CONTROL) {
        return match code {
            KeyCode::Char('c') => Action::Interrupt,
            KeyCode::Char('q') => Action::Quit,
            KeyCode::Char('l') => Action::ClearConversation,
            KeyCode::Char('u') => Action::ClearLine,
            KeyCode::Char('w') => Action::DeleteWord,
            KeyCode::Char('k') => Action::ModelSelect,
            KeyCode::Char('p') => Action::PersonaSelect,
            KeyCode::Char('t') => Action::TemperatureSelect,
            KeyCode::Char('o') => Action::TokensSelect,
            _ => Action::Unknown,
        };
    }

    if modifiers.contains(KeyModifiers::ALT) {
        return Action::Unknown;
    }

    match code {
        KeyCode::Char(c) => Action::Char(c),
        KeyCode::Enter => Action::Submit,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::Esc => Action::Escape,
        _ => Action::Unknown,
    }
}

/// Convert a crossterm event to an action
pub fn event_to_action(event: Event) -> Option<Action> {
    match event {
        Event::Key(key_event) => Some(key_to_action(key_event)),
        Event::Paste(text) => Some(Action::Paste(text)),
        _ => None,
    }
}
