//! Full-screen chat UI

use std::future::Future;
use std::io::Stdout;
use std::time::{Duration, Instant};

use crossterm::event::{Event, EventStream, KeyEventKind, MouseEventKind};
use futures::{Stream, StreamExt};
use parley_core::{
    ChatClient, ChatSession, MAX_QUESTION_CHARS, ModelId, Outcome, Persona, Reply,
    settings::{max_token_choices, temperature_choices},
};
use parley_tui::{
    Theme,
    input::{Action, event_to_action},
    widgets::{
        ChatMessage, InputBox, MessageList, Selector, SelectorItem, SelectorState, Spinner,
        message_list::calculate_message_height,
    },
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};

use tokio::time::Interval;

use crate::commands::{CommandResult, execute_command, question_text};
use crate::utils::truncate_chars;

const SIDEBAR_WIDTH: u16 = 34;
/// Below this width the sidebar is hidden
const SIDEBAR_MIN_SCREEN: u16 = 90;
const FOOTER_TAG: &str = "Built with ratatui & Groq";
const THINKING_LABEL: &str = "Thinking...";
/// Room for "⠋ Thinking... (999.9s)" in the status line
const SPINNER_WIDTH: u16 = 24;

const KEYBINDINGS: &[(&str, &str)] = &[
    ("Enter", "Ask"),
    ("Ctrl+K", "Model"),
    ("Ctrl+P", "Persona"),
    ("Ctrl+T", "Temperature"),
    ("Ctrl+O", "Max tokens"),
    ("Ctrl+L", "Clear conversation"),
    ("PgUp/Dn", "Scroll"),
    ("Ctrl+C", "Quit"),
];

/// What the event loop should do after an input event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiMessage {
    /// Send this question
    Ask(String),
    Quit,
}

/// Which popup selector is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Popup {
    Model,
    Persona,
    Temperature,
    Tokens,
}

impl Popup {
    fn title(self) -> &'static str {
        match self {
            Popup::Model => "Select Model",
            Popup::Persona => "Select Persona",
            Popup::Temperature => "Temperature",
            Popup::Tokens => "Max Tokens",
        }
    }

    fn len(self) -> usize {
        match self {
            Popup::Model => ModelId::ALL.len(),
            Popup::Persona => Persona::ALL.len(),
            Popup::Temperature => temperature_choices().len(),
            Popup::Tokens => max_token_choices().len(),
        }
    }

    /// Settings change for the item at `index`
    fn change(self, index: usize) -> Option<CommandResult> {
        match self {
            Popup::Model => ModelId::ALL.get(index).copied().map(CommandResult::ChangeModel),
            Popup::Persona => Persona::ALL.get(index).copied().map(CommandResult::ChangePersona),
            Popup::Temperature => temperature_choices()
                .get(index)
                .copied()
                .map(CommandResult::ChangeTemperature),
            Popup::Tokens => max_token_choices()
                .get(index)
                .copied()
                .map(CommandResult::ChangeMaxTokens),
        }
    }
}

/// TUI application state
pub struct TuiState {
    session: ChatSession,
    /// Display list: transcript entries plus local notices
    messages: Vec<ChatMessage>,
    input: InputBox,
    /// Lines scrolled; `usize::MAX` means stick to the bottom
    scroll: usize,
    status: String,
    status_is_error: bool,
    theme: Theme,
    has_credential: bool,
    spinner_start: Instant,
    popup: Option<Popup>,
    selector: SelectorState,
}

impl TuiState {
    pub fn new(session: ChatSession, theme: Theme, has_credential: bool) -> Self {
        let mut input = InputBox::new()
            .with_placeholder("Ask me anything...")
            .with_limit(MAX_QUESTION_CHARS);
        input.set_focused(true);

        let (status, status_is_error) = if has_credential {
            ("Ready".to_string(), false)
        } else {
            ("No API key: set GROQ_API_KEY".to_string(), true)
        };

        Self {
            session,
            messages: Vec::new(),
            input,
            scroll: 0,
            status,
            status_is_error,
            theme,
            has_credential,
            spinner_start: Instant::now(),
            popup: None,
            selector: SelectorState::default(),
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = false;
    }

    fn set_error(&mut self, status: impl Into<String>) {
        self.status = status.into();
        self.status_is_error = true;
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll = usize::MAX;
    }

    fn show_notice(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::notice(content));
        self.scroll_to_bottom();
    }

    fn open_popup(&mut self, popup: Popup) {
        let settings = self.session.settings();
        let index = match popup {
            Popup::Model => settings.model().index(),
            Popup::Persona => settings.persona().index(),
            Popup::Temperature => closest_index(&temperature_choices(), settings.temperature()),
            Popup::Tokens => max_token_choices()
                .iter()
                .position(|&n| n == settings.max_tokens())
                .unwrap_or(0),
        };
        self.popup = Some(popup);
        self.selector.open_at(index);
    }

    fn close_popup(&mut self) {
        self.popup = None;
        self.selector.hide();
    }

    fn apply_change(&mut self, change: CommandResult) {
        if let Some(message) = change.apply(self.session.settings_mut()) {
            tracing::debug!(%message, "settings changed");
            self.set_status(message);
        }
    }

    fn clear_conversation(&mut self) {
        if self.session.is_busy() {
            self.set_error("Wait for the current answer before clearing");
            return;
        }
        self.session.clear();
        self.messages.clear();
        self.scroll = 0;
        self.set_status("Cleared");
    }

    fn run_command(&mut self, result: CommandResult) -> Option<UiMessage> {
        match result {
            CommandResult::Clear => self.clear_conversation(),
            CommandResult::Exit => return Some(UiMessage::Quit),
            CommandResult::Message(message) => self.show_notice(message),
            CommandResult::OpenModelSelector => self.open_popup(Popup::Model),
            CommandResult::OpenPersonaSelector => self.open_popup(Popup::Persona),
            CommandResult::OpenTemperatureSelector => self.open_popup(Popup::Temperature),
            CommandResult::OpenTokensSelector => self.open_popup(Popup::Tokens),
            change => self.apply_change(change),
        }
        None
    }

    fn submit(&mut self) -> Option<UiMessage> {
        if let Some(result) = execute_command(self.input.content(), self.session.settings()) {
            self.input.clear();
            return self.run_command(result);
        }

        let text = question_text(self.input.content()).to_string();
        match self.session.begin(&text) {
            Ok(question) => {
                self.input.clear();
                self.messages.push(ChatMessage::user(question.clone()));
                self.scroll_to_bottom();
                self.spinner_start = Instant::now();
                self.set_status(THINKING_LABEL);
                Some(UiMessage::Ask(question))
            }
            Err(e) => {
                self.set_error(e.to_string());
                None
            }
        }
    }

    /// Record the reply to the question in flight
    pub fn finish(&mut self, reply: &Reply) {
        self.session.complete(reply);

        let message = if reply.is_failure() {
            ChatMessage::assistant_error(reply.text.clone())
        } else {
            ChatMessage::assistant(reply.text.clone()).with_caption(reply.caption())
        };
        self.messages.push(message);
        self.scroll_to_bottom();

        match &reply.outcome {
            Outcome::Answered => self.set_status(format!("Answered in {:.2}s", reply.elapsed_secs)),
            Outcome::MissingCredential => {
                self.set_error("No API key: export GROQ_API_KEY or add it to the config file")
            }
            Outcome::RemoteFailure { detail } => {
                self.set_error(format!("Error: {}", truncate_chars(detail, 200)))
            }
        }
    }

    /// Handle keyboard action
    pub fn handle_action(&mut self, action: Action, width: u16) -> Option<UiMessage> {
        if action.is_exit() {
            return Some(UiMessage::Quit);
        }

        if let Some(popup) = self.popup {
            let count = popup.len();
            match action {
                Action::Up => self.selector.up(count),
                Action::Down => self.selector.down(count),
                Action::Submit => {
                    let index = self.selector.selected;
                    self.close_popup();
                    if let Some(change) = popup.change(index) {
                        self.apply_change(change);
                    }
                }
                Action::Escape => self.close_popup(),
                _ => {}
            }
            return None;
        }

        match action {
            Action::Submit => return self.submit(),
            Action::PageUp => self.scroll = self.scroll.saturating_sub(10),
            Action::PageDown => self.scroll = self.scroll.saturating_add(10),
            Action::ClearConversation => self.clear_conversation(),
            Action::ModelSelect => self.open_popup(Popup::Model),
            Action::PersonaSelect => self.open_popup(Popup::Persona),
            Action::TemperatureSelect => self.open_popup(Popup::Temperature),
            Action::TokensSelect => self.open_popup(Popup::Tokens),
            other => {
                self.input.handle_action(&other, width);
            }
        }
        None
    }

    /// Handle a terminal event
    pub fn handle_event(&mut self, event: Event, width: u16) -> Option<UiMessage> {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Press => None,
            Event::Mouse(mouse) => {
                match mouse.kind {
                    MouseEventKind::ScrollUp => self.scroll = self.scroll.saturating_sub(3),
                    MouseEventKind::ScrollDown => self.scroll = self.scroll.saturating_add(3),
                    _ => {}
                }
                None
            }
            other => event_to_action(other).and_then(|action| self.handle_action(action, width)),
        }
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let (main, sidebar) = if size.width >= SIDEBAR_MIN_SCREEN {
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Min(40), Constraint::Length(SIDEBAR_WIDTH)])
                .split(size);
            (columns[0], Some(columns[1]))
        } else {
            (size, None)
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // Messages
                Constraint::Length(1), // Status
                Constraint::Length(3), // Input
                Constraint::Length(1), // Footer
            ])
            .split(main);

        self.render_messages(frame, rows[0]);
        self.render_status(frame, rows[1]);
        self.input.render(rows[2], frame.buffer_mut(), &self.theme);
        self.render_footer(frame, rows[3]);

        if let Some(area) = sidebar {
            self.render_sidebar(frame, area);
        }

        if let Some(popup) = self.popup {
            let items = self.popup_items(popup);
            Selector::new(popup.title(), &items, &self.theme)
                .with_selected(self.selector.selected)
                .render_centered(size, frame.buffer_mut());
        }
    }

    fn popup_items(&self, popup: Popup) -> Vec<SelectorItem> {
        let settings = self.session.settings();
        match popup {
            Popup::Model => ModelId::ALL
                .iter()
                .map(|m| {
                    SelectorItem::new(m.id(), *m == settings.model())
                        .with_description(m.description())
                })
                .collect(),
            Popup::Persona => Persona::ALL
                .iter()
                .map(|p| {
                    SelectorItem::new(p.name(), *p == settings.persona())
                        .with_description(truncate_chars(p.instruction(), 44))
                })
                .collect(),
            Popup::Temperature => {
                let current = closest_index(&temperature_choices(), settings.temperature());
                temperature_choices()
                    .iter()
                    .enumerate()
                    .map(|(i, t)| SelectorItem::new(format!("{:.1}", t), i == current))
                    .collect()
            }
            Popup::Tokens => max_token_choices()
                .iter()
                .map(|&n| SelectorItem::new(n.to_string(), n == settings.max_tokens()))
                .collect(),
        }
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let title = format!(" parley │ {} ", self.session.settings().model().id());
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);

        if inner.height == 0 {
            return;
        }
        if self.messages.is_empty() {
            frame.render_widget(self.welcome(), inner);
            return;
        }

        let content_height =
            calculate_message_height(&self.messages, inner.width as usize, &self.theme);
        let max_scroll = content_height.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        let list = MessageList::new(&self.messages, &self.theme).scroll(self.scroll);
        frame.render_widget(list, inner);

        if content_height > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");
            let mut scrollbar_state = ScrollbarState::new(content_height)
                .position(self.scroll)
                .viewport_content_length(inner.height as usize);
            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn welcome(&self) -> Paragraph<'static> {
        let mut lines = vec![
            Line::from(""),
            Line::from(vec![
                Span::styled("  parley", self.theme.accent_bold()),
                Span::styled(" - chat with hosted open models", self.theme.dim_style()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                format!("  Model: {}", self.session.settings().model().name()),
                self.theme.dim_style(),
            )),
            Line::from(""),
            Line::from(Span::styled("  Keybindings", self.theme.warning_style())),
            Line::from(""),
        ];
        for (key, what) in KEYBINDINGS {
            lines.push(Line::from(vec![
                Span::styled(format!("    {:<10}", key), self.theme.accent_style()),
                Span::styled(*what, self.theme.base_style()),
            ]));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "  Type a question to get started, or /help for commands.",
            self.theme.dim_style(),
        )));
        Paragraph::new(lines)
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if self.session.is_busy() {
            let spinner =
                Spinner::new(THINKING_LABEL, &self.theme).with_start_time(self.spinner_start);
            if !self.status_is_error {
                frame.render_widget(spinner, area);
                return;
            }

            // Errors raised while waiting sit beside the spinner
            let columns = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(SPINNER_WIDTH), Constraint::Min(0)])
                .split(area);
            frame.render_widget(spinner, columns[0]);
            frame.render_widget(
                Paragraph::new(Span::styled(self.status.as_str(), self.theme.error_style())),
                columns[1],
            );
            return;
        }

        let style = if self.status_is_error {
            self.theme.error_style()
        } else {
            self.theme.dim_style()
        };
        let left = format!(" {}", self.status);
        let right = "/help for commands ";
        let left_width = left.chars().count();
        let right_width = right.chars().count();
        let available = area.width as usize;

        let line = if left_width + right_width + 2 <= available {
            Line::from(vec![
                Span::styled(left, style),
                Span::raw(" ".repeat(available - left_width - right_width)),
                Span::styled(right, self.theme.dim_style()),
            ])
        } else {
            Line::from(Span::styled(left, style))
        };
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_footer(&self, frame: &mut Frame, area: Rect) {
        let text = format!(" Conversation {} │ {}", self.session.id(), FOOTER_TAG);
        frame.render_widget(
            Paragraph::new(Span::styled(text, self.theme.dim_style())),
            area,
        );
    }

    fn render_sidebar(&self, frame: &mut Frame, area: Rect) {
        let settings = self.session.settings();
        let model = settings.model();
        let label = |text: &'static str| Line::from(Span::styled(text, self.theme.dim_style()));
        let value = |text: String| Line::from(Span::styled(text, self.theme.accent_bold()));

        let mut lines = vec![
            label("Model"),
            value(model.name().to_string()),
            Line::from(Span::styled(model.description(), self.theme.dim_style())),
            Line::from(""),
            label("Persona"),
            value(settings.persona().name().to_string()),
            Line::from(""),
            label("Temperature"),
            value(format!("{:.1}", settings.temperature())),
            Line::from(""),
            label("Max tokens"),
            value(settings.max_tokens().to_string()),
            Line::from(""),
            label("API key"),
            if self.has_credential {
                Line::from(Span::styled("configured", self.theme.success_style()))
            } else {
                Line::from(Span::styled("missing (GROQ_API_KEY)", self.theme.error_style()))
            },
            Line::from(""),
        ];
        for (key, what) in KEYBINDINGS.iter().skip(1) {
            lines.push(Line::from(vec![
                Span::styled(format!("{:<8}", key), self.theme.accent_style()),
                Span::styled(*what, self.theme.dim_style()),
            ]));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(" Settings ");
        frame.render_widget(
            Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
            area,
        );
    }
}

/// Index of the choice nearest to `value`
fn closest_index(choices: &[f32], value: f32) -> usize {
    choices
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| (*a - value).abs().total_cmp(&(*b - value).abs()))
        .map_or(0, |(i, _)| i)
}

/// Await `reply` while still handling input. Returns `None` if the user quit
/// first, which drops the request. `draw` renders a frame and reports the width.
async fn drive_request<S, F, D>(
    state: &mut TuiState,
    events: &mut S,
    tick: &mut Interval,
    reply: F,
    mut draw: D,
) -> anyhow::Result<Option<Reply>>
where
    S: Stream<Item = std::io::Result<Event>> + Unpin,
    F: Future<Output = Reply>,
    D: FnMut(&mut TuiState) -> anyhow::Result<u16>,
{
    let mut reply = std::pin::pin!(reply);

    loop {
        let width = draw(state)?;

        tokio::select! {
            biased;

            reply = &mut reply => return Ok(Some(reply)),

            event = events.next() => match event {
                // Input keeps working; a second Ask is refused by the session
                Some(Ok(event)) => {
                    if state.handle_event(event, width) == Some(UiMessage::Quit) {
                        return Ok(None);
                    }
                }
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(None),
            },

            _ = tick.tick() => {}
        }
    }
}

/// Poll events until the user quits
async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state: &mut TuiState,
    client: &ChatClient,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    // 80ms keeps the spinner smooth
    let mut tick = tokio::time::interval(Duration::from_millis(80));

    loop {
        terminal.draw(|frame| state.render(frame))?;
        let width = terminal.size()?.width;

        let question = tokio::select! {
            biased;

            event = events.next() => match event {
                Some(Ok(event)) => match state.handle_event(event, width) {
                    Some(UiMessage::Ask(question)) => question,
                    Some(UiMessage::Quit) => return Ok(()),
                    None => continue,
                },
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },

            _ = tick.tick() => continue,
        };

        let settings = *state.session().settings();
        let reply = drive_request(
            state,
            &mut events,
            &mut tick,
            client.generate(&question, &settings),
            |state| {
                terminal.draw(|frame| state.render(frame))?;
                Ok(terminal.size()?.width)
            },
        )
        .await?;

        match reply {
            Some(reply) => state.finish(&reply),
            None => return Ok(()),
        }
    }
}

/// Run the TUI application
pub async fn run_tui(session: ChatSession, client: &ChatClient, theme: Theme) -> anyhow::Result<()> {
    use crossterm::{
        event::{
            DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
        },
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    };

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

    let mut state = TuiState::new(session, theme, client.has_credential());
    tracing::info!(conversation = %state.session().id(), "tui started");

    let result = event_loop(&mut terminal, &mut state, client).await;

    // Restore the terminal even when the loop failed
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::{FAILURE_MESSAGE, Role};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use parley_tui::widgets::MessageKind;
    use ratatui::backend::TestBackend;

    fn state() -> TuiState {
        TuiState::new(ChatSession::new(), Theme::dark(), true)
    }

    fn type_text(state: &mut TuiState, text: &str) {
        for c in text.chars() {
            state.handle_action(Action::Char(c), 100);
        }
    }

    fn answered(text: &str, secs: f64) -> Reply {
        Reply {
            text: text.into(),
            elapsed_secs: secs,
            outcome: Outcome::Answered,
        }
    }

    fn screen_text(state: &mut TuiState, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| state.render(frame)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_submit_then_finish() {
        let mut state = state();
        type_text(&mut state, "  What is 2+2? ");

        let msg = state.handle_action(Action::Submit, 100);
        assert_eq!(msg, Some(UiMessage::Ask("What is 2+2?".into())));
        assert!(state.session().is_busy());
        assert_eq!(state.input.content(), "");
        assert_eq!(state.messages.len(), 1);

        state.finish(&answered("4", 0.42));
        assert!(!state.session().is_busy());
        assert_eq!(state.messages.len(), 2);
        assert_eq!(
            state.messages[1].caption.as_deref(),
            Some("Response generated in 0.42 seconds")
        );

        let snapshot = state.session().snapshot();
        assert_eq!(snapshot[0].role(), Role::User);
        assert_eq!(snapshot[1].content(), "4");
    }

    #[test]
    fn test_submit_refused_while_busy() {
        let mut state = state();
        type_text(&mut state, "first");
        state.handle_action(Action::Submit, 100);

        type_text(&mut state, "second");
        assert_eq!(state.handle_action(Action::Submit, 100), None);
        assert!(state.status_is_error);
        assert_eq!(state.input.content(), "second");
        assert_eq!(state.session().snapshot().len(), 1);
    }

    #[test]
    fn test_invalid_input_shown_inline() {
        let mut state = state();
        assert_eq!(state.handle_action(Action::Submit, 100), None);
        assert_eq!(state.status, "Please enter a valid question.");
        assert!(state.status_is_error);
        assert!(state.messages.is_empty());

        state.input.set_content("x".repeat(6000));
        assert_eq!(state.handle_action(Action::Submit, 100), None);
        assert!(state.status.contains("too long"));
        assert!(state.session().snapshot().is_empty());
        assert_eq!(state.input.char_count(), 6000);
    }

    #[test]
    fn test_failure_reply_is_error_without_caption() {
        let mut state = state();
        type_text(&mut state, "hi");
        state.handle_action(Action::Submit, 100);
        state.finish(&Reply {
            text: FAILURE_MESSAGE.into(),
            elapsed_secs: 0.0,
            outcome: Outcome::RemoteFailure {
                detail: "connection refused".into(),
            },
        });

        let last = state.messages.last().unwrap();
        assert!(last.is_error);
        assert_eq!(last.caption, None);
        assert_eq!(state.status, "Error: connection refused");
    }

    #[test]
    fn test_clear_conversation() {
        let mut state = state();
        type_text(&mut state, "hi");
        state.handle_action(Action::Submit, 100);
        state.finish(&answered("hello", 0.1));
        let before = state.session().id();

        state.handle_action(Action::ClearConversation, 100);
        assert!(state.messages.is_empty());
        assert!(state.session().snapshot().is_empty());
        assert_ne!(state.session().id(), before);
    }

    #[test]
    fn test_clear_refused_while_busy() {
        let mut state = state();
        type_text(&mut state, "hi");
        state.handle_action(Action::Submit, 100);

        state.handle_action(Action::ClearConversation, 100);
        assert!(state.status_is_error);
        assert_eq!(state.messages.len(), 1);
        assert!(state.session().is_busy());
    }

    #[test]
    fn test_persona_popup() {
        let mut state = state();
        state.handle_action(Action::PersonaSelect, 100);
        assert_eq!(state.popup, Some(Popup::Persona));
        assert_eq!(state.selector.selected, 0);

        // Typing goes nowhere while the popup is open
        state.handle_action(Action::Char('x'), 100);
        assert_eq!(state.input.content(), "");

        state.handle_action(Action::Down, 100);
        state.handle_action(Action::Down, 100);
        state.handle_action(Action::Submit, 100);
        assert_eq!(state.popup, None);
        assert_eq!(state.session().settings().persona(), Persona::Creative);
        assert_eq!(state.status, "Persona: Creative");
    }

    #[test]
    fn test_temperature_popup_starts_at_current() {
        let mut state = state();
        state.handle_action(Action::TemperatureSelect, 100);
        assert_eq!(state.selector.selected, 7);

        state.handle_action(Action::Up, 100);
        state.handle_action(Action::Submit, 100);
        assert_eq!(state.session().settings().temperature(), 0.6);
    }

    #[test]
    fn test_escape_closes_popup_without_change() {
        let mut state = state();
        state.handle_action(Action::ModelSelect, 100);
        state.handle_action(Action::Down, 100);
        state.handle_action(Action::Escape, 100);
        assert_eq!(state.popup, None);
        assert_eq!(state.session().settings().model(), ModelId::Gemma2_9b);
    }

    #[test]
    fn test_slash_commands() {
        let mut state = state();
        type_text(&mut state, "/tokens 400");
        assert_eq!(state.handle_action(Action::Submit, 100), None);
        assert_eq!(state.session().settings().max_tokens(), 400);
        assert!(state.session().snapshot().is_empty());

        type_text(&mut state, "/settings");
        state.handle_action(Action::Submit, 100);
        assert_eq!(state.messages.last().unwrap().kind, MessageKind::Notice);
        assert!(state.session().snapshot().is_empty());

        type_text(&mut state, "/quit");
        assert_eq!(
            state.handle_action(Action::Submit, 100),
            Some(UiMessage::Quit)
        );
    }

    #[test]
    fn test_slash_question_is_sent() {
        let mut state = state();
        type_text(&mut state, "/etc/hosts: what is this file for?");
        assert_eq!(
            state.handle_action(Action::Submit, 100),
            Some(UiMessage::Ask("/etc/hosts: what is this file for?".into()))
        );
        assert_eq!(state.session().snapshot().len(), 1);
        assert_eq!(state.messages[0].kind, MessageKind::User);
    }

    #[test]
    fn test_double_slash_escapes_command() {
        let mut state = state();
        type_text(&mut state, "//help");
        assert_eq!(
            state.handle_action(Action::Submit, 100),
            Some(UiMessage::Ask("/help".into()))
        );
        assert_eq!(state.session().snapshot()[0].content(), "/help");
    }

    #[test]
    fn test_exit_keys_quit_even_with_popup() {
        let mut state = state();
        state.handle_action(Action::ModelSelect, 100);
        assert_eq!(
            state.handle_action(Action::Interrupt, 100),
            Some(UiMessage::Quit)
        );
    }

    #[test]
    fn test_missing_key_status() {
        let state = TuiState::new(ChatSession::new(), Theme::dark(), false);
        assert!(state.status_is_error);
        assert!(state.status.contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_render_wide_screen() {
        let mut state = state();
        let text = screen_text(&mut state, 120, 40);
        assert!(text.contains(FOOTER_TAG));
        assert!(text.contains(&state.session().id().to_string()));
        assert!(text.contains("Settings"));
        assert!(text.contains("Keybindings"));
        assert!(text.contains("0/5000"));
    }

    #[test]
    fn test_render_narrow_screen_hides_sidebar() {
        let mut state = state();
        let text = screen_text(&mut state, 60, 30);
        assert!(!text.contains("Settings"));
    }

    #[test]
    fn test_busy_error_shown_beside_spinner() {
        let mut state = state();
        type_text(&mut state, "first");
        state.handle_action(Action::Submit, 100);
        type_text(&mut state, "second");
        state.handle_action(Action::Submit, 100);

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        terminal.draw(|frame| state.render(frame)).unwrap();
        let buffer = terminal.backend().buffer();
        let text: String = buffer.content().iter().map(|cell| cell.symbol()).collect();

        assert!(text.contains(THINKING_LABEL));
        let busy = "A question is already being answered";
        let at = text.find(busy).unwrap();
        let cell = &buffer.content()[text[..at].chars().count()];
        assert_eq!(cell.fg, Theme::dark().error);
    }

    #[test]
    fn test_render_popup() {
        let mut state = state();
        state.handle_action(Action::TokensSelect, 100);
        let text = screen_text(&mut state, 120, 40);
        assert!(text.contains("Max Tokens"));
        assert!(text.contains("1000"));
    }

    fn key(c: char) -> std::io::Result<Event> {
        Ok(Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)))
    }

    fn enter() -> std::io::Result<Event> {
        Ok(Event::Key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE)))
    }

    /// Scripted events, then silence
    fn scripted(
        events: Vec<std::io::Result<Event>>,
    ) -> impl Stream<Item = std::io::Result<Event>> + Unpin {
        futures::stream::iter(events).chain(futures::stream::pending())
    }

    #[tokio::test]
    async fn test_drive_request_refuses_second_question() {
        let mut state = state();
        type_text(&mut state, "first");
        state.handle_action(Action::Submit, 100);

        let mut events = scripted(vec![key('n'), key('o'), enter()]);
        let mut tick = tokio::time::interval(Duration::from_millis(80));
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let reply = async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            answered("4", 0.1)
        };

        let mut frames = 0;
        let reply = drive_request(&mut state, &mut events, &mut tick, reply, |state| {
            frames += 1;
            terminal.draw(|frame| state.render(frame))?;
            Ok(100)
        })
        .await
        .unwrap();

        assert_eq!(reply, Some(answered("4", 0.1)));
        assert!(frames >= 4);
        // The typed text stayed in the box and nothing was sent twice
        assert_eq!(state.input.content(), "no");
        assert_eq!(state.status, "A question is already being answered");
        assert_eq!(state.session().snapshot().len(), 1);

        state.finish(&reply.unwrap());
        assert_eq!(state.session().snapshot().len(), 2);
        assert!(!state.session().is_busy());
    }

    #[tokio::test]
    async fn test_drive_request_quit_drops_reply() {
        let mut state = state();
        type_text(&mut state, "first");
        state.handle_action(Action::Submit, 100);

        let ctrl_c = Ok(Event::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        let mut events = scripted(vec![ctrl_c]);
        let mut tick = tokio::time::interval(Duration::from_millis(80));

        let reply = drive_request(
            &mut state,
            &mut events,
            &mut tick,
            futures::future::pending::<Reply>(),
            |_| Ok(100),
        )
        .await
        .unwrap();

        assert_eq!(reply, None);
        assert_eq!(state.session().snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_drive_request_stream_error() {
        let mut state = state();
        let mut events = scripted(vec![Err(std::io::Error::other("tty gone"))]);
        let mut tick = tokio::time::interval(Duration::from_millis(80));

        let result = drive_request(
            &mut state,
            &mut events,
            &mut tick,
            futures::future::pending::<Reply>(),
            |_| Ok(80),
        )
        .await;

        assert_eq!(result.unwrap_err().to_string(), "tty gone");
    }

    #[test]
    fn test_closest_index() {
        let choices = temperature_choices();
        assert_eq!(closest_index(&choices, 0.0), 0);
        assert_eq!(closest_index(&choices, 0.74), 7);
        assert_eq!(closest_index(&choices, 1.0), 10);
    }
}
