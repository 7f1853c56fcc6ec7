//! Slash commands for interactive mode

mod model;
mod persona;
mod sampling;

pub use model::ModelCommand;
pub use persona::PersonaCommand;
pub use sampling::{TemperatureCommand, TokensCommand};

use parley_core::{GenerationSettings, ModelId, Persona};

/// Result of executing a slash command
#[derive(Debug, Clone, PartialEq)]
pub enum CommandResult {
    /// Clear the conversation
    Clear,
    /// Exit the application
    Exit,
    /// Show a message to the user (never sent to the model)
    Message(String),
    ChangeModel(ModelId),
    ChangePersona(Persona),
    ChangeTemperature(f32),
    ChangeMaxTokens(u32),
    /// Open a popup (TUI) or print the choices (line mode)
    OpenModelSelector,
    OpenPersonaSelector,
    OpenTemperatureSelector,
    OpenTokensSelector,
}

impl CommandResult {
    /// Apply a settings change. Returns the confirmation to show, or `None`
    /// if this result does not change settings.
    pub fn apply(&self, settings: &mut GenerationSettings) -> Option<String> {
        let outcome = match *self {
            CommandResult::ChangeModel(model) => {
                settings.set_model(model);
                Ok(format!("Model: {} ({})", model.name(), model.id()))
            }
            CommandResult::ChangePersona(persona) => {
                settings.set_persona(persona);
                Ok(format!("Persona: {}", persona))
            }
            CommandResult::ChangeTemperature(value) => settings
                .set_temperature(value)
                .map(|()| format!("Temperature: {:.1}", value)),
            CommandResult::ChangeMaxTokens(value) => settings
                .set_max_tokens(value)
                .map(|()| format!("Max tokens: {}", value)),
            _ => return None,
        };
        Some(outcome.unwrap_or_else(|e| e.to_string()))
    }
}

/// Parse and execute a slash command.
///
/// Returns `None` for anything that should be asked instead: text without a
/// leading `/`, a `/` followed by a word that is not a command (paths such as
/// `/etc/hosts`), and text escaped with `//`.
pub fn execute_command(input: &str, settings: &GenerationSettings) -> Option<CommandResult> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let (command, args) = match rest.split_once(char::is_whitespace) {
        Some((command, args)) => (command, args.trim()),
        None => (rest, ""),
    };

    Some(match command.to_lowercase().as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),
        "clear" | "c" => CommandResult::Clear,
        "quit" | "exit" | "q" => CommandResult::Exit,
        "model" | "m" => ModelCommand::execute(args),
        "persona" | "p" => PersonaCommand::execute(args),
        "temperature" | "temp" | "t" => TemperatureCommand::execute(args),
        "tokens" | "max-tokens" => TokensCommand::execute(args),
        "settings" | "s" => CommandResult::Message(describe_settings(settings)),
        _ => return None,
    })
}

/// The question to send for input that is not a command. A leading `//`
/// loses one slash, so `//help` asks the model about "/help".
pub fn question_text(input: &str) -> &str {
    let trimmed = input.trim_start();
    if trimmed.starts_with("//") {
        &trimmed[1..]
    } else {
        input
    }
}

/// Multi-line summary of the current settings
pub fn describe_settings(settings: &GenerationSettings) -> String {
    let model = settings.model();
    format!(
        "Model:       {} ({})\n             {}\nPersona:     {}\nTemperature: {:.1}\nMax tokens:  {}",
        model.name(),
        model.id(),
        model.description(),
        settings.persona(),
        settings.temperature(),
        settings.max_tokens(),
    )
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?            Show this help message
  /model, /m [id]          Choose a model or switch to one
  /persona, /p [name]      Choose a persona or switch to one
  /temperature, /t [0-1]   Show or set the sampling temperature
  /tokens [50-1000]        Show or set the answer length limit
  /settings, /s            Show the current settings
  /clear, /c               Clear the conversation
  /quit, /exit, /q         Exit parley

Anything else is sent as a question. Start with // to ask about a
command name, e.g. "//help" sends "/help".

Examples:
  /model llama             Switch to the first model matching "llama"
  /persona concise         Short, direct answers
  /temperature 0.2         More deterministic answers
  /tokens 500              Allow longer answers"#
        .to_string()
}
