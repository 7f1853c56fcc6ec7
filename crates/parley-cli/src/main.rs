//! parley - terminal chat with hosted LLMs

mod commands;
mod config;
mod ui;
mod utils;

use std::sync::Arc;

use clap::Parser;
use parley_core::{
    ChatClient, ChatSession, Environment, GenerationSettings, ModelId, Persona, ProviderTransport,
    settings::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE},
};
use parley_tui::Theme;

use crate::commands::{
    CommandResult, ModelCommand, PersonaCommand, TemperatureCommand, TokensCommand,
};

/// Log filter used with --verbose when RUST_LOG is unset
const DEFAULT_LOG_FILTER: &str = "parley=debug,parley_core=debug,parley_ai=debug";

/// parley - chat with hosted open models from the terminal
#[derive(Parser, Debug)]
#[command(name = "parley")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Model id (gemma2-9b-it, llama-3.1-8b-instant, qwen-2.5-32b)
    #[arg(short, long)]
    model: Option<String>,

    /// Persona (Default, Professional, Creative, Concise)
    #[arg(short, long)]
    persona: Option<String>,

    /// Sampling temperature, 0.0 to 1.0
    #[arg(short, long)]
    temperature: Option<f32>,

    /// Maximum answer length in tokens, 50 to 1000
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Ask a single question and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Verbose output (logs to stderr, RUST_LOG overrides the filter)
    #[arg(short, long)]
    verbose: bool,

    /// Disable TUI mode (use simple stdin/stdout)
    #[arg(long)]
    no_tui: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// List available models and exit
    #[arg(long)]
    list_models: bool,
}

fn init_tracing(verbose: bool) {
    if !verbose {
        return;
    }
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Merge flags over the config file over built-in defaults
fn resolve_settings(args: &Args, cfg: &config::Config) -> anyhow::Result<GenerationSettings> {
    let model = match args.model.as_deref().or(cfg.model.as_deref()) {
        Some(id) => ModelId::parse(id)
            .ok_or_else(|| parley_core::Error::UnknownModel(id.to_string()))?,
        None => ModelId::default(),
    };
    let persona = match args.persona.as_deref().or(cfg.persona.as_deref()) {
        Some(name) => name.parse::<Persona>()?,
        None => Persona::default(),
    };
    let temperature = args
        .temperature
        .or(cfg.temperature)
        .unwrap_or(DEFAULT_TEMPERATURE);
    let max_tokens = args
        .max_tokens
        .or(cfg.max_tokens)
        .unwrap_or(DEFAULT_MAX_TOKENS);

    Ok(GenerationSettings::new(
        model,
        temperature,
        max_tokens,
        persona,
    )?)
}

fn resolve_theme(cfg: &config::Config) -> anyhow::Result<Theme> {
    match cfg.theme.as_deref() {
        Some(name) => {
            Theme::by_name(name).ok_or_else(|| anyhow::anyhow!("Unknown theme: {}", name))
        }
        None => Ok(Theme::default()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Initialize config and exit
    if args.init_config {
        match config::Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let cfg = config::Config::load();
    let settings = resolve_settings(&args, &cfg)?;

    if args.list_models {
        println!("{}", ModelCommand::list_models_text(settings.model()));
        return Ok(());
    }

    let env = Environment::from_env().with_fallback_api_key(cfg.groq_api_key());
    if env.api_key.is_none() {
        tracing::warn!("GROQ_API_KEY is not set; answers will be an error notice");
    }

    let mut transport = ProviderTransport::new();
    if let Some(base_url) = cfg.base_url.as_deref() {
        tracing::debug!(base_url, "using custom API root");
        transport = transport.with_base_url(base_url);
    }

    let mut client = ChatClient::new(Arc::new(transport), env.api_key.clone());
    if let Some(trace) = &env.tracing {
        tracing::info!(project = %trace.project, "trace pass-through enabled");
        client = client.with_trace_project(trace.project.clone());
    }

    let session = ChatSession::with_settings(settings);
    tracing::debug!(
        conversation = %session.id(),
        model = settings.model().id(),
        persona = settings.persona().name(),
        "session started"
    );

    // Non-interactive mode
    if let Some(question) = args.command {
        return run_command(session, &client, &question).await;
    }

    let use_tui = !args.no_tui && cfg.tui.unwrap_or(true);
    if use_tui {
        return ui::run_tui(session, &client, resolve_theme(&cfg)?).await;
    }

    run_interactive(session, &client).await
}

/// Ask one question, print the answer. Exits with status 1 on any failure.
async fn run_command(
    mut session: ChatSession,
    client: &ChatClient,
    question: &str,
) -> anyhow::Result<()> {
    let exchange = match session.submit_question(client, question).await {
        Ok(exchange) => exchange,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let reply = exchange.reply;
    println!("{}", reply.text);
    if reply.is_failure() {
        if let Some(detail) = reply.failure_detail() {
            eprintln!("Error: {}", detail);
        }
        std::process::exit(1);
    }

    println!();
    println!("[{}]", reply.caption());
    Ok(())
}

/// Plain stdin/stdout loop
async fn run_interactive(mut session: ChatSession, client: &ChatClient) -> anyhow::Result<()> {
    use std::io::{self, IsTerminal, Write};

    // Show minimal startup info (only if TTY)
    if io::stderr().is_terminal() {
        eprintln!(
            "parley ({}) conversation: {}",
            session.settings().model().id(),
            session.id()
        );
        if !client.has_credential() {
            eprintln!("Warning: GROQ_API_KEY is not set");
        }
        eprintln!("Type /help for commands.");
        eprintln!();
    }

    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut input = String::new();
        if io::stdin().read_line(&mut input)? == 0 {
            // EOF
            break;
        }
        if handle_line(&mut session, client, &input, &mut stdout).await? == LineFlow::Exit {
            break;
        }
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
enum LineFlow {
    Continue,
    Exit,
}

/// Run one line of line-mode input: a slash command or a question
async fn handle_line<W: std::io::Write>(
    session: &mut ChatSession,
    client: &ChatClient,
    input: &str,
    out: &mut W,
) -> std::io::Result<LineFlow> {
    if input.trim().is_empty() {
        return Ok(LineFlow::Continue);
    }

    if let Some(result) = commands::execute_command(input, session.settings()) {
        let settings = *session.settings();
        match result {
            CommandResult::Clear => {
                session.clear();
                writeln!(out, "Cleared conversation. New conversation: {}", session.id())?;
            }
            CommandResult::Exit => return Ok(LineFlow::Exit),
            CommandResult::Message(msg) => writeln!(out, "{}", msg)?,
            // No popups here, list the choices instead
            CommandResult::OpenModelSelector => {
                writeln!(out, "{}", ModelCommand::list_models_text(settings.model()))?
            }
            CommandResult::OpenPersonaSelector => {
                writeln!(out, "{}", PersonaCommand::list_personas_text(settings.persona()))?
            }
            CommandResult::OpenTemperatureSelector => {
                writeln!(out, "{}", TemperatureCommand::list_text(settings.temperature()))?
            }
            CommandResult::OpenTokensSelector => {
                writeln!(out, "{}", TokensCommand::list_text(settings.max_tokens()))?
            }
            change => {
                if let Some(msg) = change.apply(session.settings_mut()) {
                    writeln!(out, "{}", msg)?;
                }
            }
        }
        return Ok(LineFlow::Continue);
    }

    let question = commands::question_text(input);
    match session.submit_question(client, question).await {
        Ok(exchange) => {
            let reply = exchange.reply;
            writeln!(out, "{}", reply.text)?;
            if let Some(detail) = reply.failure_detail() {
                eprintln!("[error: {}]", detail);
            } else if !reply.is_failure() {
                writeln!(out, "[{}]", reply.caption())?;
            }
            writeln!(out)?;
        }
        Err(e) => eprintln!("{}", e),
    }
    Ok(LineFlow::Continue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn args(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("parley").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let settings = resolve_settings(&args(&[]), &config::Config::default()).unwrap();
        assert_eq!(settings, GenerationSettings::default());
    }

    #[test]
    fn test_flags_override_config() {
        let cfg = config::Config {
            model: Some("qwen-2.5-32b".into()),
            persona: Some("Creative".into()),
            temperature: Some(0.2),
            ..config::Config::default()
        };
        let settings = resolve_settings(
            &args(&["-m", "llama-3.1-8b-instant", "--max-tokens", "800"]),
            &cfg,
        )
        .unwrap();

        assert_eq!(settings.model(), ModelId::Llama31_8b);
        assert_eq!(settings.persona(), Persona::Creative);
        assert_eq!(settings.temperature(), 0.2);
        assert_eq!(settings.max_tokens(), 800);
    }

    #[test]
    fn test_unknown_values_fail_loudly() {
        let cfg = config::Config::default();
        let err = resolve_settings(&args(&["--model", "gpt-4o"]), &cfg).unwrap_err();
        assert_eq!(err.to_string(), "Unknown model: gpt-4o");

        let err = resolve_settings(&args(&["--persona", "pirate"]), &cfg).unwrap_err();
        assert_eq!(err.to_string(), "Unknown persona: pirate");

        let err = resolve_settings(&args(&["--temperature", "1.5"]), &cfg).unwrap_err();
        assert!(err.to_string().starts_with("Invalid setting"));

        let cfg = config::Config {
            max_tokens: Some(10),
            ..config::Config::default()
        };
        assert!(resolve_settings(&args(&[]), &cfg).is_err());
    }

    #[test]
    fn test_one_shot_flags() {
        let a = args(&["-c", "What is 2+2?", "--no-tui", "-v"]);
        assert_eq!(a.command.as_deref(), Some("What is 2+2?"));
        assert!(a.no_tui);
        assert!(a.verbose);
    }

    /// Client with no key: replies come back without touching the network
    fn offline_client() -> ChatClient {
        ChatClient::new(Arc::new(ProviderTransport::new()), None)
    }

    #[tokio::test]
    async fn test_line_mode_sends_slash_question() {
        let mut session = ChatSession::new();
        let mut out = Vec::new();

        let flow = handle_line(
            &mut session,
            &offline_client(),
            "/etc/hosts: what is this file for?\n",
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(flow, LineFlow::Continue);
        let snapshot = session.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].content(), "/etc/hosts: what is this file for?");
        assert_eq!(snapshot[1].content(), parley_core::MISSING_KEY_MESSAGE);
        assert!(String::from_utf8(out).unwrap().contains("GROQ_API_KEY"));
    }

    #[tokio::test]
    async fn test_line_mode_commands() {
        let mut session = ChatSession::new();
        let client = offline_client();
        let mut out = Vec::new();

        handle_line(&mut session, &client, "/persona concise\n", &mut out)
            .await
            .unwrap();
        assert_eq!(session.settings().persona(), Persona::Concise);

        handle_line(&mut session, &client, "//help\n", &mut out)
            .await
            .unwrap();
        assert_eq!(session.snapshot()[0].content(), "/help");

        handle_line(&mut session, &client, "   \n", &mut out)
            .await
            .unwrap();
        assert_eq!(session.snapshot().len(), 2);

        let flow = handle_line(&mut session, &client, "/quit\n", &mut out)
            .await
            .unwrap();
        assert_eq!(flow, LineFlow::Exit);

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Persona: Concise"));
    }

    #[test]
    fn test_theme_from_config() {
        let cfg = config::Config {
            theme: Some("light".into()),
            ..config::Config::default()
        };
        assert_eq!(resolve_theme(&cfg).unwrap(), Theme::light());

        let cfg = config::Config {
            theme: Some("neon".into()),
            ..config::Config::default()
        };
        assert!(resolve_theme(&cfg).is_err());
    }
}
