//! Completion client adapter: question + settings in, [`Reply`] out.

use std::sync::Arc;
use std::time::Instant;

use parley_ai::{CompletionOptions, Context, PromptMessage};
use tracing::Instrument;

use crate::settings::GenerationSettings;
use crate::transport::{CompletionRun, Transport};

/// Answer text used when no API key is configured
pub const MISSING_KEY_MESSAGE: &str =
    "Error: GROQ_API_KEY not found in environment variables. Please configure your API key.";

/// Answer text used when the remote call fails
pub const FAILURE_MESSAGE: &str =
    "I'm sorry, I couldn't process your request. Please try again later.";

/// How a call ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The model produced the text
    Answered,
    /// No credential; nothing was sent
    MissingCredential,
    /// The remote call failed. `detail` is for operators, not the transcript.
    RemoteFailure { detail: String },
}

/// Result of one [`ChatClient::generate`] call
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Text to append to the transcript
    pub text: String,
    /// Wall-clock seconds spent in the call, two decimals; 0 on failure
    pub elapsed_secs: f64,
    pub outcome: Outcome,
}

impl Reply {
    fn answered(text: String, elapsed_secs: f64) -> Self {
        Self {
            text,
            elapsed_secs,
            outcome: Outcome::Answered,
        }
    }

    fn missing_credential() -> Self {
        Self {
            text: MISSING_KEY_MESSAGE.to_string(),
            elapsed_secs: 0.0,
            outcome: Outcome::MissingCredential,
        }
    }

    fn remote_failure(detail: String) -> Self {
        Self {
            text: FAILURE_MESSAGE.to_string(),
            elapsed_secs: 0.0,
            outcome: Outcome::RemoteFailure { detail },
        }
    }

    /// Whether the text is an error notice rather than a model answer
    pub fn is_failure(&self) -> bool {
        self.outcome != Outcome::Answered
    }

    /// Operator-facing error detail, if any
    pub fn failure_detail(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::RemoteFailure { detail } => Some(detail),
            _ => None,
        }
    }

    /// Caption shown under the answer
    pub fn caption(&self) -> String {
        format!("Response generated in {:.2} seconds", self.elapsed_secs)
    }
}

/// Round to two decimal places
fn round2(secs: f64) -> f64 {
    (secs * 100.0).round() / 100.0
}

/// Turns questions into replies through a [`Transport`]
pub struct ChatClient {
    transport: Arc<dyn Transport>,
    api_key: Option<String>,
    trace_project: Option<String>,
}

impl ChatClient {
    /// Create a client. A blank key counts as missing.
    pub fn new(transport: Arc<dyn Transport>, api_key: Option<String>) -> Self {
        Self {
            transport,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            trace_project: None,
        }
    }

    /// Tag every call with a trace project name
    pub fn with_trace_project(mut self, project: impl Into<String>) -> Self {
        self.trace_project = Some(project.into());
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    /// Build the two-turn request for a question
    pub fn build_run(question: &str, settings: &GenerationSettings) -> CompletionRun {
        let mut context = Context::with_system(settings.persona().instruction());
        context.push(PromptMessage::user(question));

        CompletionRun {
            model: settings.model(),
            context,
            options: CompletionOptions {
                max_tokens: Some(settings.max_tokens()),
                temperature: Some(settings.temperature()),
            },
        }
    }

    /// Ask one question. Never fails: every error becomes a failure reply.
    pub async fn generate(&self, question: &str, settings: &GenerationSettings) -> Reply {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::warn!("no API key configured, skipping completion call");
            return Reply::missing_credential();
        };

        let run = Self::build_run(question, settings);
        let span = tracing::info_span!(
            "completion",
            model = settings.model().id(),
            persona = settings.persona().name(),
            project = self.trace_project.as_deref().unwrap_or(""),
        );

        let start = Instant::now();
        let result = self.transport.run(api_key, &run).instrument(span).await;
        let elapsed = round2(start.elapsed().as_secs_f64());

        match result {
            Ok(completion) => {
                tracing::debug!(
                    elapsed,
                    input_tokens = completion.usage.input,
                    output_tokens = completion.usage.output,
                    "completion finished"
                );
                Reply::answered(completion.text, elapsed)
            }
            Err(e) => {
                tracing::error!(error = %e, model = settings.model().id(), "completion failed");
                Reply::remote_failure(e.to_string())
            }
        }
    }
}
