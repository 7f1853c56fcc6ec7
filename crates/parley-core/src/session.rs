//! Chat session: transcript, conversation id, pending input and settings.
//!
//! A session is an explicit value owned by whoever drives it (the TUI, the
//! line-mode loop, a one-shot command). Sessions share nothing, so two of
//! them never observe each other's transcript.
//!
//! Submitting a question is split into [`ChatSession::begin`] and
//! [`ChatSession::complete`] so that a front-end can keep rendering while
//! the reply future runs. [`ChatSession::submit_question`] does both in one
//! call.

use crate::client::{ChatClient, Reply};
use crate::error::{Error, Result};
use crate::pending::PendingInput;
use crate::settings::GenerationSettings;
use crate::transcript::{ConversationId, Message, Role, Transcript};
use crate::validate::validate_question;

/// One question and its reply
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub question: String,
    pub reply: Reply,
}

/// State for one conversation
#[derive(Debug, Default)]
pub struct ChatSession {
    id: ConversationId,
    transcript: Transcript,
    pending: PendingInput,
    settings: GenerationSettings,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: GenerationSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Ordered messages for rendering
    pub fn snapshot(&self) -> &[Message] {
        self.transcript.snapshot()
    }

    pub fn pending(&self) -> &PendingInput {
        &self.pending
    }

    pub fn is_busy(&self) -> bool {
        !self.pending.is_idle()
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Settings are read fresh on every request, so edits apply to the next one
    pub fn settings_mut(&mut self) -> &mut GenerationSettings {
        &mut self.settings
    }

    /// Append one message
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> &Message {
        self.transcript.push(role, content)
    }

    /// Empty the transcript, start a new conversation id and drop pending input
    pub fn clear(&mut self) {
        self.transcript.clear();
        self.id = ConversationId::new();
        self.pending.reset();
        tracing::debug!(conversation = %self.id, "conversation cleared");
    }

    /// Validate a question and record it as sent.
    ///
    /// On success the user message is in the transcript and the session is
    /// waiting for [`complete`](Self::complete). On error nothing changes.
    pub fn begin(&mut self, text: &str) -> Result<String> {
        if !self.pending.is_idle() {
            return Err(Error::Busy);
        }
        let question = validate_question(text)?;

        self.pending.capture(question)?;
        let question = self.pending.dispatch().ok_or(Error::Busy)?;
        self.transcript.push(Role::User, question.clone());
        Ok(question)
    }

    /// Record the reply for the question started with [`begin`](Self::begin)
    pub fn complete(&mut self, reply: &Reply) {
        if !self.pending.is_sending() {
            tracing::warn!("reply arrived with no question in flight, dropping it");
            return;
        }
        self.transcript.push(Role::Assistant, reply.text.clone());
        self.pending.settle();
    }

    /// Validate, send, and record one question and its reply
    pub async fn submit_question(&mut self, client: &ChatClient, text: &str) -> Result<Exchange> {
        let question = self.begin(text)?;
        let reply = client.generate(&question, &self.settings).await;
        self.complete(&reply);
        Ok(Exchange { question, reply })
    }
}
