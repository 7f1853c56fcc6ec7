//! Core types for completion requests

/// Speaker of a prompt turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One turn of a prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptMessage {
    pub role: Role,
    pub content: String,
}

impl PromptMessage {
    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Context for a completion request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Context {
    /// System prompt, sent as the first turn
    pub system_prompt: Option<String>,
    /// Conversation turns after the system prompt
    pub messages: Vec<PromptMessage>,
}

impl Context {
    /// Create a new context with a system prompt
    pub fn with_system(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: Some(system_prompt.into()),
            messages: vec![],
        }
    }

    /// Add a turn to the context
    pub fn push(&mut self, message: PromptMessage) {
        self.messages.push(message);
    }
}

/// Sampling options for a completion request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompletionOptions {
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    /// Temperature
    pub temperature: Option<f32>,
}

/// Token usage reported by the endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub input: u32,
    pub output: u32,
}

/// Reason why generation stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Natural end of response
    Stop,
    /// Maximum tokens reached
    Length,
}

impl StopReason {
    /// Parse an OpenAI-style `finish_reason`
    pub fn from_finish_reason(reason: &str) -> Option<Self> {
        match reason {
            "stop" => Some(StopReason::Stop),
            "length" => Some(StopReason::Length),
            _ => None,
        }
    }
}

/// A finished completion
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Generated text
    pub text: String,
    /// Model id echoed by the endpoint
    pub model: String,
    /// Token usage
    pub usage: Usage,
    /// Why generation stopped, if reported
    pub stop_reason: Option<StopReason>,
}
