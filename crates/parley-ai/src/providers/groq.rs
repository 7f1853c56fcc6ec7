//! Groq chat completions provider (OpenAI-compatible API)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::LlmProvider;
use crate::{
    error::{Error, Result},
    models::ModelId,
    types::{Completion, CompletionOptions, Context, Role, StopReason, Usage},
};

/// Default API root
pub const BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Groq API client
pub struct GroqProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GroqProvider {
    /// Create a new provider with an API key
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), api_key)
    }

    /// Create a provider that reuses an existing HTTP client
    pub fn with_client(client: reqwest::Client, api_key: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Point the provider at another OpenAI-compatible root
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn build_request(
        &self,
        model: ModelId,
        context: &Context,
        options: &CompletionOptions,
    ) -> ChatRequest {
        let mut messages = Vec::with_capacity(context.messages.len() + 1);

        if let Some(ref system_prompt) = context.system_prompt {
            messages.push(ChatMessage {
                role: Role::System.as_str(),
                content: system_prompt.clone(),
            });
        }

        for msg in &context.messages {
            messages.push(ChatMessage {
                role: msg.role.as_str(),
                content: msg.content.clone(),
            });
        }

        ChatRequest {
            model: model.id(),
            messages,
            stream: false,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        }
    }
}

#[async_trait]
impl LlmProvider for GroqProvider {
    async fn complete(
        &self,
        model: ModelId,
        context: &Context,
        options: &CompletionOptions,
    ) -> Result<Completion> {
        if self.api_key.trim().is_empty() {
            return Err(Error::InvalidApiKey);
        }

        let request = self.build_request(model, context, options);
        let url = format!("{}/chat/completions", self.base_url);

        tracing::debug!(model = model.id(), turns = request.messages.len(), "sending completion request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();
            return Err(Error::from_status(status.as_u16(), retry_after, &body));
        }

        let body = response.text().await?;
        parse_response(&body)
    }
}

/// Decode a successful chat completion body
fn parse_response(body: &str) -> Result<Completion> {
    let response: ChatResponse = serde_json::from_str(body)?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| Error::UnexpectedResponse("response contained no choices".to_string()))?;

    let text = choice
        .message
        .content
        .ok_or_else(|| Error::UnexpectedResponse("choice has no message content".to_string()))?;

    let usage = response
        .usage
        .map(|u| Usage {
            input: u.prompt_tokens,
            output: u.completion_tokens,
        })
        .unwrap_or_default();

    Ok(Completion {
        text,
        model: response.model,
        usage,
        stop_reason: choice
            .finish_reason
            .as_deref()
            .and_then(StopReason::from_finish_reason),
    })
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: &'static str,
    messages: Vec<ChatMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
}
