//! Transport abstraction for completion calls

use async_trait::async_trait;
use parley_ai::{
    Completion, CompletionOptions, Context, ModelId, Result,
    providers::{LlmProvider, groq::GroqProvider},
};

/// Everything one completion call needs besides the credential
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRun {
    /// Model to use
    pub model: ModelId,
    /// System prompt and turns
    pub context: Context,
    /// Sampling options
    pub options: CompletionOptions,
}

/// Something that can answer a completion run
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue exactly one request
    async fn run(&self, api_key: &str, run: &CompletionRun) -> Result<Completion>;
}

/// Direct provider transport - calls the hosted API
pub struct ProviderTransport {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl ProviderTransport {
    /// Create a new provider transport
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: None,
        }
    }

    /// Override the API root (OpenAI-compatible servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }
}

impl Default for ProviderTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for ProviderTransport {
    async fn run(&self, api_key: &str, run: &CompletionRun) -> Result<Completion> {
        let mut provider = GroqProvider::with_client(self.client.clone(), api_key);
        if let Some(ref base_url) = self.base_url {
            provider = provider.with_base_url(base_url.clone());
        }
        provider.complete(run.model, &run.context, &run.options).await
    }
}
