//! Completion provider implementations

pub mod groq;

use crate::{Completion, CompletionOptions, Context, ModelId, Result};
use async_trait::async_trait;

/// Trait for completion providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Request one complete (non-streamed) response
    async fn complete(
        &self,
        model: ModelId,
        context: &Context,
        options: &CompletionOptions,
    ) -> Result<Completion>;
}
