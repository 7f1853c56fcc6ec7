//! Model catalog: the fixed set of hosted models the front-end offers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported hosted models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModelId {
    #[serde(rename = "gemma2-9b-it")]
    Gemma2_9b,
    #[serde(rename = "llama-3.1-8b-instant")]
    Llama31_8b,
    #[serde(rename = "qwen-2.5-32b")]
    Qwen25_32b,
}

impl ModelId {
    /// All models, in selector order. The first entry is the default.
    pub const ALL: [ModelId; 3] = [ModelId::Gemma2_9b, ModelId::Llama31_8b, ModelId::Qwen25_32b];

    /// Identifier sent on the wire
    pub fn id(&self) -> &'static str {
        match self {
            ModelId::Gemma2_9b => "gemma2-9b-it",
            ModelId::Llama31_8b => "llama-3.1-8b-instant",
            ModelId::Qwen25_32b => "qwen-2.5-32b",
        }
    }

    /// Human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            ModelId::Gemma2_9b => "Gemma2-9b-It",
            ModelId::Llama31_8b => "LLaMA 3.1 8B Instant",
            ModelId::Qwen25_32b => "Qwen 2.5 32B",
        }
    }

    /// One-line description shown next to the selector
    pub fn description(&self) -> &'static str {
        match self {
            ModelId::Gemma2_9b => "Google's Gemma 2 9B - Lightweight model good for simple tasks",
            ModelId::Llama31_8b => "Meta's LLaMA 3.1 - Fast and efficient for interactive chat",
            ModelId::Qwen25_32b => "Alibaba's Qwen 2.5 32B - Powerful model for complex responses",
        }
    }

    /// Look up a model by wire id (case-insensitive).
    pub fn parse(id: &str) -> Option<ModelId> {
        let id = id.trim();
        Self::ALL
            .into_iter()
            .find(|m| m.id().eq_ignore_ascii_case(id))
    }

    /// Position in [`ModelId::ALL`]
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|m| m == self).unwrap_or(0)
    }
}

impl Default for ModelId {
    fn default() -> Self {
        Self::ALL[0]
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}
