//! parley-ai: chat-completion layer
//!
//! Wire types, the model catalog and the Groq provider used by the rest of
//! the workspace. The remote API is OpenAI-compatible; only non-streaming
//! completions are supported.

pub mod error;
pub mod models;
pub mod providers;
pub mod types;

pub use error::{Error, Result};
pub use models::ModelId;
pub use types::*;
