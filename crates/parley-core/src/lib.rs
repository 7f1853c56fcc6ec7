//! parley-core: chat session and completion adapter
//!
//! This crate owns everything between the user's keystrokes and the remote
//! model: input validation, personas, generation settings, the transcript,
//! the pending-input state machine and the adapter that turns a question
//! into a [`Reply`].

pub mod client;
pub mod config;
pub mod error;
pub mod pending;
pub mod persona;
pub mod session;
pub mod settings;
pub mod transcript;
pub mod transport;
pub mod validate;

#[cfg(test)]
mod testing;

pub use client::{ChatClient, FAILURE_MESSAGE, MISSING_KEY_MESSAGE, Outcome, Reply};
pub use config::{Environment, TraceSettings};
pub use error::{Error, Result};
pub use pending::PendingInput;
pub use persona::Persona;
pub use session::{ChatSession, Exchange};
pub use settings::GenerationSettings;
pub use transcript::{ConversationId, Message, Role, Transcript};
pub use transport::{ProviderTransport, Transport};
pub use validate::{InputError, MAX_QUESTION_CHARS, validate_question};

pub use parley_ai::ModelId;
