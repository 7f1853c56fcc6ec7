//! Error types for parley-core

use thiserror::Error;

use crate::validate::InputError;

/// Result type alias using parley-core Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while driving a chat session
#[derive(Error, Debug)]
pub enum Error {
    /// The question was rejected before sending
    #[error(transparent)]
    Input(#[from] InputError),

    /// A question is already waiting for its answer
    #[error("A question is already being answered")]
    Busy,

    /// Model id not in the catalog
    #[error("Unknown model: {0}")]
    UnknownModel(String),

    /// Persona name not in the registry
    #[error("Unknown persona: {0}")]
    UnknownPersona(String),

    /// Generation setting out of range
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
}

impl Error {
    /// Whether this error should be shown inline next to the input box
    /// rather than as a failure of the conversation.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Error::Input(_) | Error::Busy)
    }
}
