//! Question validation

use thiserror::Error;

/// Longest question accepted, in characters
pub const MAX_QUESTION_CHARS: usize = 5000;

/// Why a question was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Nothing but whitespace
    #[error("Please enter a valid question.")]
    Empty,

    /// Longer than [`MAX_QUESTION_CHARS`]
    #[error("Your question is too long. Please keep it under 5000 characters.")]
    TooLong { chars: usize },
}

/// Check a raw question and return it trimmed.
///
/// The length limit applies to the untrimmed input.
pub fn validate_question(text: &str) -> Result<String, InputError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(InputError::Empty);
    }

    let chars = text.chars().count();
    if chars > MAX_QUESTION_CHARS {
        return Err(InputError::TooLong { chars });
    }

    Ok(trimmed.to_string())
}
