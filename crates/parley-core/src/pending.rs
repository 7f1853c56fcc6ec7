//! Pending-input state machine.
//!
//! Sequences one question at a time through capture, dispatch and settle:
//!
//! ```text
//! Idle --capture--> Captured --dispatch--> Sending --settle--> Idle
//! ```
//!
//! `capture` is refused unless the machine is idle, so a second `Sending`
//! can only happen after the first has settled.

use crate::error::{Error, Result};

/// Where the current question is in its lifecycle
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PendingInput {
    /// No question pending
    #[default]
    Idle,
    /// Text accepted, not yet sent
    Captured(String),
    /// Sent, waiting for the reply
    Sending,
}

impl PendingInput {
    /// Accept a new question. Only valid when idle.
    pub fn capture(&mut self, text: impl Into<String>) -> Result<()> {
        match self {
            PendingInput::Idle => {
                *self = PendingInput::Captured(text.into());
                Ok(())
            }
            _ => Err(Error::Busy),
        }
    }

    /// Hand the captured question to the sender.
    ///
    /// Returns `None` (and changes nothing) unless a question is captured.
    pub fn dispatch(&mut self) -> Option<String> {
        match std::mem::take(self) {
            PendingInput::Captured(text) => {
                *self = PendingInput::Sending;
                Some(text)
            }
            other => {
                *self = other;
                None
            }
        }
    }

    /// Mark the in-flight question as answered
    pub fn settle(&mut self) {
        if *self == PendingInput::Sending {
            *self = PendingInput::Idle;
        }
    }

    /// Forget any pending question
    pub fn reset(&mut self) {
        *self = PendingInput::Idle;
    }

    pub fn is_idle(&self) -> bool {
        *self == PendingInput::Idle
    }

    pub fn is_sending(&self) -> bool {
        *self == PendingInput::Sending
    }
}
