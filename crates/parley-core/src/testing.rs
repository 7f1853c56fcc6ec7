//! Stub transport shared by the unit tests

use async_trait::async_trait;
use parking_lot::Mutex;
use parley_ai::{Completion, Error, Result, Usage};

use crate::transport::{CompletionRun, Transport};

enum Behavior {
    Answer(String),
    Fail(String),
}

/// Records every call and answers with a canned result
pub struct StubTransport {
    behavior: Behavior,
    calls: Mutex<Vec<(String, CompletionRun)>>,
}

impl StubTransport {
    pub fn answering(text: &str) -> Self {
        Self {
            behavior: Behavior::Answer(text.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            behavior: Behavior::Fail(message.to_string()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<(String, CompletionRun)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn run(&self, api_key: &str, run: &CompletionRun) -> Result<Completion> {
        self.calls.lock().push((api_key.to_string(), run.clone()));
        match &self.behavior {
            Behavior::Answer(text) => Ok(Completion {
                text: text.clone(),
                model: run.model.id().to_string(),
                usage: Usage::default(),
                stop_reason: None,
            }),
            Behavior::Fail(message) => Err(Error::api("connection_error", message.clone())),
        }
    }
}
