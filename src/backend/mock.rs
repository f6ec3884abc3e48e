//! Mock completion client for testing
//!
//! Returns a configured outcome without network access and records every
//! call so tests can assert on what would have been sent upstream.

use async_trait::async_trait;
use parking_lot::Mutex;

use super::failure::UpstreamFailure;
use super::{Completion, CompletionClient};

/// What the mock returns from every call
#[derive(Debug, Clone)]
pub enum MockOutcome {
    Reply(Completion),
    Fail(UpstreamFailure),
}

/// One recorded `complete` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub instructions: String,
    pub input: String,
}

/// Mock implementation of CompletionClient for testing
pub struct MockClient {
    outcome: MockOutcome,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockClient {
    pub fn new(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Mock that always replies with `text`
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new(MockOutcome::Reply(Completion::text(text)))
    }

    /// Mock that succeeds without any output text
    pub fn silent() -> Self {
        Self::new(MockOutcome::Reply(Completion::empty()))
    }

    /// Mock that always fails with `failure`
    pub fn failing(failure: UpstreamFailure) -> Self {
        Self::new(MockOutcome::Fail(failure))
    }

    /// Calls received so far, oldest first
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn last_call(&self) -> Option<RecordedCall> {
        self.calls.lock().last().cloned()
    }
}

#[async_trait]
impl CompletionClient for MockClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(
        &self,
        instructions: &str,
        input: &str,
    ) -> std::result::Result<Completion, UpstreamFailure> {
        self.calls.lock().push(RecordedCall {
            instructions: instructions.to_string(),
            input: input.to_string(),
        });

        match &self.outcome {
            MockOutcome::Reply(completion) => Ok(completion.clone()),
            MockOutcome::Fail(failure) => Err(failure.clone()),
        }
    }
}
