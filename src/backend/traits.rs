//! Completion client trait definitions
//!
//! The chat handler depends only on [`CompletionClient`], so the real
//! OpenAI client and test doubles are interchangeable.

use async_trait::async_trait;

use super::failure::UpstreamFailure;

/// Output of a successful completion call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    /// Generated text. `None` when the upstream produced no text output.
    pub text: Option<String>,
}

impl Completion {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
        }
    }

    pub fn empty() -> Self {
        Self { text: None }
    }
}

/// Core trait for upstream completion APIs
///
/// One call per chat request; implementations must not retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Short identifier used in logs
    fn name(&self) -> &'static str;

    /// Generate text for `input` under the given system `instructions`.
    async fn complete(
        &self,
        instructions: &str,
        input: &str,
    ) -> std::result::Result<Completion, UpstreamFailure>;
}
