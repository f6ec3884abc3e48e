//! Upstream completion backends
//!
//! This module provides the client abstraction the chat handler calls,
//! the OpenAI implementation, a mock for tests, and the failure value
//! shared by all of them.

mod failure;
mod mock;
mod openai;
mod traits;

pub use failure::{ApiErrorDetail, FailureResponse, UpstreamFailure, DEFAULT_STATUS, UNKNOWN_MESSAGE};
pub use mock::{MockClient, MockOutcome, RecordedCall};
pub use openai::{OpenAiClient, OpenAiConfig};
pub use traits::*;
