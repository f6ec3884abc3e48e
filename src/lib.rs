//! POODi - pet-care chat proxy
//!
//! Serves a small chat page and relays each message, wrapped in a
//! per-pet system prompt, to the OpenAI Responses API.

pub mod backend;
pub mod config;
pub mod error;
pub mod logging;
pub mod persona;
pub mod server;

pub use error::{Error, ErrorCode, Result};
