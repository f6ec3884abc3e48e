//! Pet personas: the registry of known pets and the instruction prompt
//! built from them.
//!
//! The registry is loaded once at startup (bundled table or a custom TOML
//! file) and shared read-only between requests.

pub mod prompt;
pub mod registry;
pub mod types;

pub use prompt::{build_instructions, render_instructions, ASSISTANT_NAME};
pub use registry::PersonaRegistry;
pub use types::{PersonaRecord, PersonaTable};
