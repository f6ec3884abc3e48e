//! `POST /api/chat`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::persona::render_instructions;

use super::error::ChatError;
use super::AppState;

/// Incoming chat request.
///
/// Fields are kept as raw JSON so that non-string values degrade the same
/// way as absent ones instead of failing deserialization.
#[derive(Debug, Default, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<Value>,

    #[serde(default, rename = "petId")]
    pub pet_id: Option<Value>,
}

impl ChatRequest {
    /// Message as text: strings as-is, other scalars stringified, null/absent empty.
    pub fn message_text(&self) -> String {
        match &self.message {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        }
    }

    /// Persona id; anything but a string counts as empty.
    pub fn pet_id(&self) -> &str {
        self.pet_id.as_ref().and_then(Value::as_str).unwrap_or("")
    }
}

/// Successful chat response.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReply {
    pub reply: String,
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatReply>, ChatError> {
    if !state.api_key_configured {
        return Err(ChatError::MissingCredential);
    }

    let Json(request) = payload.map_err(invalid_body)?;

    let message = request.message_text();
    let message = message.trim();
    if message.is_empty() {
        return Err(ChatError::EmptyMessage);
    }

    let pet_id = request.pet_id();
    let persona = state.registry.lookup(pet_id);
    let instructions = render_instructions(persona);
    let input = truncate_chars(message, state.max_message_chars);

    debug!(
        requested = pet_id,
        persona = %persona.id,
        chars = message.chars().count(),
        truncated = input.len() < message.len(),
        "Forwarding chat message"
    );

    let completion = state.client.complete(&instructions, input).await?;
    let reply = completion.text.unwrap_or_default();

    info!(
        persona = %persona.id,
        client = state.client.name(),
        reply_chars = reply.chars().count(),
        "Chat reply relayed"
    );

    Ok(Json(ChatReply { reply }))
}

fn invalid_body(rejection: JsonRejection) -> ChatError {
    let status = if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        StatusCode::PAYLOAD_TOO_LARGE
    } else {
        StatusCode::BAD_REQUEST
    };
    ChatError::InvalidBody {
        status,
        message: rejection.body_text(),
    }
}

/// Longest prefix of `s` holding at most `max` characters.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
