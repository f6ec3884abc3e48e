//! OpenAI Responses API client
//!
//! Implements CompletionClient by calling `POST {base_url}/responses` with a
//! system `instructions` string and a single user `input`.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

use super::failure::UpstreamFailure;
use super::{Completion, CompletionClient};

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for the OpenAI client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL (e.g., "https://api.openai.com/v1")
    pub base_url: String,

    /// API key sent as a bearer token
    pub api_key: String,

    /// Model to use (e.g., "gpt-4o-mini")
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 60,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Responses API types (request/response)
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    instructions: &'a str,
    input: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsesResponse {
    /// Aggregated text; some compatible servers return it directly.
    #[serde(default)]
    output_text: Option<String>,

    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,

    #[serde(default)]
    text: Option<String>,
}

impl ResponsesResponse {
    /// `output_text` if present, else every `output_text` content part joined.
    fn into_text(self) -> Option<String> {
        if self.output_text.is_some() {
            return self.output_text;
        }

        let parts: Vec<String> = self
            .output
            .into_iter()
            .flat_map(|item| item.content)
            .filter(|part| part.kind == "output_text")
            .filter_map(|part| part.text)
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.concat())
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// OpenAI Client
// ─────────────────────────────────────────────────────────────────

/// Client for the OpenAI Responses API
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
}

impl OpenAiClient {
    /// Create a new client with the given configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::UpstreamClient(e.to_string()))?;

        info!(
            base_url = %config.base_url,
            model = %config.model,
            "OpenAI client created"
        );

        Ok(Self { config, client })
    }

    /// Build the authorization header value (if API key is set)
    fn auth_header(&self) -> Option<String> {
        if self.config.api_key.is_empty() {
            None
        } else {
            Some(format!("Bearer {}", self.config.api_key))
        }
    }

    fn responses_url(&self) -> String {
        format!("{}/responses", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl CompletionClient for OpenAiClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn complete(
        &self,
        instructions: &str,
        input: &str,
    ) -> std::result::Result<Completion, UpstreamFailure> {
        let start = Instant::now();
        let body = ResponsesRequest {
            model: &self.config.model,
            instructions,
            input,
        };

        let mut req = self.client.post(self.responses_url()).json(&body);
        if let Some(ref auth) = self.auth_header() {
            req = req.header("Authorization", auth);
        }

        let response = req.send().await.map_err(|e| {
            warn!(error = %e, timeout = e.is_timeout(), "Upstream request failed");
            UpstreamFailure::transport(format!("Request error: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(UpstreamFailure::from_response(status.as_u16(), &text));
        }

        let parsed: ResponsesResponse = response.json().await.map_err(|e| {
            UpstreamFailure::transport(format!("Failed to parse API response: {}", e))
        })?;

        let text = parsed.into_text();
        debug!(
            model = %self.config.model,
            elapsed_ms = start.elapsed().as_millis() as u64,
            chars = text.as_deref().map(|t| t.chars().count()).unwrap_or(0),
            "Completion received"
        );

        Ok(Completion { text })
    }
}
