//! Upstream failure value and the fallback chains that read it.
//!
//! An upstream failure may carry its status and message in several places
//! depending on where it originated (transport, API error body, proxy in
//! between). Status and message are resolved by trying an ordered list of
//! accessors and taking the first one that yields a value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Status used when no accessor yields one.
pub const DEFAULT_STATUS: u16 = 500;

/// Message used when no accessor yields one.
pub const UNKNOWN_MESSAGE: &str = "unknown_error";

/// Error-like value produced by a failed completion call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpstreamFailure {
    /// Status reported directly on the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Message reported directly on the failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Structured API error object, if the API returned one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorDetail>,

    /// Raw HTTP response the failure was built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<FailureResponse>,
}

/// `{"error": {...}}` object returned by OpenAI-style APIs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    #[serde(default)]
    pub message: Option<String>,

    #[serde(default, rename = "type")]
    pub kind: Option<String>,

    #[serde(default)]
    pub code: Option<serde_json::Value>,
}

/// HTTP response attached to a failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FailureResponse {
    #[serde(default)]
    pub status: Option<u16>,

    /// Response body, parsed as JSON when possible, otherwise a string.
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

type StatusAccessor = fn(&UpstreamFailure) -> Option<u16>;
type MessageAccessor = fn(&UpstreamFailure) -> Option<&str>;

const STATUS_CHAIN: &[StatusAccessor] = &[direct_status, response_status];

const MESSAGE_CHAIN: &[MessageAccessor] =
    &[direct_message, api_error_message, response_data_message];

fn direct_status(f: &UpstreamFailure) -> Option<u16> {
    f.status
}

fn response_status(f: &UpstreamFailure) -> Option<u16> {
    f.response.as_ref()?.status
}

fn direct_message(f: &UpstreamFailure) -> Option<&str> {
    f.message.as_deref()
}

fn api_error_message(f: &UpstreamFailure) -> Option<&str> {
    f.error.as_ref()?.message.as_deref()
}

fn response_data_message(f: &UpstreamFailure) -> Option<&str> {
    f.response
        .as_ref()?
        .data
        .as_ref()?
        .pointer("/error/message")?
        .as_str()
}

impl UpstreamFailure {
    /// Failure with a direct status and message.
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Failure that never reached an HTTP response (connect, timeout, decode).
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Failure built from a non-success HTTP response.
    ///
    /// The direct message is `"{status} {detail}"`. The detail is the API's
    /// `error.message`, else the serialized `error` object, else the raw
    /// text of a non-JSON body. The parsed body stays attached for the
    /// nested accessors.
    pub fn from_response(status: u16, body: &str) -> Self {
        let data = serde_json::from_str::<serde_json::Value>(body).ok();
        let raw_error = data.as_ref().and_then(|v| v.get("error")).filter(|v| !v.is_null());
        let error = raw_error.and_then(|v| serde_json::from_value::<ApiErrorDetail>(v.clone()).ok());

        let detail = match (&data, raw_error) {
            (_, Some(err)) => error_detail(err),
            (Some(_), None) => String::new(),
            (None, None) => body.trim().chars().take(BODY_SUMMARY_CHARS).collect(),
        };

        Self {
            status: Some(status),
            message: Some(status_message(status, &detail)),
            error,
            response: Some(FailureResponse {
                status: Some(status),
                data: Some(data.unwrap_or_else(|| serde_json::Value::String(body.to_string()))),
            }),
        }
    }

    /// First status any accessor yields, else [`DEFAULT_STATUS`].
    ///
    /// A zero status counts as absent.
    pub fn resolve_status(&self) -> u16 {
        STATUS_CHAIN
            .iter()
            .find_map(|accessor| accessor(self).filter(|s| *s != 0))
            .unwrap_or(DEFAULT_STATUS)
    }

    /// First message any accessor yields, else [`UNKNOWN_MESSAGE`].
    ///
    /// An empty message counts as absent.
    pub fn resolve_message(&self) -> &str {
        MESSAGE_CHAIN
            .iter()
            .find_map(|accessor| accessor(self).filter(|m| !m.is_empty()))
            .unwrap_or(UNKNOWN_MESSAGE)
    }
}

impl fmt::Display for UpstreamFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "upstream failure ({}): {}",
            self.resolve_status(),
            self.resolve_message()
        )
    }
}

impl std::error::Error for UpstreamFailure {}

const BODY_SUMMARY_CHARS: usize = 200;

fn status_message(status: u16, detail: &str) -> String {
    if detail.is_empty() {
        format!("{} status code (no body)", status)
    } else {
        format!("{} {}", status, detail)
    }
}

/// `error.message` as text, or the whole `error` value serialized.
fn error_detail(error: &serde_json::Value) -> String {
    match error.get("message") {
        Some(serde_json::Value::String(msg)) if !msg.is_empty() => msg.clone(),
        Some(msg) if !msg.is_null() && msg.as_str() != Some("") => msg.to_string(),
        _ => error.to_string(),
    }
}
