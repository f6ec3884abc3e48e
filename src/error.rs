//! Error types for the POODi server
//!
//! Provides structured error handling with:
//! - Numeric error codes for machine parsing
//! - User-friendly messages with suggestions
//! - Exit codes for CLI
//!
//! These cover process-level failures (startup, configuration, persona
//! tables). Per-request failures are modelled separately by
//! [`crate::server::ChatError`] so that one request can never take the
//! process down.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, Error>;

/// Numeric error codes for machine parsing and documentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum ErrorCode {
    // Configuration errors (1xx)
    ConfigNotFound = 100,
    ConfigParseError = 101,
    ConfigValidation = 102,

    // IO errors (2xx)
    IoRead = 200,
    IoWrite = 201,
    IoPermission = 202,
    IoNotFound = 203,

    // Server errors (3xx)
    ServerBind = 300,
    ServerFailed = 301,

    // Persona errors (4xx)
    PersonaTableParse = 400,
    PersonaTableInvalid = 401,

    // Upstream errors (5xx)
    UpstreamClient = 500,

    // Internal errors (9xx)
    InternalError = 900,
}

impl ErrorCode {
    /// Get the string code (e.g., "E100")
    pub fn as_str(&self) -> String {
        format!("E{}", *self as u16)
    }

    /// Get the exit code for CLI (maps to 1-125 range)
    pub fn exit_code(&self) -> i32 {
        match *self as u16 {
            100..=199 => 10,
            200..=299 => 20,
            300..=399 => 30,
            400..=499 => 40,
            500..=599 => 50,
            900..=999 => 90,
            _ => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Main error type for the server process
#[derive(Error, Debug)]
pub enum Error {
    // ─────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────

    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration parse error
    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<toml::de::Error>,
    },

    /// Configuration validation error
    #[error("Configuration validation failed: {message}")]
    ConfigValidation { message: String, field: Option<String> },

    /// Generic configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    // ─────────────────────────────────────────────────────────────
    // IO Errors
    // ─────────────────────────────────────────────────────────────

    /// File read error
    #[error("Failed to read file: {path}")]
    IoRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File write error
    #[error("Failed to write file: {path}")]
    IoWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    Toml(#[from] toml::ser::Error),

    // ─────────────────────────────────────────────────────────────
    // Server Errors
    // ─────────────────────────────────────────────────────────────

    /// Could not bind the listening socket
    #[error("Failed to bind {addr}")]
    ServerBind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Server stopped with an error
    #[error("Server error: {0}")]
    Server(String),

    // ─────────────────────────────────────────────────────────────
    // Persona Errors
    // ─────────────────────────────────────────────────────────────

    /// Persona table could not be parsed
    #[error("Failed to parse persona table {origin}: {message}")]
    PersonaTableParse { origin: String, message: String },

    /// Persona table parsed but violates registry invariants
    #[error("Invalid persona table: {message}")]
    PersonaTableInvalid { message: String },

    // ─────────────────────────────────────────────────────────────
    // Upstream Errors
    // ─────────────────────────────────────────────────────────────

    /// The upstream HTTP client could not be constructed
    #[error("Failed to create upstream client: {0}")]
    UpstreamClient(String),

    // ─────────────────────────────────────────────────────────────
    // Internal Errors
    // ─────────────────────────────────────────────────────────────

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the numeric error code
    pub fn code(&self) -> ErrorCode {
        match self {
            Error::ConfigNotFound { .. } => ErrorCode::ConfigNotFound,
            Error::ConfigParse { .. } => ErrorCode::ConfigParseError,
            Error::ConfigValidation { .. } => ErrorCode::ConfigValidation,
            Error::Config(_) => ErrorCode::ConfigValidation,

            Error::IoRead { source, .. } => io_code(source, ErrorCode::IoRead),
            Error::IoWrite { source, .. } => io_code(source, ErrorCode::IoWrite),
            Error::Toml(_) => ErrorCode::ConfigParseError,

            Error::ServerBind { .. } => ErrorCode::ServerBind,
            Error::Server(_) => ErrorCode::ServerFailed,

            Error::PersonaTableParse { .. } => ErrorCode::PersonaTableParse,
            Error::PersonaTableInvalid { .. } => ErrorCode::PersonaTableInvalid,

            Error::UpstreamClient(_) => ErrorCode::UpstreamClient,

            Error::Internal(_) => ErrorCode::InternalError,
        }
    }

    /// Get the exit code for CLI
    pub fn exit_code(&self) -> i32 {
        self.code().exit_code()
    }

    /// Get a user-friendly suggestion for how to fix this error
    pub fn suggestion(&self) -> Option<&'static str> {
        match self {
            Error::ConfigNotFound { .. } => Some(
                "Run 'poodi config init' to create a default configuration file."
            ),
            Error::ConfigParse { .. } => Some(
                "Check your configuration file syntax. Run 'poodi config validate' to see details."
            ),
            Error::ConfigValidation { .. } => Some(
                "Review the configuration file and fix the invalid values."
            ),
            Error::ServerBind { .. } => Some(
                "Another process may be using the port. Set PORT or --port to pick a different one."
            ),
            Error::PersonaTableParse { .. } | Error::PersonaTableInvalid { .. } => Some(
                "Fix the persona table or remove 'personas_file' from [chat] to use the bundled pets."
            ),
            _ => None,
        }
    }

    /// Format the error for terminal display with colors
    pub fn format_for_terminal(&self) -> String {
        let mut output = format!(
            "\x1b[31mError [{}]\x1b[0m: {}\n",
            self.code().as_str(),
            self
        );

        if let Error::ConfigValidation {
            field: Some(field), ..
        } = self
        {
            output.push_str(&format!("  Field: {}\n", field));
        }

        if let Some(hint) = self.suggestion() {
            output.push_str(&format!("\n\x1b[33mHint\x1b[0m: {}\n", hint));
        }

        output
    }

    /// Format the error for logging (no colors)
    pub fn format_for_log(&self) -> String {
        format!("[{}] {}", self.code().as_str(), self)
    }
}

/// Narrow an IO failure to not-found / permission codes when the kind allows
fn io_code(source: &std::io::Error, fallback: ErrorCode) -> ErrorCode {
    match source.kind() {
        std::io::ErrorKind::NotFound => ErrorCode::IoNotFound,
        std::io::ErrorKind::PermissionDenied => ErrorCode::IoPermission,
        _ => fallback,
    }
}

// ─────────────────────────────────────────────────────────────────
// Error Constructors
// ─────────────────────────────────────────────────────────────────

impl Error {
    /// Create a config not found error
    pub fn config_not_found(path: impl Into<PathBuf>) -> Self {
        Error::ConfigNotFound { path: path.into() }
    }

    /// Create a config validation error with field name
    pub fn config_field_invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::ConfigValidation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    /// Create a persona table invariant error
    pub fn persona_invalid(message: impl Into<String>) -> Self {
        Error::PersonaTableInvalid {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_format() {
        assert_eq!(ErrorCode::ConfigNotFound.as_str(), "E100");
        assert_eq!(ErrorCode::ServerBind.as_str(), "E300");
        assert_eq!(ErrorCode::InternalError.as_str(), "E900");
    }

    #[test]
    fn test_error_exit_codes() {
        assert_eq!(ErrorCode::ConfigNotFound.exit_code(), 10);
        assert_eq!(ErrorCode::IoRead.exit_code(), 20);
        assert_eq!(ErrorCode::ServerBind.exit_code(), 30);
        assert_eq!(ErrorCode::PersonaTableInvalid.exit_code(), 40);
        assert_eq!(ErrorCode::UpstreamClient.exit_code(), 50);
        assert_eq!(ErrorCode::InternalError.exit_code(), 90);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(
            Error::config_not_found("/test").code(),
            ErrorCode::ConfigNotFound
        );
        assert_eq!(
            Error::config_field_invalid("server.port", "must not be 0").code(),
            ErrorCode::ConfigValidation
        );
        assert_eq!(
            Error::persona_invalid("no personas").code(),
            ErrorCode::PersonaTableInvalid
        );
    }

    #[test]
    fn test_io_error_codes_follow_kind() {
        let err = Error::IoRead {
            path: PathBuf::from("/missing/personas.toml"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        };
        assert_eq!(err.code(), ErrorCode::IoNotFound);
        assert_eq!(err.exit_code(), 20);

        let err = Error::IoWrite {
            path: PathBuf::from("/etc/poodi.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.code(), ErrorCode::IoPermission);

        let err = Error::IoRead {
            path: PathBuf::from("/dev/odd"),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "bad bytes"),
        };
        assert_eq!(err.code(), ErrorCode::IoRead);
    }

    #[test]
    fn test_suggestions() {
        let err = Error::config_not_found("/test");
        assert!(err.suggestion().unwrap().contains("config init"));

        let err = Error::persona_invalid("duplicate id");
        assert!(err.suggestion().unwrap().contains("personas_file"));

        assert!(Error::Internal("boom".into()).suggestion().is_none());
    }

    #[test]
    fn test_format_for_terminal() {
        let formatted = Error::config_not_found("/test/poodi.toml").format_for_terminal();
        assert!(formatted.contains("E100"));
        assert!(formatted.contains("\x1b[31m"));
        assert!(formatted.contains("Hint"));

        let formatted = Error::config_field_invalid("server.port", "port cannot be 0")
            .format_for_terminal();
        assert!(formatted.contains("E102"));
        assert!(formatted.contains("Field: server.port"));
    }

    #[test]
    fn test_format_for_log() {
        let formatted = Error::persona_invalid("empty").format_for_log();
        assert!(formatted.contains("[E401]"));
        assert!(!formatted.contains("\x1b["));
    }
}
