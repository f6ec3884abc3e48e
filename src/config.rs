//! Configuration system for the POODi server
//!
//! Supports multiple configuration sources with the following precedence (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (`OPENAI_API_KEY`, `PORT`, `POODI_*`)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::backend::OpenAiConfig;
use crate::error::{Error, Result};

/// Environment variable holding the upstream API key
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the listen port
pub const PORT_ENV: &str = "PORT";

/// Main server configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// HTTP listener and static assets
    pub server: ServerSettings,

    /// Upstream completion API
    pub openai: OpenAiSettings,

    /// Chat request handling
    pub chat: ChatSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind address
    pub host: String,

    /// Listen port
    pub port: u16,

    /// Directory served at `/` (must contain index.html)
    pub static_dir: String,

    /// Maximum accepted request body size in bytes
    pub max_body_bytes: usize,
}

/// Upstream API settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    /// API base URL
    pub base_url: String,

    /// API key (required to serve chat requests)
    pub api_key: String,

    /// Model identifier
    pub model: String,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

/// Chat handling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Messages longer than this many characters are truncated before forwarding
    pub max_message_chars: usize,

    /// Custom persona table replacing the bundled one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personas_file: Option<String>,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: "static".to_string(),
            max_body_bytes: 1024 * 1024,
        }
    }
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        let defaults = OpenAiConfig::default();
        Self {
            base_url: defaults.base_url,
            api_key: defaults.api_key,
            model: defaults.model,
            timeout_secs: defaults.timeout_secs,
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            max_message_chars: 2000,
            personas_file: None,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl OpenAiSettings {
    /// Whether a credential is configured
    pub fn has_api_key(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// Client configuration for the upstream API
    pub fn client_config(&self) -> OpenAiConfig {
        OpenAiConfig {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            timeout_secs: self.timeout_secs,
        }
    }
}

impl ServerConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e.message()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            return if path.exists() {
                Ok(Some(path))
            } else {
                Err(Error::config_not_found(path))
            };
        }

        let search_paths = [
            PathBuf::from("poodi.toml"),
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .map(|p| p.join("poodi").join("config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".poodi").join("config.toml"))
                .unwrap_or_default(),
        ];

        for path in &search_paths {
            if !path.as_os_str().is_empty() && path.is_file() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key → value source
    fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Conventional variables first, POODI_* take precedence
        if let Some(val) = lookup(API_KEY_ENV) {
            self.openai.api_key = val;
        }
        if let Some(n) = parse_override(&lookup, PORT_ENV) {
            self.server.port = n;
        }

        // Server settings
        if let Some(val) = lookup("POODI_HOST") {
            self.server.host = val;
        }
        if let Some(n) = parse_override(&lookup, "POODI_PORT") {
            self.server.port = n;
        }
        if let Some(val) = lookup("POODI_STATIC_DIR") {
            self.server.static_dir = val;
        }
        if let Some(n) = parse_override(&lookup, "POODI_MAX_BODY_BYTES") {
            self.server.max_body_bytes = n;
        }

        // OpenAI settings
        if let Some(val) = lookup("POODI_OPENAI_BASE_URL") {
            self.openai.base_url = val;
        }
        if let Some(val) = lookup("POODI_OPENAI_MODEL") {
            self.openai.model = val;
        }
        if let Some(n) = parse_override(&lookup, "POODI_OPENAI_TIMEOUT_SECS") {
            self.openai.timeout_secs = n;
        }

        // Chat settings
        if let Some(n) = parse_override(&lookup, "POODI_MAX_MESSAGE_CHARS") {
            self.chat.max_message_chars = n;
        }
        if let Some(val) = lookup("POODI_PERSONAS_FILE") {
            self.chat.personas_file = Some(val);
        }

        // Logging settings
        if let Some(val) = lookup("POODI_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Some(val) = lookup("POODI_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Some(val) = lookup("POODI_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        self.server.static_dir = expand_path(&self.server.static_dir);

        if let Some(ref file) = self.chat.personas_file {
            self.chat.personas_file = Some(expand_path(file));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(Error::config_field_invalid("server.port", "port cannot be 0"));
        }

        if self.server.max_body_bytes == 0 {
            return Err(Error::config_field_invalid(
                "server.max_body_bytes",
                "max_body_bytes must be greater than 0",
            ));
        }

        match url::Url::parse(&self.openai.base_url) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => {
                return Err(Error::config_field_invalid(
                    "openai.base_url",
                    format!(
                        "base_url must be an http:// or https:// URL, got '{}'",
                        self.openai.base_url
                    ),
                ));
            }
        }

        if self.openai.model.trim().is_empty() {
            return Err(Error::config_field_invalid("openai.model", "model cannot be empty"));
        }

        if self.chat.max_message_chars == 0 {
            return Err(Error::config_field_invalid(
                "chat.max_message_chars",
                "max_message_chars must be greater than 0",
            ));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// Socket address string to bind
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Copy with the API key masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.openai.has_api_key() {
            copy.openai.api_key = "********".to_string();
        }
        copy
    }
}

/// Parse a numeric override, warning when the value is unusable
fn parse_override<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring invalid environment override");
            None
        }
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".poodi")
                .join("config.toml")
        });

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    write_file(&config_path, DEFAULT_CONFIG)?;
    Ok(config_path)
}

fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| Error::IoWrite {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Default configuration content with comments
const DEFAULT_CONFIG: &str = r#"# POODi Server Configuration

[server]
# Bind address
host = "0.0.0.0"

# Listen port (PORT overrides this)
port = 3000

# Directory served at / (must contain index.html)
static_dir = "static"

# Maximum accepted request body size in bytes
max_body_bytes = 1048576

[openai]
# API base URL
base_url = "https://api.openai.com/v1"

# API key. Prefer the OPENAI_API_KEY environment variable.
api_key = ""

# Model identifier
model = "gpt-4o-mini"

# Request timeout in seconds
timeout_secs = 60

[chat]
# Messages longer than this are truncated before forwarding
max_message_chars = 2000

# Custom persona table replacing the bundled pets
# personas_file = "~/.poodi/personas.toml"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (comment out to disable file logging)
# file = "~/.poodi/logs/poodi.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#;
