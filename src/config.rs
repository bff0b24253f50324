//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! The API base URL is resolved here once and handed to every page
//! controller; nothing else in the crate hardcodes it.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// REST backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// In-flight requests are abandoned after this many seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_base_url() -> String {
    "http://localhost:8084".to_string()
}

fn default_request_timeout() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl ApiConfig {
    /// Base URL without a trailing slash
    pub fn normalized_base_url(&self) -> String {
        self.base_url.trim_end_matches('/').to_string()
    }
}

/// Where the bearer token lives
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_token_file")]
    pub token_file: String,
}

fn default_token_file() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("circulo").join("token").to_string_lossy().to_string())
        .unwrap_or_else(|| "./circulo_token".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: default_token_file(),
        }
    }
}

/// How concurrent notifications share the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackPolicy {
    /// A new notification removes every visible one
    #[default]
    Replace,
    /// Notifications coexist until each one is dismissed
    Stack,
}

/// Transient notification timing
#[derive(Debug, Clone, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_dismiss_after")]
    pub dismiss_after_ms: u64,

    /// Length of both the entry and the exit transition
    #[serde(default = "default_transition")]
    pub transition_ms: u64,

    #[serde(default)]
    pub policy: StackPolicy,
}

fn default_dismiss_after() -> u64 {
    3000
}

fn default_transition() -> u64 {
    400
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            dismiss_after_ms: default_dismiss_after(),
            transition_ms: default_transition(),
            policy: StackPolicy::default(),
        }
    }
}

/// Paging for post lists
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    #[serde(default = "default_my_posts_page_size")]
    pub my_posts_page_size: u32,
}

fn default_page_size() -> u32 {
    10
}

fn default_my_posts_page_size() -> u32 {
    5
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            my_posts_page_size: default_my_posts_page_size(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("circulo").join("config.toml")),
            Some(PathBuf::from("./circulo.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("CIRCULO_API_URL") {
            self.api.base_url = url;
        }
        if let Ok(timeout) = std::env::var("CIRCULO_API_TIMEOUT_SECS") {
            if let Ok(secs) = timeout.parse() {
                self.api.request_timeout_secs = secs;
            }
        }

        if let Ok(path) = std::env::var("CIRCULO_TOKEN_FILE") {
            self.session.token_file = path;
        }

        if let Ok(level) = std::env::var("CIRCULO_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("CIRCULO_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Circulo Configuration
#
# Environment variables override these settings:
# - CIRCULO_API_URL
# - CIRCULO_API_TIMEOUT_SECS
# - CIRCULO_TOKEN_FILE
# - CIRCULO_LOG_LEVEL
# - CIRCULO_LOG_FORMAT

[api]
# Base URL of the community REST backend
base_url = "http://localhost:8084"

# Requests still in flight after this many seconds count as failed
request_timeout_secs = 10

[session]
# File holding the bearer token (written by `circulo login`)
# token_file = "~/.local/share/circulo/token"

[notifications]
# How long a notification stays visible (ms)
dismiss_after_ms = 3000

# Entry/exit transition length (ms)
transition_ms = 400

# "replace" shows one notification at a time, "stack" lets them coexist
policy = "replace"

[feed]
# Posts per dashboard page
page_size = 10

# Posts shown on the profile page
my_posts_page_size = 5

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
