use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use log::warn;

/// Application configuration module
/// This module handles the service configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Captions provider settings
    #[serde(default)]
    pub captions: CaptionsConfig,

    /// Cross-origin policy applied to every route
    #[serde(default)]
    pub cors: CorsSettings,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// HTTP listener configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `host:port` string suitable for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Captions provider configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CaptionsConfig {
    /// Base URL of the video site
    #[serde(default = "default_captions_endpoint")]
    pub endpoint: String,

    /// Caption language to fetch (ISO 639-1)
    #[serde(default = "default_language")]
    pub language: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User agent sent with provider requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for CaptionsConfig {
    fn default() -> Self {
        Self {
            endpoint: default_captions_endpoint(),
            language: default_language(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

/// Cross-origin resource sharing policy
///
/// Methods and headers are always fully open; only origins and the
/// credentials flag are configurable.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CorsSettings {
    /// Allowed origins, `*` for any
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    /// Whether browsers may send credentials
    #[serde(default)]
    pub allow_credentials: bool,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            allowed_origins: default_allowed_origins(),
            allow_credentials: false,
        }
    }
}

impl CorsSettings {
    /// Whether any origin is accepted
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|o| o == "*")
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    // @returns: Matching `log` crate filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_captions_endpoint() -> String {
    "https://www.youtube.com".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("captionmerge/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["*".to_string()]
}

impl Config {
    /// Load the configuration from `path`, writing the defaults there first
    /// if the file does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if path.exists() {
            let file = File::open(path)
                .context(format!("Failed to open config file: {}", path.display()))?;
            let reader = BufReader::new(file);
            let config: Config = serde_json::from_reader(reader)
                .context(format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());

        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .context(format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(anyhow!("Server host must not be empty"));
        }

        if self.server.port == 0 {
            return Err(anyhow!("Server port must be between 1 and 65535"));
        }

        if self.captions.endpoint.trim().is_empty() {
            return Err(anyhow!("Captions endpoint is required"));
        }

        url::Url::parse(&self.captions.endpoint)
            .map_err(|e| anyhow!("Invalid captions endpoint '{}': {}", self.captions.endpoint, e))?;

        if self.captions.language.trim().is_empty() {
            return Err(anyhow!("Caption language is required"));
        }

        if self.captions.timeout_secs == 0 {
            return Err(anyhow!("Captions timeout must be at least one second"));
        }

        if self.captions.user_agent.trim().is_empty() {
            return Err(anyhow!("Captions user agent must not be empty"));
        }

        reqwest::header::HeaderValue::from_str(&self.captions.user_agent)
            .map_err(|e| anyhow!("Invalid captions user agent '{}': {}", self.captions.user_agent.escape_debug(), e))?;

        if self.cors.allowed_origins.is_empty() {
            return Err(anyhow!("At least one CORS origin is required"));
        }

        // Browsers reject wildcard origins on credentialed requests
        if self.cors.allow_credentials && self.cors.allows_any_origin() {
            return Err(anyhow!("CORS credentials cannot be allowed together with a wildcard origin"));
        }

        Ok(())
    }
}
