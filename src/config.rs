//! Configuration file parser.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("Invalid feed URL: {0}")]
    InvalidUrl(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// Service configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Address the HTTP service binds to.
    pub listen_addr: SocketAddr,

    /// Upstream Atom alert feed.
    pub feed_url: String,

    /// Identifying User-Agent; the upstream asks for a contact in it.
    pub user_agent: String,

    /// Per-attempt timeout for the upstream request.
    pub request_timeout_secs: u64,

    /// Total fetch attempts, first one included.
    pub max_attempts: u32,

    /// Fixed delay between attempts.
    pub retry_delay_secs: u64,

    /// `max-age` sent with successful placefile responses.
    pub cache_max_age_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            feed_url: "https://api.weather.gov/alerts/active.atom".to_string(),
            user_agent: "(WeatherAlertPlacefile, contact@example.com)".to_string(),
            request_timeout_secs: 30,
            max_attempts: 3,
            retry_delay_secs: 2,
            cache_max_age_secs: 120,
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "listen_addr",
        "feed_url",
        "user_agent",
        "request_timeout_secs",
        "max_attempts",
        "retry_delay_secs",
        "cache_max_age_secs",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - Non-HTTP(S) `feed_url` → `Err(ConfigError::InvalidUrl)`
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.iter().any(|known| *known == key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(
            path = %path.display(),
            feed_url = %config.feed_url,
            listen_addr = %config.listen_addr,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Checks that `feed_url` is an absolute HTTP(S) URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = url::Url::parse(&self.feed_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.feed_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::InvalidUrl(format!(
                "{}: unsupported scheme '{}'",
                self.feed_url, other
            ))),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
