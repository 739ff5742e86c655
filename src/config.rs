use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the remote API, without a trailing slash.
    pub api_base_url: Url,
    /// Timeout applied to every HTTP request.
    pub http_timeout: Duration,
    /// Posts requested per feed page.
    pub page_limit: u32,
    /// Where the CLI persists the signed-in session.
    pub session_file: PathBuf,
}

const DEFAULT_API_BASE_URL: &str = "https://tarmeezacademy.com/api/v1";

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a set variable cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = env_or_default("API_BASE_URL", DEFAULT_API_BASE_URL);
        Ok(Self {
            api_base_url: parse_base_url(&base_url)?,
            http_timeout: Duration::from_secs(parse_env_u64("HTTP_TIMEOUT_SECS", 30)?),
            page_limit: parse_env_u32("PAGE_LIMIT", 10)?,
            session_file: PathBuf::from(env_or_default(
                "SESSION_FILE",
                ".microblog-session.json",
            )),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.page_limit == 0 {
            return Err(ConfigError::InvalidValue {
                name: "PAGE_LIMIT".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.http_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "HTTP_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// A configuration for tests. Point `api_base_url` at a mock server
    /// with struct update syntax.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            api_base_url: Url::parse("http://127.0.0.1:1").expect("static URL"),
            http_timeout: Duration::from_secs(5),
            page_limit: 10,
            session_file: PathBuf::from(".microblog-session-test.json"),
        }
    }
}

fn parse_base_url(value: &str) -> Result<Url, ConfigError> {
    Url::parse(value.trim_end_matches('/')).map_err(|e| ConfigError::InvalidValue {
        name: "API_BASE_URL".to_string(),
        message: e.to_string(),
    })
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u32(name: &str, default: u32) -> Result<u32, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}
