//! Client configuration.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use crate::error::ClientError;

pub const DEFAULT_BASE_URL: &str = "https://ai.gitee.com/v1";

/// Consecutive keep-alive lines tolerated on a stream before giving up.
pub const DEFAULT_EMPTY_MESSAGES_LIMIT: usize = 300;

pub const API_KEY_ENV: &str = "GITEEAI_API_KEY";
pub const BASE_URL_ENV: &str = "GITEEAI_BASE_URL";

/// A secret string type for sensitive data like API keys.
/// Prevents accidental logging or display of secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    /// Create a new secret string.
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Get the underlying secret value.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s.to_string())
    }
}

/// Configuration of a [`Client`](crate::Client).
///
/// # Example
/// ```rust
/// use giteeai::config::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("sk-...")
///     .with_base_url("http://localhost:8080/v1".to_string())
///     .with_timeout(Duration::from_secs(30))
///     .with_empty_messages_limit(50);
/// assert_eq!(config.empty_messages_limit, 50);
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Sent as `Authorization: Bearer <key>` when present
    pub api_key: Option<SecretString>,

    /// Base URL every endpoint path is appended to
    pub base_url: String,

    /// Stall guard for streaming responses
    pub empty_messages_limit: usize,

    /// Request timeout
    pub timeout: Option<Duration>,

    /// HTTP proxy URL
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in requests
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            empty_messages_limit: DEFAULT_EMPTY_MESSAGES_LIMIT,
            timeout: None,
            proxy: None,
            extra_headers: None,
        }
    }
}

impl ClientConfig {
    /// Create a default configuration with an API key.
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Load the API key and optional base URL from the environment.
    pub fn from_env() -> Result<Self, ClientError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| ClientError::Config(format!("{API_KEY_ENV} is not set")))?;
        let mut config = Self::new(api_key);
        if let Ok(base_url) = std::env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        Ok(config)
    }

    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Set the stream stall guard.
    pub fn with_empty_messages_limit(mut self, limit: usize) -> Self {
        self.empty_messages_limit = limit;
        self
    }

    /// Set the timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}

impl fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("<GiteeAI API ClientConfig>")
    }
}
