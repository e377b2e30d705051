//! Configuration module for the mock HTTP client.
//!
//! Holds the construction-time request defaults that every call's options
//! are merged over, the way a real client's default options are.

use std::time::Duration;
use url::Url;

use crate::errors::{ClientError, ClientResult};

/// Default inactivity timeout (60 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default request options for a mock client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URI relative request URLs are resolved against.
    pub base_uri: Option<Url>,
    /// Default headers, as `(name, value)` pairs.
    pub headers: Vec<(String, String)>,
    /// Inactivity timeout.
    pub timeout: Duration,
    /// Maximum total duration of a request.
    pub max_duration: Option<Duration>,
    /// Whether response bodies are buffered.
    pub buffer: bool,
    /// Opaque data attached to every response info.
    pub user_data: Option<serde_json::Value>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_uri: None,
            headers: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            max_duration: None,
            buffer: true,
            user_data: None,
        }
    }
}

impl ClientConfig {
    /// Creates a new configuration builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MOCK_HTTP_BASE_URI` (optional): Base URI
    /// - `MOCK_HTTP_TIMEOUT` (optional): Inactivity timeout in seconds
    /// - `MOCK_HTTP_MAX_DURATION` (optional): Maximum duration in seconds
    pub fn from_env() -> ClientResult<Self> {
        let mut builder = ClientConfigBuilder::new();

        if let Ok(base_uri) = std::env::var("MOCK_HTTP_BASE_URI") {
            builder = builder.base_uri(base_uri);
        }

        if let Ok(timeout_str) = std::env::var("MOCK_HTTP_TIMEOUT") {
            if let Ok(timeout_secs) = timeout_str.parse::<u64>() {
                builder = builder.timeout(Duration::from_secs(timeout_secs));
            } else {
                tracing::warn!(value = %timeout_str, "Ignoring non-numeric MOCK_HTTP_TIMEOUT");
            }
        }

        if let Ok(max_str) = std::env::var("MOCK_HTTP_MAX_DURATION") {
            if let Ok(max_secs) = max_str.parse::<u64>() {
                builder = builder.max_duration(Duration::from_secs(max_secs));
            } else {
                tracing::warn!(value = %max_str, "Ignoring non-numeric MOCK_HTTP_MAX_DURATION");
            }
        }

        builder.build()
    }
}

/// Builder for `ClientConfig`.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    base_uri: Option<String>,
    headers: Vec<(String, String)>,
    timeout: Option<Duration>,
    max_duration: Option<Duration>,
    buffer: Option<bool>,
    user_data: Option<serde_json::Value>,
}

impl ClientConfigBuilder {
    /// Creates a new configuration builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URI.
    pub fn base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = Some(base_uri.into());
        self
    }

    /// Adds a default header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the inactivity timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the maximum duration.
    pub fn max_duration(mut self, max_duration: Duration) -> Self {
        self.max_duration = Some(max_duration);
        self
    }

    /// Enables or disables body buffering.
    pub fn buffer(mut self, buffer: bool) -> Self {
        self.buffer = Some(buffer);
        self
    }

    /// Attaches user data to every response.
    pub fn user_data(mut self, user_data: serde_json::Value) -> Self {
        self.user_data = Some(user_data);
        self
    }

    /// Builds the configuration.
    pub fn build(self) -> ClientResult<ClientConfig> {
        let base_uri = match self.base_uri {
            Some(raw) => Some(parse_base_uri(&raw)?),
            None => None,
        };

        for (name, _) in &self.headers {
            if name.is_empty() || name.contains(|c: char| c.is_whitespace() || c == ':') {
                return Err(ClientError::invalid_argument(format!(
                    "Invalid header name: \"{}\"",
                    name
                )));
            }
        }

        Ok(ClientConfig {
            base_uri,
            headers: self.headers,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            max_duration: self.max_duration,
            buffer: self.buffer.unwrap_or(true),
            user_data: self.user_data,
        })
    }
}

/// Parses a base URI, requiring an absolute URL.
pub(crate) fn parse_base_uri(raw: &str) -> ClientResult<Url> {
    match Url::parse(raw) {
        Ok(url) if url.cannot_be_a_base() => Err(ClientError::invalid_argument(format!(
            "Invalid base URI: \"{}\" cannot be used as a base",
            raw
        ))),
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => Err(ClientError::invalid_argument(
            "Invalid URL: scheme is missing",
        )),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder_success() {
        let config = ClientConfig::builder()
            .base_uri("https://example.com/api/")
            .header("X-Client", "tests")
            .timeout(Duration::from_secs(5))
            .max_duration(Duration::from_secs(30))
            .buffer(false)
            .build()
            .unwrap();

        assert_eq!(
            config.base_uri.as_ref().map(Url::as_str),
            Some("https://example.com/api/")
        );
        assert_eq!(config.headers, vec![("X-Client".to_string(), "tests".to_string())]);
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_duration, Some(Duration::from_secs(30)));
        assert!(!config.buffer);
    }

    #[test]
    fn test_config_builder_defaults() {
        let config = ClientConfig::builder().build().unwrap();

        assert!(config.base_uri.is_none());
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert!(config.buffer);
        assert!(config.max_duration.is_none());
    }

    #[test]
    fn test_config_rejects_schemeless_base_uri() {
        let error = ClientConfig::builder()
            .base_uri("example.com/api")
            .build()
            .unwrap_err();

        assert_eq!(error.to_string(), "Invalid URL: scheme is missing");
    }

    #[test]
    fn test_config_rejects_non_base_uri() {
        let result = ClientConfig::builder().base_uri("mailto:someone@example.com").build();
        assert!(matches!(result, Err(ClientError::InvalidArgument { .. })));
    }

    #[test]
    fn test_config_rejects_bad_header_name() {
        let result = ClientConfig::builder().header("Bad Name", "x").build();
        assert!(result.is_err());
    }
}
