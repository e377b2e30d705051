//! Error types for the mock HTTP client.
//!
//! Mirrors the failure modes of a real streaming HTTP client: configuration
//! errors raised synchronously by `request()`, transport errors that surface
//! lazily when a response is first touched, and status errors raised when the
//! caller asks for content of a non-successful response.

use std::sync::Arc;
use thiserror::Error;

/// Result type alias for mock client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Shared, clonable error cause.
pub type SharedError = Arc<dyn std::error::Error + Send + Sync>;

/// Boxed error produced by body generators.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Error type for mock client operations.
///
/// Errors are `Clone` so a failed response can raise the same error every
/// time it is touched.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// Invalid request configuration (URL, base URI, header line).
    #[error("{message}")]
    InvalidArgument {
        /// Error message.
        message: String,
    },

    /// Transport-level failure.
    #[error("{message}")]
    Transport {
        /// Error message.
        message: String,
        /// Original error raised while producing the response, if any.
        #[source]
        source: Option<SharedError>,
    },

    /// The response status is a redirection, client or server error.
    #[error("HTTP {status} returned for \"{url}\".")]
    HttpStatus {
        /// HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
    },

    /// The API was used in a way the response state does not allow.
    #[error("{message}")]
    Logic {
        /// Error message.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("Decoding error: {message}")]
    Decoding {
        /// Error message.
        message: String,
    },
}

impl ClientError {
    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ClientError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Creates a transport error without an underlying cause.
    pub fn transport(message: impl Into<String>) -> Self {
        ClientError::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an error raised by a body producer.
    ///
    /// The message is the original error's message and the original error is
    /// kept as the source.
    pub fn from_body_error(err: BoxError) -> Self {
        ClientError::Transport {
            message: err.to_string(),
            source: Some(Arc::from(err)),
        }
    }

    /// Creates a logic error.
    pub fn logic(message: impl Into<String>) -> Self {
        ClientError::Logic {
            message: message.into(),
        }
    }

    /// Returns true for transport errors.
    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport { .. })
    }

    /// Returns the HTTP status for status errors.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true for 3xx status errors.
    pub fn is_redirection(&self) -> bool {
        matches!(self.status(), Some(300..=399))
    }

    /// Returns true for 4xx status errors.
    pub fn is_client_error(&self) -> bool {
        matches!(self.status(), Some(400..=499))
    }

    /// Returns true for 5xx status errors.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decoding {
            message: err.to_string(),
        }
    }
}

impl From<url::ParseError> for ClientError {
    fn from(err: url::ParseError) -> Self {
        ClientError::InvalidArgument {
            message: format!("Invalid URL: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug)]
    struct Boom;

    impl std::fmt::Display for Boom {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str("boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn test_body_error_keeps_message_and_source() {
        let error = ClientError::from_body_error(Box::new(Boom));

        assert!(error.is_transport());
        assert_eq!(error.to_string(), "boom");
        assert_eq!(error.source().map(ToString::to_string), Some("boom".to_string()));
    }

    #[test]
    fn test_status_classification() {
        let redirect = ClientError::HttpStatus {
            status: 302,
            url: "https://example.com".to_string(),
        };
        let missing = ClientError::HttpStatus {
            status: 404,
            url: "https://example.com".to_string(),
        };
        let failed = ClientError::HttpStatus {
            status: 503,
            url: "https://example.com".to_string(),
        };

        assert!(redirect.is_redirection());
        assert!(missing.is_client_error());
        assert!(failed.is_server_error());
        assert!(!failed.is_client_error());
        assert_eq!(
            missing.to_string(),
            "HTTP 404 returned for \"https://example.com\"."
        );
    }

    #[test]
    fn test_url_parse_error_is_invalid_argument() {
        let error: ClientError = url::Url::parse("http://[::1").unwrap_err().into();
        assert!(matches!(error, ClientError::InvalidArgument { .. }));
        assert!(error.to_string().starts_with("Invalid URL: "));
    }

    #[test]
    fn test_errors_are_clonable() {
        let error = ClientError::from_body_error(Box::new(Boom));
        let cloned = error.clone();
        assert_eq!(error.to_string(), cloned.to_string());
        assert!(cloned.source().is_some());
    }
}
