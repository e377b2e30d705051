//! Request options and the merged request snapshot.

use bytes::Bytes;
use std::time::Duration;

use super::headers::HeaderBag;

/// Base URI override for a single request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BaseUri {
    /// Use the client's configured base URI.
    #[default]
    Inherit,
    /// Resolve the request URL without any base URI.
    Disabled,
    /// Use this base URI instead of the configured one.
    Uri(String),
}

/// Request body.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Raw bytes, sent as-is.
    Bytes(Bytes),
    /// JSON document.
    Json(serde_json::Value),
    /// URL-encoded form fields.
    Form(Vec<(String, String)>),
}

impl From<&str> for RequestBody {
    fn from(body: &str) -> Self {
        RequestBody::Bytes(Bytes::copy_from_slice(body.as_bytes()))
    }
}

impl From<String> for RequestBody {
    fn from(body: String) -> Self {
        RequestBody::Bytes(Bytes::from(body))
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(body: Vec<u8>) -> Self {
        RequestBody::Bytes(Bytes::from(body))
    }
}

impl From<Bytes> for RequestBody {
    fn from(body: Bytes) -> Self {
        RequestBody::Bytes(body)
    }
}

/// Per-request options, merged over the client defaults.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    /// Raw `Name: value` header lines.
    pub headers: Vec<String>,
    /// Request body.
    pub body: Option<RequestBody>,
    /// Query parameters appended to the URL.
    pub query: Vec<(String, String)>,
    /// Base URI override.
    pub base_uri: BaseUri,
    /// Inactivity timeout override.
    pub timeout: Option<Duration>,
    /// Maximum duration override.
    pub max_duration: Option<Duration>,
    /// Whether the response body is buffered.
    pub buffer: Option<bool>,
    /// Opaque data attached to the response info.
    pub user_data: Option<serde_json::Value>,
}

impl RequestOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.headers
            .push(format!("{}: {}", name.as_ref(), value.as_ref()));
        self
    }

    /// Adds a raw `Name: value` header line.
    pub fn header_line(mut self, line: impl Into<String>) -> Self {
        self.headers.push(line.into());
        self
    }

    /// Sets the body.
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a JSON body.
    pub fn json(mut self, value: serde_json::Value) -> Self {
        self.body = Some(RequestBody::Json(value));
        self
    }

    /// Sets a URL-encoded form body.
    pub fn form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.body = Some(RequestBody::Form(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        ));
        self
    }

    /// Adds a query parameter.
    pub fn query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Overrides the base URI.
    pub fn base_uri(mut self, base_uri: impl Into<String>) -> Self {
        self.base_uri = BaseUri::Uri(base_uri.into());
        self
    }

    /// Resolves this request without a base URI.
    pub fn without_base_uri(mut self) -> Self {
        self.base_uri = BaseUri::Disabled;
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

    /// Attaches user data.
    pub fn user_data(mut self, user_data: serde_json::Value) -> Self {
        self.user_data = Some(user_data);
        self
    }
}

/// The fully merged request configuration a response was produced for.
///
/// Captured once at request time and read-only afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestSnapshot {
    /// HTTP method.
    pub method: http::Method,
    /// Resolved absolute URL.
    pub url: String,
    /// Raw header lines, in normalized order.
    pub headers: Vec<String>,
    /// Headers grouped by lowercased name.
    pub normalized_headers: HeaderBag,
    /// Prepared body bytes.
    pub body: Bytes,
    /// Effective base URI.
    pub base_uri: Option<String>,
    /// Inactivity timeout.
    pub timeout: Duration,
    /// Maximum duration.
    pub max_duration: Option<Duration>,
    /// Whether the response body is buffered.
    pub buffer: bool,
    /// Opaque user data.
    pub user_data: Option<serde_json::Value>,
}

impl RequestSnapshot {
    /// Returns the request body as UTF-8 text, if it is valid UTF-8.
    pub fn body_text(&self) -> Option<&str> {
        std::str::from_utf8(&self.body).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_builder() {
        let options = RequestOptions::new()
            .header("Content-Length", "4")
            .header_line("X-Trace: abc")
            .body("abc=def")
            .query("page", "2")
            .without_base_uri()
            .buffer(false);

        assert_eq!(options.headers, vec!["Content-Length: 4", "X-Trace: abc"]);
        assert_eq!(
            options.body,
            Some(RequestBody::Bytes(Bytes::from_static(b"abc=def")))
        );
        assert_eq!(options.query, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(options.base_uri, BaseUri::Disabled);
        assert_eq!(options.buffer, Some(false));
    }

    #[test]
    fn test_form_body() {
        let options = RequestOptions::new().form([("a", "1"), ("b", "2")]);
        assert_eq!(
            options.body,
            Some(RequestBody::Form(vec![
                ("a".to_string(), "1".to_string()),
                ("b".to_string(), "2".to_string()),
            ]))
        );
    }
}
