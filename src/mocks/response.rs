//! Pre-programmed responses.

use bytes::Bytes;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use uuid::Uuid;

use crate::errors::BoxError;
use crate::types::headers::split_line;
use crate::types::HeaderBag;

/// Iterator over body fragments. An `Err` item ends the body with a failure.
pub type FragmentIter = Box<dyn Iterator<Item = Result<Bytes, BoxError>> + Send>;

type Generator = Arc<dyn Fn() -> FragmentIter + Send + Sync>;

/// Source of a response body.
#[derive(Clone)]
pub enum Body {
    /// A fixed byte sequence, delivered as a single fragment.
    Fixed(Bytes),
    /// Fragments delivered one per chunk. Empty fragments produce no chunk.
    Fragments(Vec<Bytes>),
    /// A restartable generator, invoked once per request.
    Generator(Generator),
}

impl Body {
    /// Creates an empty body.
    pub fn empty() -> Self {
        Body::Fixed(Bytes::new())
    }

    /// Creates a body delivered as the given fragments.
    pub fn fragments<I, B>(fragments: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Bytes>,
    {
        Body::Fragments(fragments.into_iter().map(Into::into).collect())
    }

    /// Creates a body from a generator.
    ///
    /// The generator is called every time a request is bound to the
    /// response, so reused responses replay their body.
    pub fn generator<F, I>(generator: F) -> Self
    where
        F: Fn() -> I + Send + Sync + 'static,
        I: IntoIterator<Item = Result<Bytes, BoxError>>,
        I::IntoIter: Send + 'static,
    {
        Body::Generator(Arc::new(move || -> FragmentIter {
            Box::new(generator().into_iter())
        }))
    }

    /// Starts a fresh pass over the body.
    pub(crate) fn open(&self) -> FragmentIter {
        match self {
            Body::Fixed(bytes) => Box::new(std::iter::once(Ok(bytes.clone()))),
            Body::Fragments(fragments) => Box::new(fragments.clone().into_iter().map(Ok)),
            Body::Generator(generator) => generator(),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for Body {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Body::Fixed(bytes) => f.debug_tuple("Fixed").field(bytes).finish(),
            Body::Fragments(fragments) => f.debug_tuple("Fragments").field(fragments).finish(),
            Body::Generator(_) => f.write_str("Generator"),
        }
    }
}

impl From<&'static str> for Body {
    fn from(body: &'static str) -> Self {
        Body::Fixed(Bytes::from_static(body.as_bytes()))
    }
}

impl From<String> for Body {
    fn from(body: String) -> Self {
        Body::Fixed(Bytes::from(body))
    }
}

impl From<Vec<u8>> for Body {
    fn from(body: Vec<u8>) -> Self {
        Body::Fixed(Bytes::from(body))
    }
}

impl From<Bytes> for Body {
    fn from(body: Bytes) -> Self {
        Body::Fixed(body)
    }
}

/// A simulated HTTP exchange result.
///
/// Responses are templates: the client may bind the same response to several
/// requests, each getting its own pass over the body. Responses are never
/// mutated once handed to a client.
#[derive(Debug, Clone, Default)]
pub struct MockResponse {
    body: Body,
    status: Option<u16>,
    header_lines: Vec<String>,
    error: Option<String>,
}

impl MockResponse {
    /// Creates a 200 response with the given body.
    pub fn new(body: impl Into<Body>) -> Self {
        Self {
            body: body.into(),
            ..Self::default()
        }
    }

    /// Creates a JSON response.
    pub fn json<T: serde::Serialize>(value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::new(body).header("Content-Type", mime::APPLICATION_JSON.as_ref())
    }

    /// Creates a response that fails with a transport error when read.
    pub fn failing(error: impl Into<String>) -> Self {
        Self::default().error(error)
    }

    /// Sets the status code used when no status line is given.
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Adds a header.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.header_lines.push(format!("{}: {}", name, value));
        self
    }

    /// Adds a raw response header line, which may be a status line such as
    /// `HTTP/1.1 404 Not Found`.
    pub fn header_line(mut self, line: impl Into<String>) -> Self {
        self.header_lines.push(line.into());
        self
    }

    /// Sets a simulated transport error (DNS failure, timeout, ...).
    pub fn error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    /// Returns the body source.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Returns the raw response header lines.
    pub fn header_lines(&self) -> &[String] {
        &self.header_lines
    }

    /// Returns the simulated transport error.
    pub fn simulated_error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Parses the header lines into status, headers and interim responses.
    ///
    /// A status line starts a new block and discards the headers collected
    /// so far. Blocks with a 1xx status followed by another status line
    /// become interim responses; the last block is the final response.
    pub(crate) fn parse_head(&self) -> ResponseHead {
        let mut status = self.status.unwrap_or(200);
        let mut headers = HeaderBag::new();
        let mut informational = Vec::new();
        let mut interim: Option<(u16, Vec<String>)> = None;

        for line in &self.header_lines {
            if let Some(code) = parse_status_line(line) {
                if let Some(block) = interim.take() {
                    informational.push(block);
                }
                headers = HeaderBag::new();
                if (100..200).contains(&code) {
                    interim = Some((code, Vec::new()));
                } else {
                    status = code;
                }
                continue;
            }

            if line.starts_with("HTTP/") {
                tracing::warn!(line = %line, "Ignoring unrecognized status line");
                continue;
            }

            match (&mut interim, split_line(line)) {
                (Some((_, lines)), Ok(_)) => lines.push(line.clone()),
                (None, Ok((name, value))) => headers.append(name, value),
                (_, Err(e)) => tracing::warn!(error = %e, "Ignoring malformed response header"),
            }
        }

        // A trailing 1xx block has no final response after it.
        if let Some((code, lines)) = interim {
            status = code;
            for line in lines {
                if let Ok((name, value)) = split_line(&line) {
                    headers.append(name, value);
                }
            }
        }

        ResponseHead {
            status,
            headers,
            informational,
            raw: self.header_lines.clone(),
        }
    }
}

/// Realized status and headers of a response.
#[derive(Debug, Clone)]
pub(crate) struct ResponseHead {
    pub(crate) status: u16,
    pub(crate) headers: HeaderBag,
    pub(crate) informational: Vec<(u16, Vec<String>)>,
    pub(crate) raw: Vec<String>,
}

fn status_line_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^HTTP/\d+(?:\.\d+)? (\d{3})(?:\s.*)?$").ok())
        .as_ref()
}

/// Returns the status code of an `HTTP/x.y ddd reason` line.
pub(crate) fn parse_status_line(line: &str) -> Option<u16> {
    status_line_pattern()?
        .captures(line)
        .and_then(|captures| captures.get(1))
        .and_then(|code| code.as_str().parse().ok())
}

/// The shared empty response used when a client has no response source.
pub(crate) fn default_response() -> Arc<MockResponse> {
    static DEFAULT: OnceLock<Arc<MockResponse>> = OnceLock::new();
    Arc::clone(DEFAULT.get_or_init(|| Arc::new(MockResponse::default())))
}

/// Metadata about a response, available without triggering realization.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseInfo {
    /// Status code, 0 until the response is realized.
    pub http_code: u16,
    /// Request method.
    pub http_method: http::Method,
    /// Request URL.
    pub url: String,
    /// Raw response header lines, empty until realized.
    pub response_headers: Vec<String>,
    /// Number of redirects followed.
    pub redirect_count: u32,
    /// When the request was started.
    pub start_time: DateTime<Utc>,
    /// Time until the body completed.
    pub total_time: Option<Duration>,
    /// Transport error, if the response failed.
    pub error: Option<String>,
    /// Whether the response was canceled.
    pub canceled: bool,
    /// User data from the request options.
    pub user_data: Option<serde_json::Value>,
    /// Unique request identifier.
    pub request_id: Uuid,
}
