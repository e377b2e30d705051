//! Response sources and the dispatcher that draws from them.

use http::Method;
use std::collections::VecDeque;
use std::sync::Arc;

use super::response::{default_response, MockResponse};
use crate::errors::{ClientError, ClientResult};
use crate::types::RequestSnapshot;

/// Callback producing a response source for a request.
pub type ResponseCallback =
    Arc<dyn Fn(&Method, &str, &RequestSnapshot) -> ClientResult<ResponseSource> + Send + Sync>;

/// Where a mock client takes its responses from.
///
/// Nested sources are allowed anywhere a response is expected; the value
/// finally produced for a request must be a [`MockResponse`].
#[derive(Default)]
pub enum ResponseSource {
    /// No source: every request gets an empty 200 response.
    #[default]
    Null,
    /// One response, reused for every request.
    Response(Arc<MockResponse>),
    /// Responses consumed in order, one per request.
    Sequence(VecDeque<ResponseSource>),
    /// A lazily evaluated sequence, consumed one item per request.
    Lazy(Box<dyn Iterator<Item = ResponseSource> + Send>),
    /// A callback invoked with the method, URL and request snapshot.
    Callback(ResponseCallback),
}

impl ResponseSource {
    /// Creates a sequence from responses or nested sources.
    pub fn sequence<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ResponseSource>,
    {
        ResponseSource::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Creates a lazily evaluated sequence.
    pub fn lazy<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<ResponseSource> + 'static,
        I::IntoIter: Send + 'static,
    {
        ResponseSource::Lazy(Box::new(items.into_iter().map(Into::into)))
    }

    /// Creates a callback source.
    pub fn callback<F, R>(callback: F) -> Self
    where
        F: Fn(&Method, &str, &RequestSnapshot) -> R + Send + Sync + 'static,
        R: Into<ResponseSource>,
    {
        ResponseSource::Callback(Arc::new(move |method, url, request| {
            Ok(callback(method, url, request).into())
        }))
    }

    /// Creates a callback source whose errors are returned from `request()`.
    pub fn try_callback<F, R>(callback: F) -> Self
    where
        F: Fn(&Method, &str, &RequestSnapshot) -> ClientResult<R> + Send + Sync + 'static,
        R: Into<ResponseSource>,
    {
        ResponseSource::Callback(Arc::new(move |method, url, request| {
            callback(method, url, request).map(Into::into)
        }))
    }

    /// Name of the source kind, as reported in contract errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            ResponseSource::Null => "null",
            ResponseSource::Response(_) => "MockResponse",
            ResponseSource::Sequence(_) => "array",
            ResponseSource::Lazy(_) => "Generator",
            ResponseSource::Callback(_) => "Closure",
        }
    }
}

impl std::fmt::Debug for ResponseSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseSource::Response(response) => {
                f.debug_tuple("Response").field(response).finish()
            }
            ResponseSource::Sequence(items) => f.debug_tuple("Sequence").field(items).finish(),
            other => f.write_str(other.type_name()),
        }
    }
}

impl From<MockResponse> for ResponseSource {
    fn from(response: MockResponse) -> Self {
        ResponseSource::Response(Arc::new(response))
    }
}

impl From<Arc<MockResponse>> for ResponseSource {
    fn from(response: Arc<MockResponse>) -> Self {
        ResponseSource::Response(response)
    }
}

impl From<Option<MockResponse>> for ResponseSource {
    fn from(response: Option<MockResponse>) -> Self {
        response.map_or(ResponseSource::Null, Into::into)
    }
}

impl From<Vec<MockResponse>> for ResponseSource {
    fn from(responses: Vec<MockResponse>) -> Self {
        ResponseSource::sequence(responses)
    }
}

impl From<Vec<ResponseSource>> for ResponseSource {
    fn from(items: Vec<ResponseSource>) -> Self {
        ResponseSource::Sequence(items.into())
    }
}

/// Picks the response for each request.
#[derive(Debug, Default)]
pub(crate) struct Dispatcher {
    source: ResponseSource,
}

impl Dispatcher {
    pub(crate) fn new(source: ResponseSource) -> Self {
        Self { source }
    }

    pub(crate) fn replace(&mut self, source: ResponseSource) {
        self.source = source;
    }

    /// Draws what answers the next request.
    ///
    /// Sequences are consumed one item per call; the drawn item must already
    /// be a response, or a callback returning one. Callbacks are handed back
    /// uninvoked so the caller can run them without holding the dispatcher.
    pub(crate) fn next(&mut self) -> ClientResult<Draw> {
        let drawn = match &mut self.source {
            ResponseSource::Null => return Ok(Draw::Ready(default_response())),
            ResponseSource::Response(response) => return Ok(Draw::Ready(Arc::clone(response))),
            ResponseSource::Callback(callback) => return Ok(Draw::Invoke(Arc::clone(callback))),
            ResponseSource::Sequence(items) => items.pop_front().ok_or_else(exhausted)?,
            ResponseSource::Lazy(items) => items.next().ok_or_else(exhausted)?,
        };

        match drawn {
            ResponseSource::Response(response) => Ok(Draw::Ready(response)),
            ResponseSource::Callback(callback) => Ok(Draw::Invoke(callback)),
            other => Err(contract_violation(other.type_name())),
        }
    }
}

/// The item drawn for a request.
pub(crate) enum Draw {
    Ready(Arc<MockResponse>),
    Invoke(ResponseCallback),
}

impl Draw {
    /// Runs a drawn callback once. Its result must be a response.
    pub(crate) fn resolve(
        self,
        method: &Method,
        url: &str,
        request: &RequestSnapshot,
    ) -> ClientResult<Arc<MockResponse>> {
        match self {
            Draw::Ready(response) => Ok(response),
            Draw::Invoke(callback) => match callback(method, url, request)? {
                ResponseSource::Response(response) => Ok(response),
                other => Err(contract_violation(other.type_name())),
            },
        }
    }
}

fn exhausted() -> ClientError {
    ClientError::transport("The response factory iterator passed to MockHttpClient is empty.")
}

fn contract_violation(type_name: &str) -> ClientError {
    ClientError::transport(format!(
        "The response factory passed to MockHttpClient must return/yield an instance of ResponseInterface, \"{}\" given.",
        type_name
    ))
}
