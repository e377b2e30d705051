//! The mock HTTP client.

use async_trait::async_trait;
use http::Method;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, instrument, warn};

use super::factory::{Dispatcher, ResponseSource};
use super::handle::ResponseHandle;
use super::stream::ResponseStream;
use crate::config::{parse_base_uri, ClientConfig};
use crate::errors::ClientResult;
use crate::observability::{loggable_headers, LogConfig};
use crate::transport::{prepare_request, HttpClient};
use crate::types::headers::split_line;
use crate::types::{BaseUri, RequestOptions};

/// An [`HttpClient`] that answers every request from a [`ResponseSource`]
/// instead of the network.
///
/// # Example
///
/// ```
/// use mock_http_client::{HttpClient, MockHttpClient, MockResponse, RequestOptions};
///
/// # tokio_test::block_on(async {
/// let client = MockHttpClient::new(vec![
///     MockResponse::new("first"),
///     MockResponse::new("second").status(201),
/// ]);
///
/// let response = client
///     .request(http::Method::GET, "https://example.com/", RequestOptions::new())
///     .await?;
/// assert_eq!(response.text(true)?, "first");
/// assert_eq!(client.request_count(), 1);
/// # Ok::<(), mock_http_client::ClientError>(())
/// # }).unwrap();
/// ```
#[derive(Clone)]
pub struct MockHttpClient {
    config: ClientConfig,
    log_config: LogConfig,
    dispatcher: Arc<Mutex<Dispatcher>>,
    request_count: Arc<AtomicUsize>,
}

impl MockHttpClient {
    /// Creates a client with default options.
    pub fn new(source: impl Into<ResponseSource>) -> Self {
        Self::with_config(source, ClientConfig::default())
    }

    /// Creates a client with the given default options.
    pub fn with_config(source: impl Into<ResponseSource>, config: ClientConfig) -> Self {
        Self {
            config,
            log_config: LogConfig::default(),
            dispatcher: Arc::new(Mutex::new(Dispatcher::new(source.into()))),
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Creates a client resolving relative URLs against `base_uri`.
    pub fn with_base_uri(source: impl Into<ResponseSource>, base_uri: &str) -> ClientResult<Self> {
        let config = ClientConfig::builder().base_uri(base_uri).build()?;
        Ok(Self::with_config(source, config))
    }

    /// Sets how request headers are logged.
    pub fn log_config(mut self, log_config: LogConfig) -> Self {
        self.log_config = log_config;
        self
    }

    /// Returns a client with `options` merged over the current defaults.
    ///
    /// The new client shares the response source and request counter.
    /// Body and query are per-request only and are ignored here.
    pub fn with_options(&self, options: RequestOptions) -> ClientResult<Self> {
        let mut config = self.config.clone();

        match &options.base_uri {
            BaseUri::Inherit => {}
            BaseUri::Disabled => config.base_uri = None,
            BaseUri::Uri(raw) => config.base_uri = Some(parse_base_uri(raw)?),
        }

        for line in &options.headers {
            let (name, value) = split_line(line)?;
            config
                .headers
                .retain(|(existing, _)| !existing.eq_ignore_ascii_case(name));
            config.headers.push((name.to_string(), value.to_string()));
        }

        if let Some(timeout) = options.timeout {
            config.timeout = timeout;
        }
        if options.max_duration.is_some() {
            config.max_duration = options.max_duration;
        }
        if let Some(buffer) = options.buffer {
            config.buffer = buffer;
        }
        if options.user_data.is_some() {
            config.user_data = options.user_data;
        }

        Ok(Self {
            config,
            log_config: self.log_config.clone(),
            dispatcher: Arc::clone(&self.dispatcher),
            request_count: Arc::clone(&self.request_count),
        })
    }

    /// Returns the default options.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Number of requests dispatched so far.
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Resets the request counter.
    pub fn reset(&self) {
        self.request_count.store(0, Ordering::SeqCst);
    }

    /// Replaces the response source.
    pub fn set_response_factory(&self, source: impl Into<ResponseSource>) {
        self.dispatcher().replace(source.into());
    }

    fn dispatcher(&self) -> MutexGuard<'_, Dispatcher> {
        self.dispatcher
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for MockHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpClient")
            .field("config", &self.config)
            .field("request_count", &self.request_count())
            .finish_non_exhaustive()
    }
}

impl Default for MockHttpClient {
    fn default() -> Self {
        Self::new(ResponseSource::Null)
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    #[instrument(skip_all, fields(method = %method, url = %url))]
    async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> ClientResult<ResponseHandle> {
        let request = prepare_request(&self.config, &method, url, &options)?;

        debug!(
            resolved = %request.url,
            headers = %loggable_headers(&request.headers, self.log_config.redact_sensitive),
            body_len = request.body.len(),
            "Dispatching mock request"
        );

        // The dispatcher guard is released before a drawn callback runs.
        let drawn = self.dispatcher().next();
        let response = drawn
            .and_then(|drawn| drawn.resolve(&method, &request.url, &request))
            .map_err(|e| {
                warn!(error = %e, "Response source failed");
                e
            })?;

        let index = self.request_count.fetch_add(1, Ordering::SeqCst);
        debug!(index, "Mock response selected");

        Ok(ResponseHandle::new(response, request))
    }

    fn stream(&self, responses: Vec<ResponseHandle>) -> ResponseStream {
        ResponseStream::new(responses)
    }
}
