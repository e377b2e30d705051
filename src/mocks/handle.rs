//! Per-request response handles.

use bytes::{Bytes, BytesMut};
use chrono::Utc;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tracing::{debug, trace, warn};
use uuid::Uuid;

use super::response::{FragmentIter, MockResponse, ResponseHead, ResponseInfo};
use crate::errors::{ClientError, ClientResult};
use crate::types::{Chunk, HeaderBag, RequestSnapshot};

const CANCELED: &str = "Response has been canceled.";

/// The live, per-request view of a [`MockResponse`].
///
/// Nothing happens until the handle is first read: status, headers and body
/// are realized on demand. Clones share the same state, so a handle may be
/// read directly and through a [`ResponseStream`](super::ResponseStream).
#[derive(Clone)]
pub struct ResponseHandle {
    inner: Arc<Mutex<HandleState>>,
}

enum Phase {
    /// Nothing delivered yet.
    Pending,
    /// Headers delivered, body being pulled.
    Body(FragmentIter),
    Complete,
    Failed(ClientError),
    Canceled,
}

struct HandleState {
    response: Arc<MockResponse>,
    request: Arc<RequestSnapshot>,
    info: ResponseInfo,
    head: Option<ResponseHead>,
    phase: Phase,
    queued: VecDeque<Chunk>,
    content: BytesMut,
    offset: u64,
    started: Instant,
}

impl ResponseHandle {
    pub(crate) fn new(response: Arc<MockResponse>, request: RequestSnapshot) -> Self {
        let info = ResponseInfo {
            http_code: 0,
            http_method: request.method.clone(),
            url: request.url.clone(),
            response_headers: Vec::new(),
            redirect_count: 0,
            start_time: Utc::now(),
            total_time: None,
            error: None,
            canceled: false,
            user_data: request.user_data.clone(),
            request_id: Uuid::new_v4(),
        };

        Self {
            inner: Arc::new(Mutex::new(HandleState {
                response,
                request: Arc::new(request),
                info,
                head: None,
                phase: Phase::Pending,
                queued: VecDeque::new(),
                content: BytesMut::new(),
                offset: 0,
                started: Instant::now(),
            })),
        }
    }

    fn state(&self) -> MutexGuard<'_, HandleState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the status code, realizing the response.
    ///
    /// Fails with the simulated transport error, if any.
    pub fn status_code(&self) -> ClientResult<u16> {
        let mut state = self.state();
        let status = state.head()?.status;
        Ok(status)
    }

    /// Returns the final response headers.
    ///
    /// With `throw`, 3xx, 4xx and 5xx statuses are returned as errors.
    pub fn headers(&self, throw: bool) -> ClientResult<HeaderBag> {
        let mut state = self.state();
        let headers = state.head()?.headers.clone();
        if throw {
            state.check_status()?;
        }
        Ok(headers)
    }

    /// Returns the whole body, draining it if needed.
    ///
    /// With `throw`, 3xx, 4xx and 5xx statuses are returned as errors.
    pub fn content(&self, throw: bool) -> ClientResult<Bytes> {
        self.state().content(throw)
    }

    /// Returns the body as UTF-8 text.
    pub fn text(&self, throw: bool) -> ClientResult<String> {
        let content = self.content(throw)?;
        String::from_utf8(content.to_vec()).map_err(|e| ClientError::Decoding {
            message: format!("Response body is not valid UTF-8: {}", e),
        })
    }

    /// Decodes the body as JSON. Error statuses are always returned as errors.
    pub fn json<T: DeserializeOwned>(&self) -> ClientResult<T> {
        let content = self.content(true)?;
        if content.is_empty() {
            return Err(ClientError::Decoding {
                message: "Response body is empty.".to_string(),
            });
        }
        Ok(serde_json::from_slice(&content)?)
    }

    /// Returns the request this response was produced for.
    pub fn request_options(&self) -> Arc<RequestSnapshot> {
        Arc::clone(&self.state().request)
    }

    /// Returns the request method.
    pub fn method(&self) -> http::Method {
        self.state().request.method.clone()
    }

    /// Returns the resolved request URL.
    pub fn url(&self) -> String {
        self.state().request.url.clone()
    }

    /// Returns the response metadata without realizing the response.
    pub fn info(&self) -> ResponseInfo {
        self.state().info.clone()
    }

    /// Cancels the response. Reads fail afterwards and streams skip it.
    pub fn cancel(&self) {
        let mut state = self.state();
        if matches!(state.phase, Phase::Complete | Phase::Failed(_) | Phase::Canceled) {
            return;
        }
        debug!(url = %state.request.url, "Response canceled");
        state.phase = Phase::Canceled;
        state.queued.clear();
        state.info.canceled = true;
        state.info.error = Some(CANCELED.to_string());
    }

    /// Returns true once the body is complete, failed or canceled.
    pub fn is_finished(&self) -> bool {
        matches!(
            self.state().phase,
            Phase::Complete | Phase::Failed(_) | Phase::Canceled
        )
    }

    /// Delivers the next chunk, or `None` once the response is finished.
    pub(crate) fn next_chunk(&self) -> Option<Chunk> {
        self.state().advance()
    }

    /// Re-emits the terminal chunk of an already finished response.
    pub(crate) fn terminal_chunk(&self) -> Option<Chunk> {
        let state = self.state();
        match &state.phase {
            Phase::Complete => Some(Chunk::Last {
                offset: state.offset,
            }),
            Phase::Failed(err) => Some(Chunk::Error {
                offset: state.offset,
                message: err.to_string(),
            }),
            _ => None,
        }
    }

    /// Returns the error a failed response raises.
    pub(crate) fn failure(&self) -> Option<ClientError> {
        match &self.state().phase {
            Phase::Failed(err) => Some(err.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for ResponseHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state();
        f.debug_struct("ResponseHandle")
            .field("method", &state.request.method)
            .field("url", &state.request.url)
            .field("http_code", &state.info.http_code)
            .finish_non_exhaustive()
    }
}

impl HandleState {
    /// Realizes status and headers on first use.
    fn head(&mut self) -> ClientResult<&ResponseHead> {
        if matches!(self.phase, Phase::Canceled) {
            return Err(ClientError::transport(CANCELED));
        }
        if let Some(message) = self.response.simulated_error() {
            self.info.error = Some(message.to_string());
            return Err(ClientError::transport(message));
        }

        let response = &self.response;
        let info = &mut self.info;
        Ok(self.head.get_or_insert_with(|| {
            let head = response.parse_head();
            info.http_code = head.status;
            info.response_headers = head.raw.clone();
            head
        }))
    }

    fn check_status(&self) -> ClientResult<()> {
        let status = self.info.http_code;
        if status >= 300 {
            return Err(ClientError::HttpStatus {
                status,
                url: self.request.url.clone(),
            });
        }
        Ok(())
    }

    fn start(&mut self) {
        match self.head() {
            Ok(head) => {
                let informational: Vec<Chunk> = head
                    .informational
                    .iter()
                    .map(|(status, headers)| Chunk::Informational {
                        status: *status,
                        headers: headers.clone(),
                    })
                    .collect();
                self.queued.extend(informational);
                self.queued.push_back(Chunk::first());
                self.phase = Phase::Body(self.response.body().open());
            }
            Err(err) => {
                warn!(url = %self.request.url, error = %err, "Simulated transport error");
                self.queued.push_back(Chunk::Error {
                    offset: 0,
                    message: err.to_string(),
                });
                self.phase = Phase::Failed(err);
            }
        }
    }

    fn advance(&mut self) -> Option<Chunk> {
        loop {
            if let Some(chunk) = self.queued.pop_front() {
                return Some(chunk);
            }
            if matches!(self.phase, Phase::Pending) {
                self.start();
                continue;
            }

            let pulled = match &mut self.phase {
                Phase::Body(fragments) => fragments.next(),
                _ => return None,
            };

            match pulled {
                None => {
                    self.phase = Phase::Complete;
                    self.info.total_time = Some(self.started.elapsed());
                    trace!(url = %self.request.url, bytes = self.offset, "Response body complete");
                    return Some(Chunk::Last {
                        offset: self.offset,
                    });
                }
                Some(Ok(fragment)) if fragment.is_empty() => {}
                Some(Ok(fragment)) => {
                    let chunk = Chunk::Data {
                        offset: self.offset,
                        content: fragment.clone(),
                    };
                    self.offset += fragment.len() as u64;
                    if self.request.buffer {
                        self.content.extend_from_slice(&fragment);
                    }
                    return Some(chunk);
                }
                Some(Err(e)) => {
                    let err = ClientError::from_body_error(e);
                    debug!(url = %self.request.url, error = %err, "Response body failed");
                    self.info.error = Some(err.to_string());
                    self.info.total_time = Some(self.started.elapsed());
                    let chunk = Chunk::Error {
                        offset: self.offset,
                        message: err.to_string(),
                    };
                    self.phase = Phase::Failed(err);
                    return Some(chunk);
                }
            }
        }
    }

    fn content(&mut self, throw: bool) -> ClientResult<Bytes> {
        self.head()?;
        if throw {
            self.check_status()?;
        }

        if let Phase::Failed(err) = &self.phase {
            return Err(err.clone());
        }

        let buffered = self.request.buffer;
        if !buffered && !matches!(self.phase, Phase::Pending) {
            return Err(ClientError::logic(
                "Cannot get the content of the response twice: buffering is disabled.",
            ));
        }

        let mut unbuffered = BytesMut::new();
        while let Some(chunk) = self.advance() {
            if let (false, Chunk::Data { content, .. }) = (buffered, &chunk) {
                unbuffered.extend_from_slice(content);
            }
        }

        match &self.phase {
            Phase::Failed(err) => Err(err.clone()),
            Phase::Canceled => Err(ClientError::transport(CANCELED)),
            _ if buffered => Ok(Bytes::copy_from_slice(&self.content)),
            _ => Ok(unbuffered.freeze()),
        }
    }
}
