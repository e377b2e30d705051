//! HTTP client contract and request preparation.
//!
//! Code under test depends on [`HttpClient`]; tests hand it a
//! [`MockHttpClient`](crate::mocks::MockHttpClient) so no network I/O happens.

mod body;
mod request;
mod resolve;

pub(crate) use request::prepare_request;

use async_trait::async_trait;
use http::Method;

use crate::errors::ClientResult;
use crate::mocks::{ResponseHandle, ResponseStream};
use crate::types::RequestOptions;

/// HTTP client interface (for dependency injection).
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Starts a request.
    ///
    /// Configuration errors are returned here. Transport errors surface
    /// lazily, when the returned handle is first read.
    async fn request(
        &self,
        method: Method,
        url: &str,
        options: RequestOptions,
    ) -> ClientResult<ResponseHandle>;

    /// Streams the bodies of the given responses, in the order given.
    fn stream(&self, responses: Vec<ResponseHandle>) -> ResponseStream;
}
