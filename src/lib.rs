//! Mock HTTP Client Library
//!
//! A test double for HTTP-dependent code. Instead of touching the network,
//! [`MockHttpClient`] answers every request from pre-programmed
//! [`MockResponse`]s while still behaving like a real streaming client:
//! responses are realized lazily, bodies arrive as a sequence of chunks, and
//! transport failures surface when a response is first read.
//!
//! # Features
//!
//! - **Response sources**: a single response, an ordered sequence, a lazy
//!   iterator, a callback, or a recorded HAR archive
//! - **Realistic requests**: base URI resolution, default header merging,
//!   `Content-Length` fix-up and chunked request body decoding
//! - **Chunked streaming**: first, data, last and error chunks with byte
//!   offsets, via an `Iterator` or a `futures::Stream`
//! - **Failure simulation**: transport errors, failing body generators,
//!   error statuses and cancellation
//! - **Observability**: `tracing` spans and events with header redaction
//!
//! # Quick Start
//!
//! ```rust
//! use bytes::Bytes;
//! use mock_http_client::{Body, Chunk, HttpClient, MockHttpClient, MockResponse, RequestOptions};
//!
//! # tokio_test::block_on(async {
//! let client = MockHttpClient::with_base_uri(
//!     MockResponse::new(Body::fragments(["hello ", "world"])),
//!     "https://example.com/api/",
//! )?;
//!
//! let response = client.request(http::Method::GET, "greeting", RequestOptions::new()).await?;
//! assert_eq!(response.url(), "https://example.com/api/greeting");
//!
//! let chunks: Vec<Chunk> = client
//!     .stream(vec![response])
//!     .map(|item| item.map(|(_, chunk)| chunk))
//!     .collect::<Result<_, _>>()?;
//!
//! assert_eq!(chunks[0], Chunk::first());
//! assert_eq!(chunks[1], Chunk::data(0, Bytes::from("hello ")));
//! assert_eq!(chunks[3], Chunk::Last { offset: 11 });
//! # Ok::<(), mock_http_client::ClientError>(())
//! # }).unwrap();
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod errors;
pub mod mocks;
pub mod observability;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use config::{ClientConfig, ClientConfigBuilder};
pub use errors::{BoxError, ClientError, ClientResult};
pub use mocks::{
    Body, HarReplay, MockHttpClient, MockResponse, ResponseHandle, ResponseInfo, ResponseSource,
    ResponseStream,
};
pub use observability::{init_logging, LogConfig, LogLevel};
pub use transport::HttpClient;
pub use types::{BaseUri, Chunk, HeaderBag, RequestBody, RequestOptions, RequestSnapshot};
