//! Mock client, responses and streaming.
//!
//! [`MockHttpClient`] draws a [`MockResponse`] from its [`ResponseSource`] for
//! every request and wraps it in a lazily realized [`ResponseHandle`].

mod client;
mod factory;
mod handle;
mod har;
mod response;
mod stream;

pub use client::MockHttpClient;
pub use factory::{ResponseCallback, ResponseSource};
pub use handle::ResponseHandle;
pub use har::HarReplay;
pub use response::{Body, FragmentIter, MockResponse, ResponseInfo};
pub use stream::{ResponseStream, StreamItem};
