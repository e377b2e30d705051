//! Data types shared by the client, responses and streams.

pub mod chunk;
pub mod headers;
pub mod options;

pub use chunk::Chunk;
pub use headers::HeaderBag;
pub use options::{BaseUri, RequestBody, RequestOptions, RequestSnapshot};
