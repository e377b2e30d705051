//! Multiplexed chunk streaming over several responses.

use futures::Stream;
use std::collections::VecDeque;
use std::iter::FusedIterator;
use std::pin::Pin;
use std::task::{Context, Poll};
use tracing::trace;

use super::handle::ResponseHandle;
use crate::errors::{ClientError, ClientResult};
use crate::types::Chunk;

/// Item yielded by a [`ResponseStream`].
pub type StreamItem = ClientResult<(ResponseHandle, Chunk)>;

/// Yields `(response, chunk)` pairs for a set of responses.
///
/// Responses are drained one after the other, in the order given. A response
/// that already finished only re-emits its terminal chunk; canceled responses
/// are skipped. After an [`Chunk::Error`] is yielded, the stream yields the
/// response's error once and then ends.
///
/// Mock bodies never block, so the stream is both an [`Iterator`] and an
/// always-ready [`Stream`].
#[derive(Debug)]
pub struct ResponseStream {
    pending: VecDeque<ResponseHandle>,
    current: Option<ResponseHandle>,
    raise: Option<ClientError>,
    finished: bool,
}

impl ResponseStream {
    pub(crate) fn new(responses: Vec<ResponseHandle>) -> Self {
        Self {
            pending: responses.into(),
            current: None,
            raise: None,
            finished: false,
        }
    }

    fn emit(&mut self, handle: ResponseHandle, chunk: Chunk) -> StreamItem {
        trace!(url = %handle.url(), offset = chunk.offset(), "Streaming chunk");
        if let Chunk::Error { message, .. } = &chunk {
            self.raise = Some(
                handle
                    .failure()
                    .unwrap_or_else(|| ClientError::transport(message.clone())),
            );
        }
        if chunk.is_terminal() {
            self.current = None;
        }
        Ok((handle, chunk))
    }
}

impl Iterator for ResponseStream {
    type Item = StreamItem;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.raise.take() {
            self.finished = true;
            return Some(Err(err));
        }
        if self.finished {
            return None;
        }

        loop {
            if let Some(handle) = self.current.clone() {
                match handle.next_chunk() {
                    Some(chunk) => return Some(self.emit(handle, chunk)),
                    None => self.current = None,
                }
                continue;
            }

            let Some(handle) = self.pending.pop_front() else {
                self.finished = true;
                return None;
            };

            if let Some(chunk) = handle.terminal_chunk() {
                return Some(self.emit(handle, chunk));
            }
            self.current = Some(handle);
        }
    }
}

impl FusedIterator for ResponseStream {}

impl Stream for ResponseStream {
    type Item = StreamItem;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.get_mut().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::errors::BoxError;
    use crate::mocks::{Body, MockResponse};
    use crate::transport::prepare_request;
    use crate::types::RequestOptions;
    use bytes::Bytes;
    use http::Method;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn handle(response: MockResponse) -> ResponseHandle {
        let request = prepare_request(
            &ClientConfig::default(),
            &Method::GET,
            "https://example.com/",
            &RequestOptions::new(),
        )
        .unwrap();
        ResponseHandle::new(Arc::new(response), request)
    }

    fn chunks(stream: ResponseStream) -> Vec<Result<Chunk, String>> {
        stream
            .map(|item| item.map(|(_, chunk)| chunk).map_err(|e| e.to_string()))
            .collect()
    }

    #[test]
    fn test_responses_are_drained_in_order() {
        let a = handle(MockResponse::new("a"));
        let b = handle(MockResponse::new("bb"));

        assert_eq!(
            chunks(ResponseStream::new(vec![a, b])),
            vec![
                Ok(Chunk::first()),
                Ok(Chunk::data(0, "a")),
                Ok(Chunk::Last { offset: 1 }),
                Ok(Chunk::first()),
                Ok(Chunk::data(0, "bb")),
                Ok(Chunk::Last { offset: 2 }),
            ]
        );
    }

    #[test]
    fn test_error_chunk_then_error_then_end() {
        let failing = handle(MockResponse::new(Body::generator(
            || -> Vec<Result<Bytes, BoxError>> {
                vec![Ok(Bytes::from("bar")), Err("bar ccc".into())]
            },
        )));
        let never_reached = handle(MockResponse::new("x"));

        assert_eq!(
            chunks(ResponseStream::new(vec![failing, never_reached])),
            vec![
                Ok(Chunk::first()),
                Ok(Chunk::data(0, "bar")),
                Ok(Chunk::Error {
                    offset: 3,
                    message: "bar ccc".to_string()
                }),
                Err("bar ccc".to_string()),
            ]
        );
    }

    #[test]
    fn test_finished_response_replays_terminal_chunk_only() {
        let done = handle(MockResponse::new("abc"));
        done.content(true).unwrap();

        assert_eq!(
            chunks(ResponseStream::new(vec![done])),
            vec![Ok(Chunk::Last { offset: 3 })]
        );
    }

    #[test]
    fn test_canceled_response_is_skipped() {
        let canceled = handle(MockResponse::new("abc"));
        canceled.cancel();
        let live = handle(MockResponse::new(""));

        assert_eq!(
            chunks(ResponseStream::new(vec![canceled, live])),
            vec![Ok(Chunk::first()), Ok(Chunk::Last { offset: 0 })]
        );
    }

    #[test]
    fn test_stream_is_fused() {
        let mut stream = ResponseStream::new(vec![handle(MockResponse::failing("boom"))]);

        assert!(matches!(stream.next(), Some(Ok((_, Chunk::Error { .. })))));
        assert!(matches!(stream.next(), Some(Err(_))));
        assert!(stream.next().is_none());
        assert!(stream.next().is_none());
    }

    #[test]
    fn test_polls_as_async_stream() {
        let mut stream = tokio_test::task::spawn(ResponseStream::new(vec![
            handle(MockResponse::new("ab")),
            handle(MockResponse::new("c")),
        ]));

        let first = tokio_test::assert_ready!(stream.poll_next());
        assert!(matches!(first, Some(Ok((_, Chunk::First { .. })))));

        let mut remaining = 0;
        while let Some(item) = tokio_test::assert_ready!(stream.poll_next()) {
            assert!(item.is_ok());
            remaining += 1;
        }
        assert_eq!(remaining, 5);
    }

    #[test]
    fn test_collects_as_async_stream() {
        let stream = ResponseStream::new(vec![handle(MockResponse::failing("down"))]);
        let items: Vec<StreamItem> = tokio_test::block_on(futures::StreamExt::collect(stream));

        assert_eq!(items.len(), 2);
        assert!(items[1].is_err());
    }
}
