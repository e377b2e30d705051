//! Streaming events emitted while a response body is consumed.

use bytes::Bytes;

/// One observable event in a response body stream.
///
/// Offsets count body bytes delivered before the event, so they never
/// decrease for a given response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// Interim 1xx response received before the final status.
    Informational {
        /// Interim status code.
        status: u16,
        /// Header lines sent with the interim status.
        headers: Vec<String>,
    },
    /// Headers have arrived; the body starts.
    First {
        /// Body offset.
        offset: u64,
        /// Initial content, empty for mock responses.
        content: Bytes,
    },
    /// A body fragment.
    Data {
        /// Offset of the first byte of this fragment.
        offset: u64,
        /// Fragment bytes.
        content: Bytes,
    },
    /// The body is complete.
    Last {
        /// Total number of body bytes delivered.
        offset: u64,
    },
    /// The transfer failed. Always the final chunk of its response.
    Error {
        /// Number of body bytes delivered before the failure.
        offset: u64,
        /// Error message.
        message: String,
    },
}

impl Chunk {
    /// Creates a first chunk at offset 0.
    pub fn first() -> Self {
        Chunk::First {
            offset: 0,
            content: Bytes::new(),
        }
    }

    /// Creates a data chunk.
    pub fn data(offset: u64, content: impl Into<Bytes>) -> Self {
        Chunk::Data {
            offset,
            content: content.into(),
        }
    }

    /// Returns the body offset of this chunk.
    pub fn offset(&self) -> u64 {
        match self {
            Chunk::Informational { .. } => 0,
            Chunk::First { offset, .. }
            | Chunk::Data { offset, .. }
            | Chunk::Last { offset }
            | Chunk::Error { offset, .. } => *offset,
        }
    }

    /// Returns the content carried by this chunk.
    pub fn content(&self) -> &[u8] {
        match self {
            Chunk::First { content, .. } | Chunk::Data { content, .. } => content,
            _ => &[],
        }
    }

    /// Returns the error message for error chunks.
    pub fn error(&self) -> Option<&str> {
        match self {
            Chunk::Error { message, .. } => Some(message),
            _ => None,
        }
    }

    /// Returns true for the first chunk.
    pub fn is_first(&self) -> bool {
        matches!(self, Chunk::First { .. })
    }

    /// Returns true if no chunk follows this one for its response.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Chunk::Last { .. } | Chunk::Error { .. })
    }

    /// Returns the interim status for informational chunks.
    pub fn informational_status(&self) -> Option<u16> {
        match self {
            Chunk::Informational { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_accessors() {
        let data = Chunk::data(3, "bar");
        assert_eq!(data.offset(), 3);
        assert_eq!(data.content(), b"bar");
        assert!(!data.is_terminal());

        let error = Chunk::Error {
            offset: 6,
            message: "Timeout".to_string(),
        };
        assert_eq!(error.error(), Some("Timeout"));
        assert!(error.is_terminal());
        assert!(error.content().is_empty());
    }

    #[test]
    fn test_first_chunk_is_empty() {
        let first = Chunk::first();
        assert!(first.is_first());
        assert_eq!(first.offset(), 0);
        assert_eq!(first, Chunk::First { offset: 0, content: Bytes::new() });
    }
}
