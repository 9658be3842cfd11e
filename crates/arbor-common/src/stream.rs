//! Byte streams.
//!
//! The encoder produces its serialized output as a stream of byte chunks.
//! Consumers either forward it (the HTTP boundary) or drain it fully (the
//! build-time module collector). A stream item error carries the abort
//! reason and must propagate to the consumer, never be swallowed.

use bytes::Bytes;
use futures::stream::{self, BoxStream};
use futures::StreamExt;

use crate::error::Result;

/// A streamable sequence of byte chunks, each chunk fallible.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// Wraps pre-materialized chunks as a [`ByteStream`].
pub fn byte_stream_from(chunks: Vec<Bytes>) -> ByteStream {
    stream::iter(chunks.into_iter().map(Ok)).boxed()
}

/// Buffers an entire stream into a string, propagating the first error.
///
/// Invalid UTF-8 sequences are replaced rather than rejected, matching the
/// lossy decode at the wire boundary.
pub async fn stream_to_string(mut stream: ByteStream) -> Result<String> {
    let mut buf = Vec::new();
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
