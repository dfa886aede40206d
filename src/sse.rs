//! Server-Sent Events (SSE) line framing.
//!
//! This module turns a chunked response body into logical lines and classifies
//! each line per the SSE framing used by the streaming endpoints:
//! ```text
//! data: {"id": "a"}
//!
//! data: {"id": "b"}
//!
//! data: [DONE]
//! ```

use bytes::{Bytes, BytesMut};
use futures::stream::{BoxStream, StreamExt};
use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::error::ClientError;

/// Prefix marking a data line.
pub const DATA_PREFIX: &str = "data:";

/// Payload signaling graceful end of stream.
pub const DONE_MARKER: &str = "[DONE]";

const ERROR_KEY: &[u8] = b"\"error\"";

/// Byte source consumed by the line reader.
pub type ByteStream = BoxStream<'static, Result<Bytes, ClientError>>;

/// Buffers chunks from the transport and yields one line at a time.
///
/// A newline split across two chunks is reassembled; a final line without a
/// trailing newline is still returned once the source is exhausted.
pub struct LineReader {
    source: ByteStream,
    buffer: BytesMut,
    exhausted: bool,
}

impl LineReader {
    pub fn new(source: ByteStream) -> Self {
        Self {
            source,
            buffer: BytesMut::new(),
            exhausted: false,
        }
    }

    /// Read the next line including its trailing newline, if any.
    ///
    /// Returns `Ok(None)` once the source is exhausted and the buffer drained.
    /// Transport errors are returned unchanged.
    pub async fn next_line(&mut self) -> Result<Option<Bytes>, ClientError> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                return Ok(Some(self.buffer.split_to(pos + 1).freeze()));
            }

            if self.exhausted {
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(self.buffer.split().freeze()));
            }

            match self.source.next().await {
                Some(Ok(chunk)) => self.buffer.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(e),
                None => self.exhausted = true,
            }
        }
    }
}

/// Classification of a single line.
#[derive(Debug, PartialEq)]
pub enum Decoded<'a, T> {
    /// Blank line or `:` comment.
    KeepAlive,
    /// Non-blank line without the data prefix; belongs to an error body.
    Unframed(&'a [u8]),
    /// Data line carrying an `{"error": ...}` object.
    ErrorFrame(&'a [u8]),
    /// The [`DONE_MARKER`] sentinel.
    Done,
    Event(T),
}

/// Classify one raw line and decode its payload into `T`.
///
/// A payload that fails to decode yields [`ClientError::Decode`].
pub fn decode_line<T: DeserializeOwned>(line: &[u8]) -> Result<Decoded<'_, T>, ClientError> {
    let line = line.trim_ascii();
    if line.is_empty() || line.starts_with(b":") {
        return Ok(Decoded::KeepAlive);
    }

    let Some(payload) = parse_sse_line(line) else {
        return Ok(Decoded::Unframed(line));
    };

    if is_done_marker(payload) {
        return Ok(Decoded::Done);
    }
    if is_error_payload(payload) {
        return Ok(Decoded::ErrorFrame(payload));
    }

    serde_json::from_slice(payload)
        .map(Decoded::Event)
        .map_err(|e| ClientError::Decode {
            payload: String::from_utf8_lossy(payload).into_owned(),
            source: Arc::new(e),
        })
}

/// Parse an SSE line to extract the trimmed data portion.
///
/// # Example
/// ```
/// use giteeai::sse::parse_sse_line;
///
/// let line = b"data: {\"key\": \"value\"}\n";
/// assert_eq!(parse_sse_line(line), Some(&b"{\"key\": \"value\"}"[..]));
///
/// assert_eq!(parse_sse_line(b"invalid"), None);
/// ```
pub fn parse_sse_line(line: &[u8]) -> Option<&[u8]> {
    line.trim_ascii()
        .strip_prefix(DATA_PREFIX.as_bytes())
        .map(|data| data.trim_ascii())
}

/// Check if an SSE data payload indicates the stream is done.
///
/// # Example
/// ```
/// use giteeai::sse::is_done_marker;
///
/// assert!(is_done_marker(b"[DONE]"));
/// assert!(!is_done_marker(b""));
/// assert!(!is_done_marker(b"{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &[u8]) -> bool {
    data == DONE_MARKER.as_bytes()
}

/// Whether a data payload is an object whose first key is `"error"`.
fn is_error_payload(data: &[u8]) -> bool {
    data.strip_prefix(b"{")
        .is_some_and(|rest| rest.trim_ascii_start().starts_with(ERROR_KEY))
}
