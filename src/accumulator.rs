//! Buffer for error bodies that arrive on a streaming connection.

use bytes::{BufMut, BytesMut};
use tracing::warn;

use crate::error::{ApiError, ErrorResponse};

/// Upper bound on buffered error body bytes.
pub const MAX_ERROR_BODY_BYTES: usize = 1 << 20;

/// Collects lines that are not SSE data frames so they can be parsed as an
/// error envelope once the body ends.
///
/// At most [`MAX_ERROR_BODY_BYTES`] are kept; later lines are dropped.
#[derive(Debug, Default)]
pub struct ErrorAccumulator {
    buffer: BytesMut,
    truncated: bool,
}

impl ErrorAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one line; lines are kept newline-separated.
    pub fn write(&mut self, line: &[u8]) {
        if self.buffer.len() + line.len() + 1 > MAX_ERROR_BODY_BYTES {
            if !self.truncated {
                warn!(
                    limit = MAX_ERROR_BODY_BYTES,
                    "error body too large, dropping further lines"
                );
                self.truncated = true;
            }
            return;
        }
        self.buffer.put_slice(line);
        self.buffer.put_u8(b'\n');
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Whether lines were dropped because the buffer was full.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }

    /// Decode the buffered bytes as `{"error": {...}}`.
    ///
    /// `Ok(None)` means the bytes were valid JSON without an error object.
    pub fn unmarshal(&self) -> Result<Option<ApiError>, serde_json::Error> {
        serde_json::from_slice::<ErrorResponse>(&self.buffer).map(|resp| resp.error)
    }
}
