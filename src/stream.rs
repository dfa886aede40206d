//! Streaming sessions over SSE response bodies.
//!
//! A [`StreamSession`] owns the response body of a streaming request and turns
//! it into typed events, one per [`StreamSession::recv`] call. Nothing is read
//! from the connection unless the caller asks for the next event.
//!
//! Once the session produces end-of-stream or an error it is sealed: the
//! connection is released and every later call returns the same outcome.

use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use reqwest::header::HeaderMap;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use crate::accumulator::ErrorAccumulator;
use crate::error::{error_from_body, ClientError};
use crate::headers::RateLimitHeaders;
use crate::http::is_failure_status;
use crate::sse::{decode_line, Decoded, LineReader};

/// Payload shapes that can be delivered through a [`StreamSession`].
pub trait Streamable: DeserializeOwned + Send + 'static {}

/// One decoded event together with the headers captured at stream open.
#[derive(Debug, Clone)]
pub struct StreamEvent<T> {
    pub data: T,
    headers: Arc<HeaderMap>,
}

impl<T> StreamEvent<T> {
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn rate_limit(&self) -> RateLimitHeaders {
        RateLimitHeaders::from_headers(&self.headers)
    }

    pub fn into_data(self) -> T {
        self.data
    }
}

impl<T> Deref for StreamEvent<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.data
    }
}

#[derive(Debug)]
enum State {
    Reading,
    Done,
    Failed(ClientError),
}

/// Single-consumer pull stream of decoded SSE events.
///
/// `recv` takes `&mut self`, so reads and [`close`](Self::close) are
/// serialized by the borrow checker. To abort a read that is blocked on the
/// network from elsewhere, attach a [`CancellationToken`] with
/// [`with_cancellation`](Self::with_cancellation). Dropping the session
/// releases the connection.
pub struct StreamSession<T> {
    reader: Option<LineReader>,
    accumulator: ErrorAccumulator,
    status: StatusCode,
    headers: Arc<HeaderMap>,
    empty_messages_limit: usize,
    consecutive_empty_reads: usize,
    state: State,
    cancel: Option<CancellationToken>,
    _payload: PhantomData<fn() -> T>,
}

impl<T: Streamable> StreamSession<T> {
    /// Build a session over an already-open response body.
    ///
    /// More than `empty_messages_limit` consecutive keep-alive lines without
    /// an event fail the stream with
    /// [`ClientError::TooManyEmptyStreamMessages`].
    pub fn new<S, E>(
        status: StatusCode,
        headers: HeaderMap,
        body: S,
        empty_messages_limit: usize,
    ) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<ClientError>,
    {
        let body = body.map(|chunk| chunk.map_err(Into::into)).boxed();
        Self {
            reader: Some(LineReader::new(body)),
            accumulator: ErrorAccumulator::new(),
            status,
            headers: Arc::new(headers),
            empty_messages_limit,
            consecutive_empty_reads: 0,
            state: State::Reading,
            cancel: None,
            _payload: PhantomData,
        }
    }

    /// Take ownership of a reqwest response body.
    pub fn from_response(response: reqwest::Response, empty_messages_limit: usize) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        Self::new(status, headers, response.bytes_stream(), empty_messages_limit)
    }

    /// Abort pending and future reads when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Receive the next event.
    ///
    /// `Ok(None)` signals end of stream. After `Ok(None)` or an error the
    /// session is sealed and returns the same result without touching the
    /// connection again.
    pub async fn recv(&mut self) -> Result<Option<StreamEvent<T>>, ClientError> {
        match &self.state {
            State::Reading => {}
            State::Done => return Ok(None),
            State::Failed(e) => return Err(e.clone()),
        }

        match self.read_event().await {
            Ok(Some(event)) => Ok(Some(event)),
            Ok(None) => {
                self.seal(State::Done);
                Ok(None)
            }
            Err(e) => {
                self.seal(State::Failed(e.clone()));
                Err(e)
            }
        }
    }

    async fn read_event(&mut self) -> Result<Option<StreamEvent<T>>, ClientError> {
        loop {
            let Some(line) = self.next_line().await? else {
                return match self.accumulated_error() {
                    Some(e) => Err(e),
                    None => {
                        if !self.accumulator.is_empty() {
                            warn!(
                                bytes = self.accumulator.bytes().len(),
                                "discarding unframed bytes at end of stream"
                            );
                        }
                        debug!("stream closed by server without done marker");
                        Ok(None)
                    }
                };
            };

            match decode_line::<T>(&line)? {
                Decoded::KeepAlive => {
                    self.consecutive_empty_reads += 1;
                    if self.consecutive_empty_reads > self.empty_messages_limit {
                        warn!(
                            limit = self.empty_messages_limit,
                            "too many empty stream messages"
                        );
                        return Err(ClientError::TooManyEmptyStreamMessages {
                            limit: self.empty_messages_limit,
                        });
                    }
                }
                Decoded::Unframed(bytes) => {
                    trace!(line = %String::from_utf8_lossy(bytes), "unframed line");
                    self.accumulator.write(bytes);
                }
                Decoded::ErrorFrame(payload) => {
                    self.accumulator.write(payload);
                    let err = error_from_body(self.status, payload);
                    debug!(error = %err, "error frame in stream");
                    return Err(err);
                }
                Decoded::Done => {
                    debug!("stream completed");
                    return Ok(None);
                }
                Decoded::Event(data) => {
                    self.consecutive_empty_reads = 0;
                    return Ok(Some(StreamEvent {
                        data,
                        headers: Arc::clone(&self.headers),
                    }));
                }
            }
        }
    }

    async fn next_line(&mut self) -> Result<Option<Bytes>, ClientError> {
        let Some(reader) = self.reader.as_mut() else {
            return Err(ClientError::StreamClosed);
        };

        match &self.cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => Err(ClientError::StreamCancelled),
                line = reader.next_line() => line,
            },
            None => reader.next_line().await,
        }
    }

    /// Resolve what was collected in the accumulator into an error, if the
    /// body turned out to be an error response.
    fn accumulated_error(&self) -> Option<ClientError> {
        if is_failure_status(self.status) {
            return Some(error_from_body(self.status, self.accumulator.bytes()));
        }
        if self.accumulator.is_empty() {
            return None;
        }
        match self.accumulator.unmarshal() {
            Ok(Some(api_error)) => {
                let err = ClientError::Api(api_error.with_status(self.status));
                debug!(error = %err, "error body on streaming connection");
                Some(err)
            }
            Ok(None) | Err(_) => None,
        }
    }

    /// Adapt the session into a [`Stream`] that ends after end-of-stream or
    /// the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<StreamEvent<T>, ClientError>> + Send {
        stream::unfold(Some(self), |session| async move {
            let mut session = session?;
            match session.recv().await {
                Ok(Some(event)) => Some((Ok(event), Some(session))),
                Ok(None) => None,
                Err(e) => Some((Err(e), None)),
            }
        })
    }
}

impl<T> StreamSession<T> {
    fn seal(&mut self, state: State) {
        self.state = state;
        self.reader = None;
    }

    /// Release the connection. Safe to call any number of times.
    ///
    /// Closing before the stream finished makes later receives fail with
    /// [`ClientError::StreamClosed`].
    pub fn close(&mut self) {
        if self.reader.take().is_some() {
            if let State::Reading = self.state {
                self.state = State::Failed(ClientError::StreamClosed);
            }
            debug!("stream closed by caller");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.reader.is_none()
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn rate_limit(&self) -> RateLimitHeaders {
        RateLimitHeaders::from_headers(&self.headers)
    }

    /// Keep-alive lines seen since the last event.
    pub fn consecutive_empty_reads(&self) -> usize {
        self.consecutive_empty_reads
    }
}

impl<T> std::fmt::Debug for StreamSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamSession")
            .field("status", &self.status)
            .field("state", &self.state)
            .field("closed", &self.is_closed())
            .field("consecutive_empty_reads", &self.consecutive_empty_reads)
            .finish_non_exhaustive()
    }
}
